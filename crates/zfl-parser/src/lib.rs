//! # ZFL Parser
//!
//! Front end of the ZFL event-flow pipeline: source text to a loosely typed
//! [`RawDocument`] and then to a typed [`SemanticModel`].
//!
//! ## Usage
//!
//! ```
//! # use zfl_parser::{analyze, parse, ParseConfig};
//! let source = r#"
//!     flow Orders {
//!         systems { Shop { service Checkout { commands: placeOrder } } }
//!         start OrderRequested
//!         when OrderRequested { command placeOrder event OrderPlaced }
//!     }
//! "#;
//!
//! let raw = parse(source, &ParseConfig::default());
//! let model = analyze(&raw);
//! assert_eq!(model.flows().len(), 1);
//! assert!(model.diagnostics().is_empty());
//! ```

pub mod analyze;
pub mod builder;
pub mod lexer;
pub mod listener;
pub mod parser;
pub mod parser_types;
pub mod raw;
pub mod tokens;

use log::{debug, info};
use serde::Deserialize;

use zfl_core::{
    semantic::SemanticModel,
    source::{DEFAULT_FILE_NAME, SourceMap},
};

pub use analyze::SemanticAnalyzer;
pub use builder::RawTreeBuilder;
pub use raw::{RawDocument, RawMap, RawValue, Scalar};

/// Settings for [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ParseConfig {
    /// File name recorded in every source ref.
    file_name: String,
}

impl ParseConfig {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME)
    }
}

/// Parse source text into a [`RawDocument`].
///
/// The pipeline is:
///
/// 1. **Tokenize** - source text to tokens, recovering from bad characters
/// 2. **Parse** - tokens to a syntax tree, recovering from bad items
/// 3. **Build** - walk the tree with a [`RawTreeBuilder`]
///
/// Never fails. Lexer and parser errors end up in
/// [`RawDocument::diagnostics`].
pub fn parse(source: &str, config: &ParseConfig) -> RawDocument {
    let (tokens, lexer_diagnostics) = lexer::tokenize(source);
    debug!(tokens = tokens.len(), errors = lexer_diagnostics.len(); "Tokenized source");

    let document = parser::build_document(&tokens);
    debug!(items = document.items.len(); "Parsed document");

    let mut builder = RawTreeBuilder::new(SourceMap::new(config.file_name(), source));
    builder.add_diagnostics(lexer_diagnostics);
    listener::walk(&document, &mut builder);
    let raw = builder.finish();

    info!(
        file = config.file_name(),
        flows = raw.root().get_map("flows").len(),
        diagnostics = raw.diagnostics().len();
        "Parsed ZFL source"
    );
    raw
}

/// Resolve a [`RawDocument`] into a [`SemanticModel`].
pub fn analyze(document: &RawDocument) -> SemanticModel {
    analyze::analyze(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_defaults() {
        let config = ParseConfig::default();
        assert_eq!(config.file_name(), "<zfl>");
        assert_eq!(config.with_file_name("a.zfl").file_name(), "a.zfl");
    }

    #[test]
    fn test_file_name_flows_into_source_refs() {
        let raw = parse("flow F { }", &ParseConfig::new("orders.zfl"));
        assert_eq!(raw.file_name(), "orders.zfl");
        assert_eq!(raw.location("flows.F").to_string(), "orders.zfl:1:1");
    }
}
