//! ZFL - an event-flow language and its layout pipeline.
//!
//! Source text goes through four pure stages:
//!
//! ```text
//! source --parse--> RawDocument --analyze--> SemanticModel
//!        --transform--> FlowGraph --layout--> ViewModel
//! ```
//!
//! None of the stages fail. Problems in the source are reported as
//! diagnostics on the [`RawDocument`] and [`SemanticModel`], and every stage
//! still returns a structurally valid result.
//!
//! # Example
//!
//! ```
//! let source = r#"
//! flow SimpleFlow {
//!     systems { TestSystem { service TestService { commands: doSomething } } }
//!     start UserAction
//!     when UserAction { command doSomething event SomethingDone }
//! }
//! "#;
//!
//! let view = zfl::execute(source);
//! assert_eq!(view.nodes().len(), 5);
//! assert_eq!(view.edges().len(), 4);
//! assert_eq!(view.system_groups().len(), 1);
//! ```

pub mod config;
pub mod export;
pub mod ir;
pub mod layout;

mod error;

pub use zfl_core::{diagnostic, flow, geometry, semantic, source, span};
pub use zfl_parser::{ParseConfig, RawDocument, RawMap, RawValue};

pub use error::ZflError;
pub use export::{to_json, write_json};
pub use ir::IrTransformer;
pub use layout::{LayoutEngine, ViewModel};

use log::{debug, info, trace};

use config::AppConfig;
use flow::FlowGraph;
use semantic::SemanticModel;

/// Runs the pipeline stages with one configuration.
///
/// Each stage is exposed on its own for callers that only need an
/// intermediate result, such as an editor that only wants diagnostics.
///
/// # Examples
///
/// ```
/// use zfl::{FlowBuilder, config::AppConfig};
///
/// let builder = FlowBuilder::new(AppConfig::default().with_file_name("orders.zfl"));
///
/// let raw = builder.parse("flow Orders { start Placed }");
/// let model = builder.analyze(&raw);
/// let graph = builder.transform(&model);
/// let view = builder.layout(&graph);
///
/// assert_eq!(view.nodes().len(), 2);
/// assert_eq!(model.flows()[0].starts()[0].source_ref().file(), "orders.zfl");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlowBuilder {
    config: AppConfig,
}

impl FlowBuilder {
    /// Create a new builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Parse and layout settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse source text into a [`RawDocument`].
    pub fn parse(&self, source: &str) -> RawDocument {
        info!(file = self.config.parse().file_name(); "Parsing source");
        zfl_parser::parse(source, self.config.parse())
    }

    /// Resolve a [`RawDocument`] into a [`SemanticModel`].
    pub fn analyze(&self, document: &RawDocument) -> SemanticModel {
        let model = zfl_parser::analyze(document);
        debug!(
            flows = model.flows().len(),
            diagnostics = model.diagnostics().len();
            "Analyzed document"
        );
        trace!(model:?; "Semantic model");
        model
    }

    /// Lower a [`SemanticModel`] into a [`FlowGraph`].
    pub fn transform(&self, model: &SemanticModel) -> FlowGraph {
        IrTransformer::new().transform(model)
    }

    /// Lay out a [`FlowGraph`] into a [`ViewModel`].
    pub fn layout(&self, graph: &FlowGraph) -> ViewModel {
        LayoutEngine::new(*self.config.layout()).layout(graph)
    }

    /// Run every stage on `source`.
    ///
    /// Diagnostics are dropped; use [`FlowBuilder::run`] to keep them.
    pub fn execute(&self, source: &str) -> ViewModel {
        self.run(source).view
    }

    /// Run every stage on `source`, keeping each intermediate result.
    pub fn run(&self, source: &str) -> Pipeline {
        let raw = self.parse(source);
        let model = self.analyze(&raw);
        let graph = self.transform(&model);
        let view = self.layout(&graph);
        Pipeline {
            raw,
            model,
            graph,
            view,
        }
    }
}

/// All stage outputs of one run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub raw: RawDocument,
    pub model: SemanticModel,
    pub graph: FlowGraph,
    pub view: ViewModel,
}

/// Parse `source` with the default [`ParseConfig`].
pub fn parse(source: &str) -> RawDocument {
    FlowBuilder::default().parse(source)
}

/// Resolve `document` into a [`SemanticModel`].
pub fn analyze(document: &RawDocument) -> SemanticModel {
    FlowBuilder::default().analyze(document)
}

/// Lower `model` into a [`FlowGraph`].
pub fn transform(model: &SemanticModel) -> FlowGraph {
    ir::transform(model)
}

/// Lay out `graph` with the default spacing.
pub fn layout(graph: &FlowGraph) -> ViewModel {
    layout::layout(graph)
}

/// Run the whole pipeline on `source` with the default configuration.
pub fn execute(source: &str) -> ViewModel {
    FlowBuilder::default().execute(source)
}
