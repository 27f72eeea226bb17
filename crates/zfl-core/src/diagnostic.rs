//! Diagnostics shared by every pipeline stage.
//!
//! This module provides:
//! - Error codes grouped by phase
//! - Labeled spans pointing into the source text
//! - Severity levels
//! - A collector for accumulating diagnostics within one stage
//!
//! # Overview
//!
//! Pipeline stages never fail. Syntax errors, unresolved references and
//! other problems are reported as [`Diagnostic`] values and travel with the
//! stage output, so partially written documents still produce a result.
//!
//! # Example
//!
//! ```
//! # use zfl_core::diagnostic::{Diagnostic, ErrorCode};
//! # use zfl_core::span::Span;
//!
//! let diag = Diagnostic::warning("command `chargePayment` is not declared by any system")
//!     .with_code(ErrorCode::E200)
//!     .with_label(Span::new(120..133), "undeclared command")
//!     .with_help("declare it under `systems { <System> { service { commands: ... } } }`");
//!
//! assert_eq!(
//!     diag.to_string(),
//!     "warning[E200]: command `chargePayment` is not declared by any system"
//! );
//! ```

mod collector;
mod error_code;
mod label;
mod severity;

pub use collector::DiagnosticCollector;
pub use error_code::ErrorCode;
pub use label::Label;
pub use severity::Severity;

use std::fmt;

use serde::Serialize;

use crate::{source::SourceRef, span::Span};

/// A diagnostic message with source location information.
///
/// Carries a severity, an optional error code, a message, labeled spans for
/// rich rendering and the resolved [`SourceRef`] of the primary location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_ref: Option<SourceRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    labels: Vec<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an informational diagnostic.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Resolved location of the primary label, if known.
    pub fn source_ref(&self) -> Option<&SourceRef> {
        self.source_ref.as_ref()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Span of the first primary label.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_source_ref(mut self, source_ref: SourceRef) -> Self {
        self.source_ref = Some(source_ref);
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            source_ref: None,
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::error("unexpected token");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "unexpected token");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
        assert!(diag.source_ref().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::warning("start `Tick` is declared more than once")
            .with_code(ErrorCode::E201)
            .with_label(Span::new(100..104), "duplicate declaration")
            .with_secondary_label(Span::new(40..44), "first declared here")
            .with_help("rename or remove one of the declarations")
            .with_source_ref(SourceRef::start_of("a.zfl"));

        assert!(diag.severity().is_warning());
        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[1].is_secondary());
        assert_eq!(diag.primary_span(), Some(Span::new(100..104)));
        assert_eq!(diag.source_ref().map(ToString::to_string).as_deref(), Some("a.zfl:1:1"));
    }

    #[test]
    fn test_diagnostic_display() {
        let with_code = Diagnostic::error("unterminated string literal").with_code(ErrorCode::E001);
        assert_eq!(with_code.to_string(), "error[E001]: unterminated string literal");

        let without_code = Diagnostic::info("flow has no end block");
        assert_eq!(without_code.to_string(), "info: flow has no end block");
    }

    #[test]
    fn test_diagnostic_serializes_camel_case() {
        let diag = Diagnostic::warning("unresolved")
            .with_code(ErrorCode::E200)
            .with_source_ref(SourceRef::new("f.zfl", 2, 3).unwrap());

        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], "WARNING");
        assert_eq!(json["code"], "E200");
        assert_eq!(json["sourceRef"]["line"], 2);
        assert!(json.get("labels").is_none());
    }
}
