//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! This module provides the bridge between the pipeline's diagnostics and
//! miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! [`CliError::Diagnostics`] carries every diagnostic of a run; each one is
//! rendered independently.

use std::fmt;

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, SourceSpan,
};

use zfl::{
    ZflError,
    diagnostic::{Diagnostic, Severity},
    source::SourceMap,
    span::Span,
};

use crate::CliError;

/// Adapter for a single ZFL diagnostic.
///
/// Diagnostics without labels are pointed at their source ref instead.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Source code for displaying snippets
    src: &'a str,
    /// Offset of the source ref, used when there are no labels
    fallback_offset: Option<usize>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        let fallback_offset = diag.source_ref().and_then(|source_ref| {
            SourceMap::new(source_ref.file(), src).offset(source_ref)
        });
        Self {
            diag,
            src,
            fallback_offset,
        }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            let offset = self.fallback_offset?;
            let span = LabeledSpan::new_primary_with_span(None, SourceSpan::new(offset.into(), 0));
            return Some(Box::new(std::iter::once(span)));
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for errors without source information, such as I/O,
/// configuration and serialization errors.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CliError::Zfl(ZflError::Io(_)) => "zfl::io",
            CliError::Zfl(ZflError::Serialize(_)) => "zfl::serialize",
            CliError::Zfl(ZflError::Config(_)) => "zfl::config",
            CliError::Diagnostics { .. } => "zfl::diagnostics",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either a single diagnostic or a non-diagnostic error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a ZFL [`Span`] to a miette [`SourceSpan`].
fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`CliError`] into a list of reportable errors.
///
/// For [`CliError::Diagnostics`], this returns one [`Reportable`] for each
/// diagnostic, errors first. For other variants, this returns a single
/// [`Reportable`].
pub fn to_reportables(err: &CliError) -> Vec<Reportable<'_>> {
    match err {
        CliError::Diagnostics {
            diagnostics, src, ..
        } => {
            let mut sorted: Vec<&Diagnostic> = diagnostics.iter().collect();
            sorted.sort_by_key(|d| std::cmp::Reverse(d.severity()));
            sorted
                .into_iter()
                .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
                .collect()
        }
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

/// Render one diagnostic with source snippets.
///
/// Falls back to the plain `severity[code]: message` form if rendering
/// fails.
pub fn render(diagnostic: &Diagnostic, src: &str) -> String {
    let adapter = DiagnosticAdapter::new(diagnostic, src);
    let mut writer = String::new();
    match GraphicalReportHandler::new().render_report(&mut writer, &adapter) {
        Ok(()) => writer,
        Err(_) => diagnostic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use zfl::{diagnostic::ErrorCode, source::SourceRef};

    use super::*;

    #[test]
    fn test_diagnostics_are_rendered_separately_errors_first() {
        let err = CliError::Diagnostics {
            file: "a.zfl".to_string(),
            src: "flow A { when X { } }".to_string(),
            diagnostics: vec![
                Diagnostic::warning("first warning").with_code(ErrorCode::E200),
                Diagnostic::error("an error")
                    .with_code(ErrorCode::E100)
                    .with_label(Span::new(9..13), "here"),
            ],
        };

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "an error");
        assert_eq!(reportables[1].to_string(), "first warning");
        assert_eq!(
            reportables[1].severity(),
            Some(miette::Severity::Warning)
        );
    }

    #[test]
    fn test_source_ref_becomes_label() {
        let src = "flow A {\n  when X { }\n}\n";
        let diagnostic = Diagnostic::warning("unknown trigger")
            .with_source_ref(SourceRef::new("a.zfl", 2, 8).unwrap());
        let adapter = DiagnosticAdapter::new(&diagnostic, src);

        let labels: Vec<LabeledSpan> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), src.find('X').unwrap());
    }

    #[test]
    fn test_non_diagnostic_error() {
        let err = CliError::Zfl(ZflError::Config("bad value".to_string()));

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: bad value");
                assert_eq!(e.code().unwrap().to_string(), "zfl::config");
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_render_includes_message() {
        let diagnostic = Diagnostic::error("unexpected `}`")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(0..1), "unexpected here");
        let rendered = render(&diagnostic, "}");
        assert!(rendered.contains("unexpected `}`"));
    }
}
