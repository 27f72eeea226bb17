//! Labeled source spans for diagnostic messages.

use serde::Serialize;

use crate::span::Span;

/// A labeled span in source code.
///
/// - **Primary labels** mark the main location of a problem.
/// - **Secondary labels** add context such as "first declared here".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_kinds() {
        let primary = Label::primary(Span::new(0..4), "here");
        let secondary = Label::secondary(Span::new(8..9), "and here");

        assert!(primary.is_primary());
        assert!(secondary.is_secondary());
        assert_eq!(primary.span(), Span::new(0..4));
        assert_eq!(secondary.message(), "and here");
    }
}
