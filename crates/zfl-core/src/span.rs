//! Byte-offset spans into ZFL source text.
//!
//! [`Span`] marks a half-open byte range. [`Spanned`] pairs a value with the
//! span it was parsed from.

use std::ops::{Deref, Range};

use serde::Serialize;

/// A half-open byte range `start..end` into the source text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    /// Byte offset of the first character.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(self, other: Span) -> Span {
        Span::new(self.start.min(other.start)..self.end.max(other.end))
    }
}

/// A value together with the span it came from.
///
/// Equality ignores the span so parsed values compare by content.
#[derive(Debug, Clone, Copy)]
pub struct Spanned<T> {
    value: T,
    span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn inner(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Spanned<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_accessors() {
        let span = Span::new(4..10);
        assert_eq!(span.start(), 4);
        assert_eq!(span.end(), 10);
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
        assert!(Span::default().is_empty());
    }

    #[test]
    fn test_span_inverted_range_is_clamped() {
        let span = Span::new(8..3);
        assert_eq!(span.start(), 8);
        assert!(span.is_empty());
    }

    #[test]
    fn test_span_union() {
        let a = Span::new(10..15);
        let b = Span::new(2..6);
        assert_eq!(a.union(b), Span::new(2..15));
        assert_eq!(b.union(a), Span::new(2..15));
    }

    #[test]
    fn test_spanned_equality_ignores_span() {
        let a = Spanned::new("Payments", Span::new(0..8));
        let b = Spanned::new("Payments", Span::new(40..48));
        assert_eq!(a, b);
        assert_eq!(*a, "Payments");
    }

    #[test]
    fn test_spanned_into_inner() {
        let spanned = Spanned::new(String::from("renew"), Span::new(3..8));
        assert_eq!(spanned.span().len(), 5);
        assert_eq!(spanned.into_inner(), "renew");
    }
}
