//! Source provenance.
//!
//! A [`SourceRef`] names the file, line and column a declaration came from.
//! [`SourceMap`] converts byte offsets produced by the lexer into source refs.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::span::Span;

/// File name used when the caller does not name the source.
pub const DEFAULT_FILE_NAME: &str = "<zfl>";

/// Errors raised when constructing a [`SourceRef`] from raw coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceRefError {
    #[error("line must be >= 1 (was {0})")]
    InvalidLine(u32),

    #[error("column must be >= 1 (was {0})")]
    InvalidColumn(u32),
}

/// A 1-based location in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSourceRef")]
pub struct SourceRef {
    file: String,
    line: u32,
    column: u32,
}

#[derive(Deserialize)]
struct RawSourceRef {
    file: String,
    line: u32,
    column: u32,
}

impl TryFrom<RawSourceRef> for SourceRef {
    type Error = SourceRefError;

    fn try_from(raw: RawSourceRef) -> Result<Self, Self::Error> {
        SourceRef::new(raw.file, raw.line, raw.column)
    }
}

impl SourceRef {
    /// Create a source ref, rejecting a zero line or column.
    ///
    /// # Errors
    ///
    /// Returns [`SourceRefError`] when `line` or `column` is 0.
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Result<Self, SourceRefError> {
        if line < 1 {
            return Err(SourceRefError::InvalidLine(line));
        }
        if column < 1 {
            return Err(SourceRefError::InvalidColumn(column));
        }
        Ok(Self {
            file: file.into(),
            line,
            column,
        })
    }

    /// The first character of `file`.
    pub fn start_of(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: 1,
            column: 1,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Line index over one source text.
#[derive(Debug, Clone)]
pub struct SourceMap<'src> {
    file: String,
    text: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> SourceMap<'src> {
    pub fn new(file: impl Into<String>, text: &'src str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            file: file.into(),
            text,
            line_starts,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn text(&self) -> &'src str {
        self.text
    }

    /// Resolve a byte offset. Offsets past the end clamp to the end of the text.
    pub fn source_ref(&self, offset: usize) -> SourceRef {
        let offset = offset.min(self.text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let column = self
            .text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());

        SourceRef {
            file: self.file.clone(),
            line: u32::try_from(line_idx + 1).unwrap_or(u32::MAX),
            column: u32::try_from(column + 1).unwrap_or(u32::MAX),
        }
    }

    /// Resolve the start of a span.
    pub fn span_ref(&self, span: Span) -> SourceRef {
        self.source_ref(span.start())
    }

    /// Byte offset of a line/column pair, the inverse of [`Self::source_ref`].
    ///
    /// Returns `None` when the line does not exist. Columns past the end of
    /// the line clamp to the line end.
    pub fn offset(&self, source_ref: &SourceRef) -> Option<usize> {
        let line_idx = usize::try_from(source_ref.line).ok()?.checked_sub(1)?;
        let line_start = *self.line_starts.get(line_idx)?;
        let line_end = self
            .line_starts
            .get(line_idx + 1)
            .map_or(self.text.len(), |next| next - 1);
        let line = self.text.get(line_start..line_end)?;

        let column = usize::try_from(source_ref.column).ok()?.saturating_sub(1);
        let within = line
            .char_indices()
            .nth(column)
            .map_or(line.len(), |(idx, _)| idx);
        Some(line_start + within)
    }
}
