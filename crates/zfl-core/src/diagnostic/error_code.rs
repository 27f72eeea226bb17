//! Error codes for ZFL diagnostics.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Analysis errors and warnings

use std::fmt;

use serde::{Serialize, Serializer};

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    E001,

    /// Unexpected character.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\n`, `\r`, `\t`, `\\`, `\/`, `\'`, `\"`, `\0`.
    E003,

    /// Unterminated block or doc comment.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Incomplete input.
    E101,

    // =========================================================================
    // Analysis (E2xx)
    // =========================================================================
    /// A clause invokes a command that no system or service declares.
    ///
    /// The analyzer synthesizes the command and keeps going.
    E200,

    /// Duplicate declaration.
    ///
    /// A flow, system, service, start, field or command name was declared
    /// twice in the same scope. The first declaration wins.
    E201,

    /// A when-clause has no command.
    E202,

    /// Unknown outcome category in an `end` block.
    ///
    /// Valid categories are `completed`, `suspended` and `cancelled`.
    E203,

    /// A trigger is neither a start nor emitted by any clause.
    E204,

    /// An outcome lists an event the flow never produces.
    E205,
}

impl ErrorCode {
    /// Returns the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "unterminated comment",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E200 => "undeclared command",
            ErrorCode::E201 => "duplicate declaration",
            ErrorCode::E202 => "missing command",
            ErrorCode::E203 => "unknown outcome",
            ErrorCode::E204 => "trigger never emitted",
            ErrorCode::E205 => "unknown outcome event",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
