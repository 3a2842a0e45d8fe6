//! Error codes for the Diagen diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E3xx` - IR building errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but not closed on the same line.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that starts no token.
    E002,

    /// Invalid escape sequence.
    ///
    /// A backslash ends the line or the input inside a string literal.
    E003,

    /// Malformed number.
    ///
    /// A number is immediately followed by identifier characters, as in `12px`.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended unexpectedly before a complete construct was parsed.
    E101,

    /// Unexpected closing brace.
    ///
    /// A `}` was found with no open group or block to close.
    E102,

    // =========================================================================
    // IR Building Errors (E3xx)
    // =========================================================================
    /// IR generation failure.
    ///
    /// The parsed document has a shape the IR builder cannot handle.
    E300,

    /// Invalid attribute value.
    ///
    /// An attribute or meta value has the wrong kind, such as a string
    /// where a number is required.
    E301,

    /// Unknown layout direction.
    ///
    /// A `direction` value is not one of `TB`, `BT`, `LR` or `RL`.
    E302,

    /// Invalid port definition.
    ///
    /// A `ports` attribute is not a list of port names.
    E303,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            // IR building errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "malformed number",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "unexpected closing brace",
            // IR building errors
            ErrorCode::E300 => "IR generation failure",
            ErrorCode::E301 => "invalid attribute value",
            ErrorCode::E302 => "unknown direction",
            ErrorCode::E303 => "invalid port",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
