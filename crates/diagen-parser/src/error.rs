//! Error and diagnostic system for the Diagen parser.
//!
//! Every phase of the parsing lifecycle reports problems as [`Diagnostic`]s:
//! the lexer and the parser collect as many as they can in one pass, the IR
//! builder stops at the first one. Collected diagnostics are returned wrapped
//! in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use diagen_parser::error::{Diagnostic, ErrorCode};
//! # use diagen_parser::Span;
//!
//! let diag = Diagnostic::error("unknown direction `UP`")
//!     .with_code(ErrorCode::E302)
//!     .with_label(Span::new(24..26), "invalid direction")
//!     .with_help("use one of TB, BT, LR, RL");
//!
//! let location = diag.location("@diagram\ndirection: UP");
//! assert!(location.is_some());
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod location;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use location::SourceLocation;
pub use parse_error::ParseError;
pub use severity::Severity;
