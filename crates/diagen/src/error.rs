//! Error types for Diagen operations.
//!
//! This module provides the main error type [`DiagenError`] returned by the
//! end-to-end entry points. Library-internal stages report structured
//! results instead and are converted here only at the top level.

use std::io;

use thiserror::Error;

use diagen_parser::error::ParseError;

use crate::compiler::{Issue, join_messages};

/// The main error type for Diagen operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the diagnostics so that
/// callers can resolve spans to lines and columns or render them with
/// source snippets.
#[derive(Debug, Error)]
pub enum DiagenError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("{0}")]
    Compile(String),

    /// Strict validation failed; every error is kept.
    #[error("Compilation failed:\n{}", join_messages(.0))]
    Validation(Vec<Issue>),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiagenError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// The parse diagnostics rendered as `Parse error:` followed by one
    /// message per line, each prefixed with its location when known.
    pub fn parse_summary(err: &ParseError, src: &str) -> String {
        let messages: Vec<String> = err
            .locate(src)
            .map(|(diagnostic, location)| match location {
                Some(location) => format!("{location}: {}", diagnostic.message()),
                None => diagnostic.message().to_string(),
            })
            .collect();
        format!("Parse error:\n{}", messages.join("\n"))
    }
}
