//! The core diagnostic type for the Diagen error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, multiple labeled source spans, and help text.

use std::fmt;

use crate::{
    error::{Severity, SourceLocation, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A rich diagnostic message with source location information.
///
/// Diagnostics provide detailed information about errors and warnings,
/// including:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - One or more labeled source spans
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// error[E100]: unexpected token: expected node set
///   --> flow.dg:4:6
///    |
///  4 | A -> -> B
///    |      ^^ unexpected token
///    |
///    = help: check syntax and token positioning
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use diagen_parser::error::{Diagnostic, ErrorCode};
    /// # use diagen_parser::Span;
    ///
    /// let span = Span::new(0..10);
    /// let diag = Diagnostic::error("invalid value for `strokeWidth`")
    ///     .with_code(ErrorCode::E301)
    ///     .with_label(span, "expected a number")
    ///     .with_help("write the width as a plain number, e.g. `strokeWidth: 2`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Get the span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    /// Resolve the primary span to a line and column in `source`.
    pub fn location(&self, source: &str) -> Option<SourceLocation> {
        self.primary_span()
            .map(|span| SourceLocation::from_offset(source, span.start()))
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
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
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert!(!diag.severity().is_warning());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
        assert!(diag.primary_span().is_none());
    }

    #[test]
    fn test_diagnostic_with_label() {
        let diag = Diagnostic::error("test error").with_label(Span::new(10..20), "error here");

        assert_eq!(diag.labels().len(), 1);
        assert!(diag.labels()[0].is_primary());
        assert_eq!(diag.labels()[0].message(), "error here");
        assert_eq!(diag.primary_span(), Some(Span::new(10..20)));
    }

    #[test]
    fn test_primary_span_skips_secondary_labels() {
        let diag = Diagnostic::error("conflicting definition")
            .with_secondary_label(Span::new(0..3), "first defined here")
            .with_label(Span::new(10..13), "defined again here");

        assert!(diag.labels()[0].is_secondary());
        assert_eq!(diag.primary_span(), Some(Span::new(10..13)));
    }

    #[test]
    fn test_diagnostic_location() {
        let source = "@diagram\nA -> ?";
        let diag = Diagnostic::error("unexpected character").with_label(Span::new(14..15), "here");

        let location = diag.location(source).unwrap();
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 6);
        assert!(Diagnostic::error("no span").location(source).is_none());
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("unexpected closing brace").with_code(ErrorCode::E102);

        assert_eq!(diag.to_string(), "error[E102]: unexpected closing brace");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("element definitions are not materialized");

        assert_eq!(
            diag.to_string(),
            "warning: element definitions are not materialized"
        );
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("unknown direction `UP`")
            .with_code(ErrorCode::E302)
            .with_label(Span::new(100..102), "invalid direction")
            .with_help("use one of TB, BT, LR, RL");

        assert_eq!(diag.code(), Some(ErrorCode::E302));
        assert_eq!(diag.help(), Some("use one of TB, BT, LR, RL"));
    }
}
