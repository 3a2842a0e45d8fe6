//! The ParseError type for wrapping parsing diagnostics.

use thiserror::Error;

use crate::error::{Diagnostic, SourceLocation};

/// A type alias for `Result<T, Diagnostic>`.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Error type for the parsing lifecycle.
///
/// Wraps one or more diagnostics from lexing, parsing or IR building.
/// Displays as the first diagnostic followed by `(+N more)`.
#[derive(Debug, Error)]
#[error("{}", summary(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the error and return its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Pair every diagnostic with its line and column in `source`.
    pub fn locate<'a>(
        &'a self,
        source: &'a str,
    ) -> impl Iterator<Item = (&'a Diagnostic, Option<SourceLocation>)> + 'a {
        self.diagnostics
            .iter()
            .map(move |diag| (diag, diag.location(source)))
    }
}

fn summary(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => String::new(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_parse_error_from_diagnostic() {
        let diag = Diagnostic::error("test error").with_code(ErrorCode::E300);
        let err: ParseError = diag.into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].message(), "test error");
    }

    #[test]
    fn test_parse_error_display_single() {
        let err: ParseError = Diagnostic::error("unexpected character").into();

        assert_eq!(err.to_string(), "error: unexpected character");
    }

    #[test]
    fn test_parse_error_display_multiple() {
        let diags = vec![
            Diagnostic::error("first error"),
            Diagnostic::error("second error"),
            Diagnostic::error("third error"),
        ];
        let err: ParseError = diags.into();

        assert_eq!(err.to_string(), "error: first error (+2 more)");
        assert_eq!(err.into_diagnostics().len(), 3);
    }

    #[test]
    fn test_parse_error_locate() {
        let source = "@diagram\n  ?";
        let err = ParseError::new(vec![
            Diagnostic::error("unexpected character").with_label(Span::new(11..12), "here"),
            Diagnostic::error("without span"),
        ]);

        let located: Vec<_> = err.locate(source).map(|(_, loc)| loc).collect();
        assert_eq!(located[0], Some(SourceLocation { line: 2, column: 3 }));
        assert_eq!(located[1], None);
    }
}
