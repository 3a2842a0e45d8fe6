//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span in the source.
///
/// A primary label marks where the problem is. A secondary label adds
/// context elsewhere, such as the opening brace of an unclosed group:
///
/// ```text
/// error[E100]: unexpected token: expected `}`
///   --> flow.dg:3:1
///    |
///  2 | group backend {
///    |               - group opened here
///  3 | @page
///    | ^^^^^ unexpected token
/// ```
#[derive(Debug, Clone)]
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

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
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
