//! Line and column positions for reporting diagnostics without a renderer.

use std::fmt;

/// 1-based line and column of a byte offset in the source.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    /// Resolve a byte offset against the source text.
    ///
    /// Offsets past the end of the source clamp to the end. An offset inside a
    /// multi-byte character resolves to that character.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut line_start = 0;

        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                line_start = idx + 1;
            }
        }

        let column = source[line_start..]
            .char_indices()
            .take_while(|(idx, _)| line_start + idx < offset)
            .count()
            + 1;

        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
