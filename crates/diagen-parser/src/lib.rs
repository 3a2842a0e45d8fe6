//! # Diagen Parser
//!
//! Parser for the Diagen diagram language. This crate provides the parsing
//! pipeline from source text to the diagram intermediate representation.
//!
//! ## Usage
//!
//! ```
//! # use diagen_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         @diagram flowchart
//!         ---
//!         title: "Checkout"
//!         ---
//!         cart -> payment: "pay" -> receipt
//!         (cart, receipt) --> audit
//!     "#;
//!
//!     let ir = parse(source)?;
//!     assert_eq!(ir.nodes.len(), 4);
//!     assert_eq!(ir.edges.len(), 4);
//!     Ok(())
//! }
//! ```

mod elaborate;
pub mod error;
mod lexer;
mod parser;
#[cfg(test)]
mod parser_tests;
mod parser_types;
mod span;
mod tokens;

pub use span::Span;

use log::{debug, info};

use diagen_core::ir::DiagramIr;

use elaborate::Builder;
use error::ParseError;

/// Parse source text into a diagram IR.
///
/// This is the main entry point for parsing Diagen source code.
/// It orchestrates the complete parsing pipeline:
///
/// 1. **Tokenize** - Convert source text to tokens
/// 2. **Parse** - Build the syntax tree from tokens, recovering per line
/// 3. **Build** - Transform the syntax tree into the IR
///
/// Lexical errors stop the pipeline before parsing. Syntax errors are all
/// collected before returning. IR construction stops at its first error.
///
/// # Arguments
///
/// * `source` - The Diagen source code to parse
///
/// # Returns
///
/// Returns the [`DiagramIr`] on success, or a [`ParseError`] whose
/// diagnostics can be located in `source` with [`ParseError::locate`].
///
/// # Example
///
/// ```
/// # use diagen_parser::parse;
///
/// let err = parse("@diagram\nA -> \"B\"\n").unwrap_err();
/// let (diagnostic, location) = err.locate("@diagram\nA -> \"B\"\n").next().unwrap();
/// assert!(diagnostic.message().starts_with("unexpected token"));
/// assert_eq!(location.map(|l| l.line), Some(2));
/// ```
pub fn parse(source: &str) -> Result<DiagramIr, ParseError> {
    info!(source_len = source.len(); "Parsing diagram source");

    // Step 1: Tokenize
    let tokens = lexer::tokenize(source)?;
    debug!(token_count = tokens.len(); "Tokenization completed");

    // Step 2: Parse
    let document = parser::build_document(&tokens)?;
    debug!(statements = document.body.len(); "Syntax tree built");

    // Step 3: Build
    let builder = Builder::new(source);
    Ok(builder.build(&document)?)
}
