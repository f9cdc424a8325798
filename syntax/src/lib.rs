//! Horn Syntax Library
//!
//! Parses horn source (modules, type signatures, facts and rules) into an
//! AST that renders as S-expressions.

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod parser;

pub use ast::Program;
pub use error::{Location, ParseError};
pub use parser::{parse_entry, parse_program, parse_with, Entry, ParseOptions, Syntax};

/// Parse source string and render it as an S-expression (for testing)
pub fn render(entry: Entry, source: &str) -> Result<String, ParseError> {
    parse_entry(entry, source).map(|syntax| syntax.to_string())
}
