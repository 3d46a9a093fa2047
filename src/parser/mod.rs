//! Parser module for Java sources
//!
//! Lexes and parses one `.java` compilation unit into an AST. Any lexical or
//! syntax error fails the whole unit.

pub mod lexer;
pub mod parser;
pub mod error;
pub mod span;

pub use lexer::Lexer;
pub use parser::Parser;
pub use error::{ParseError, ParseResult};
pub use span::{Span, Location, HasSpan};

use crate::ast::Ast;
use crate::error::Result;

/// Parse a Java source file into an AST
pub fn parse_java(source: &str) -> Result<Ast> {
    Ok(parser::parse(source)?)
}
