//! Syntax tree for Java compilation units
//!
//! Built by the parser for one source file and discarded once that file has been checked.

mod nodes;
mod printer;

pub use nodes::*;
pub use printer::*;

pub use crate::parser::span::{HasSpan, Location, Span};

use std::fmt;

/// Main AST root node
#[derive(Debug, Clone)]
pub struct Ast {
    pub package_decl: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub type_decls: Vec<TypeDecl>,
    pub span: Span,
}

impl Ast {
    pub fn package_name(&self) -> Option<&str> {
        self.package_decl.as_ref().map(|p| p.name.as_str())
    }

    /// Qualified name of a top-level type declared in this unit
    pub fn qualified_name_of(&self, type_decl: &TypeDecl) -> String {
        match self.package_name() {
            Some(pkg) => format!("{}.{}", pkg, type_decl.name()),
            None => type_decl.name().to_string(),
        }
    }
}

impl HasSpan for Ast {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", AstPrinter::new().print(self))
    }
}
