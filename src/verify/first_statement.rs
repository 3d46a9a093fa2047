// Inspection of the first statement of an overriding method

use std::fmt;

use crate::ast::{Expr, MethodDecl, Stmt};
use crate::model::MethodSignature;

/// What the first statement of a method body turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstStatement {
    /// `super.name(args)` with the expected name and arity
    SuperCall,
    NoBody,
    EmptyBody,
    /// Not an expression statement wrapping a method call
    NotACall,
    /// A call without the bare `super` scope
    WrongScope,
    WrongName(String),
    WrongArity { expected: usize, found: usize },
}

impl FirstStatement {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, FirstStatement::SuperCall)
    }
}

impl fmt::Display for FirstStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirstStatement::SuperCall => write!(f, "calls super first"),
            FirstStatement::NoBody => write!(f, "has no body"),
            FirstStatement::EmptyBody => write!(f, "has an empty body"),
            FirstStatement::NotACall => write!(f, "does not start with a method call"),
            FirstStatement::WrongScope => write!(f, "starts with a call that is not scoped to super"),
            FirstStatement::WrongName(name) => write!(f, "starts with super.{}", name),
            FirstStatement::WrongArity { expected, found } => {
                write!(f, "passes {} argument(s) to super, expected {}", found, expected)
            }
        }
    }
}

/// Classify the first statement of `decl` against the ancestor method it must call
pub fn inspect(decl: &MethodDecl, ancestor: &MethodSignature) -> FirstStatement {
    let Some(body) = &decl.body else {
        return FirstStatement::NoBody;
    };
    let Some(first) = body.statements.first() else {
        return FirstStatement::EmptyBody;
    };
    let call = match first {
        Stmt::Expression(stmt) => match stmt.expr.as_method_call() {
            Some(call) => call,
            None => return FirstStatement::NotACall,
        },
        _ => return FirstStatement::NotACall,
    };
    if !call.target.as_deref().map(Expr::is_super_keyword).unwrap_or(false) {
        return FirstStatement::WrongScope;
    }
    if call.name != ancestor.simple_name {
        return FirstStatement::WrongName(call.name.clone());
    }
    // Argument types are not compared, only their number
    if call.arguments.len() != ancestor.arity() {
        return FirstStatement::WrongArity {
            expected: ancestor.arity(),
            found: call.arguments.len(),
        };
    }
    FirstStatement::SuperCall
}
