use std::path::PathBuf;
use thiserror::Error;

use crate::verify::Violation;

/// Result type for callsuper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the call-super checker
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Lexical error at line {line}, column {column}: {message}")]
    Lexical {
        line: usize,
        column: usize,
        message: String,
    },

    /// The verifier only accepts single-type compilation units
    #[error("expected exactly one top-level type declaration, found {found}")]
    TopLevelTypes { found: usize },

    #[error("source of class '{class}' is unavailable at {}: {source}", .path.display())]
    SourceUnavailable {
        class: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    ContractViolation(Violation),

    #[error("{} call-super contract violations:\n{}", .0.len(), render_violations(.0))]
    ContractViolations(Vec<Violation>),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a parse error with location information
    pub fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Whether the error comes from reading source text into a syntax tree
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Error::Parse { .. } | Error::Lexical { .. } | Error::TopLevelTypes { .. })
    }
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}
