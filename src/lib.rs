//! callsuper
//!
//! Checks the must-call-super contract on Java sources: every override of a
//! method annotated with the marker (`@MustCallSuper` by default) has to invoke
//! the overridden method through `super` as its literal first statement.
//!
//! ## Architecture
//!
//! - **parser**: Lexical analysis and parsing of Java source into AST
//! - **ast**: Abstract Syntax Tree representation of parsed code
//! - **model**: The semantic model the resolver consults, and a source-tree implementation of it
//! - **resolver**: Walks ancestors and produces the obligations of a class
//! - **verify**: Checks one obligation against the source of the overriding class
//! - **source**: Locates and caches subject source text
//! - **session**: Drives a run over a batch of classes
//! - **bin**: Command-line interface
//!
//! ## Check Flow
//!
//! ```text
//! SemanticModel → OverrideResolver → Obligations
//!                                        ↓
//! SourceLocator → Source text → Parser → AST → first-statement check → Violation?
//! ```

pub mod ast;
pub mod config;
pub mod consts;
pub mod error;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod session;
pub mod source;
pub mod verify;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{ClassName, MethodSignature, SemanticModel, SourceTreeModel, Visibility};
pub use resolver::{AncestorMethodCache, Obligation, OverrideResolver};
pub use session::CheckSession;
pub use source::{FsSourceLocator, SourceCache, SourceLocator};
pub use verify::{signature_similar, verify, SubjectSource, Violation};

/// Check `classes` against the tree under `config.source_root`
///
/// With no classes given, every top-level class of the tree is checked. Only
/// top-level classes own a source file; naming a nested class is a config error.
pub fn check_tree(config: Config, classes: &[ClassName]) -> Result<()> {
    let mut session = CheckSession::from_config(config)?;
    if let Some(nested) = classes.iter().find(|c| session.model().is_nested(c)) {
        return Err(Error::config_error(format!(
            "{} is a nested type; name its top-level class instead",
            nested
        )));
    }
    let roots = if classes.is_empty() {
        session.model().top_level_types()
    } else {
        classes.to_vec()
    };
    session.check_all(&roots)
}
