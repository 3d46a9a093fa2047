//! Source verification of call-super obligations
//!
//! Works on source text rather than compiled classes: when the check runs, the
//! subject class and its dependencies may not have been compiled yet.

mod first_statement;
mod signature;

pub use first_statement::{inspect, FirstStatement};
pub use signature::{declaration_matches, return_type_equal, signature_similar};

use std::fmt;

use crate::ast::{Ast, TypeDecl};
use crate::error::{Error, Result};
use crate::model::{ClassName, MethodSignature};
use crate::parser::parse_java;
use crate::resolver::Obligation;

/// An obligation whose verification failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub class: ClassName,
    pub method: MethodSignature,
    pub ancestor_class: ClassName,
    pub ancestor_method: MethodSignature,
}

impl Violation {
    pub fn new(class: ClassName, obligation: &Obligation) -> Self {
        Self {
            class,
            method: obligation.subject_method.clone(),
            ancestor_class: obligation.ancestor_class.clone(),
            ancestor_method: obligation.ancestor_method.clone(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class: [{}], method: [{}] does not call super.{} of [{}] as its first statement",
            self.class, self.method.simple_name, self.ancestor_method, self.ancestor_class
        )
    }
}

/// Parsed source of one subject class
///
/// The unit must declare exactly one top-level type; that type is the subject.
#[derive(Debug)]
pub struct SubjectSource {
    ast: Ast,
}

impl SubjectSource {
    pub fn parse(source: &str) -> Result<Self> {
        let ast = parse_java(source)?;
        if ast.type_decls.len() != 1 {
            return Err(Error::TopLevelTypes { found: ast.type_decls.len() });
        }
        Ok(Self { ast })
    }

    pub fn subject(&self) -> &TypeDecl {
        &self.ast.type_decls[0]
    }

    pub fn qualified_name(&self) -> String {
        self.ast.qualified_name_of(self.subject())
    }

    /// Whether the overriding declaration starts with the required super call
    ///
    /// A subject method with no matching declaration in the source counts as a failure.
    pub fn verify(&self, obligation: &Obligation) -> bool {
        let subject = self.subject();
        let Some(decl) = subject.methods().find(|d| declaration_matches(d, &obligation.subject_method)) else {
            log::debug!("{}: no declaration of {} in source", subject.name(), obligation.subject_method);
            return false;
        };
        let finding = inspect(decl, &obligation.ancestor_method);
        log::debug!("{}.{} {}", subject.name(), obligation.subject_method, finding);
        finding.is_satisfied()
    }
}

/// Parse `source` and verify one obligation against it
pub fn verify(source: &str, obligation: &Obligation) -> Result<bool> {
    Ok(SubjectSource::parse(source)?.verify(obligation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obligation() -> Obligation {
        let m1 = MethodSignature::new("m1", "void").with_parameters(["java.lang.String"]);
        Obligation {
            subject_method: m1.clone(),
            ancestor_class: ClassName::from("com.test.TestParent"),
            ancestor_method: m1.marked(true),
        }
    }

    #[test]
    fn verifies_single_type_unit() {
        let source = "package com.test; public class TestSon extends TestParent { public void m1(String s) { super.m1(s); } }";
        assert!(verify(source, &obligation()).expect("verify"));
        assert_eq!(SubjectSource::parse(source).expect("parse").qualified_name(), "com.test.TestSon");
    }

    #[test]
    fn missing_declaration_is_a_failure() {
        let source = "class TestSon { public void m2(String s) { super.m1(s); } }";
        assert!(!verify(source, &obligation()).expect("verify"));
    }

    #[test]
    fn multiple_top_level_types_are_rejected() {
        let err = verify("class A {} class B {}", &obligation()).unwrap_err();
        assert!(matches!(err, Error::TopLevelTypes { found: 2 }));
        assert!(err.is_parse_failure());
        let err = verify("package p;", &obligation()).unwrap_err();
        assert!(matches!(err, Error::TopLevelTypes { found: 0 }));
    }

    #[test]
    fn violation_message_names_class_method_and_ancestor() {
        let violation = Violation::new(ClassName::from("com.test.TestSon"), &obligation());
        assert_eq!(
            violation.to_string(),
            "class: [com.test.TestSon], method: [m1] does not call super.m1(java.lang.String) of [com.test.TestParent] as its first statement"
        );
    }
}
