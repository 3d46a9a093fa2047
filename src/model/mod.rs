//! Semantic model consumed by the override resolver
//!
//! The resolver never looks at syntax. Everything it knows about classes and
//! methods comes through [`SemanticModel`], so a compiler front end, the
//! source-tree index in [`source_tree`] or a hand-built test graph can all drive it.

pub mod source_tree;

pub use source_tree::SourceTreeModel;

use std::fmt;

use crate::ast::Modifier;

/// Qualified class name, the handle used for every class in the model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment: `TestSon` for `com.test.TestSon`
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ClassName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

impl Visibility {
    pub fn from_modifiers(modifiers: &[Modifier]) -> Self {
        if modifiers.contains(&Modifier::Public) {
            Visibility::Public
        } else if modifiers.contains(&Modifier::Protected) {
            Visibility::Protected
        } else if modifiers.contains(&Modifier::Private) {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }
}

/// Method as the semantic model reports it
///
/// Types are canonical text: qualified names for declared types, bare names for
/// primitives and type variables. Compared structurally, never by identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub simple_name: String,
    pub return_type: String,
    pub parameter_types: Vec<String>,
    pub is_abstract: bool,
    /// Set by the resolver once the method is known to carry the marker
    pub has_marker: bool,
    pub is_static: bool,
    pub visibility: Visibility,
}

impl MethodSignature {
    pub fn new(simple_name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            simple_name: simple_name.into(),
            return_type: return_type.into(),
            parameter_types: Vec::new(),
            is_abstract: false,
            has_marker: false,
            is_static: false,
            visibility: Visibility::Public,
        }
    }

    pub fn with_parameters<I, S>(mut self, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_types = parameter_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn abstract_method(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn static_method(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn marked(mut self, has_marker: bool) -> Self {
        self.has_marker = has_marker;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

/// `name(type, type)`, the form used in diagnostics
impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.simple_name, self.parameter_types.join(", "))
    }
}

/// Host semantic model
///
/// Implementations answer from whatever they were built on; the resolver only
/// requires that answers stay stable for the duration of one run.
pub trait SemanticModel {
    /// Methods declared directly in `class`, constructors excluded
    fn methods_of(&self, class: &ClassName) -> Vec<MethodSignature>;

    /// Direct superclass; `None` past the top of the hierarchy or for unknown classes
    fn superclass_of(&self, class: &ClassName) -> Option<ClassName>;

    /// Whether `method`, as a member of `in_class`, overrides `candidate`
    fn overrides(&self, method: &MethodSignature, candidate: &MethodSignature, in_class: &ClassName) -> bool;

    /// Qualified names of the annotations on `method` declared in `class`
    fn annotations_of(&self, class: &ClassName, method: &MethodSignature) -> Vec<String>;

    /// Only classes are checked; interfaces, enums and annotation types are skipped
    fn is_class(&self, _class: &ClassName) -> bool {
        true
    }
}

impl<M: SemanticModel + ?Sized> SemanticModel for &M {
    fn methods_of(&self, class: &ClassName) -> Vec<MethodSignature> {
        (**self).methods_of(class)
    }

    fn superclass_of(&self, class: &ClassName) -> Option<ClassName> {
        (**self).superclass_of(class)
    }

    fn overrides(&self, method: &MethodSignature, candidate: &MethodSignature, in_class: &ClassName) -> bool {
        (**self).overrides(method, candidate, in_class)
    }

    fn annotations_of(&self, class: &ClassName, method: &MethodSignature) -> Vec<String> {
        (**self).annotations_of(class, method)
    }

    fn is_class(&self, class: &ClassName) -> bool {
        (**self).is_class(class)
    }
}
