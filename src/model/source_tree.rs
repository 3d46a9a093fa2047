//! Semantic model built from a tree of Java sources
//!
//! Stands in for the compiler's own model when the checker runs on its own.
//! Every `.java` file under a root is parsed and its types are indexed by
//! qualified name. Type names are resolved the way javac prints them:
//! single-type imports, enclosing and nested types, the current package,
//! on-demand imports and finally `java.lang`. Parameter and return types keep
//! their type arguments as written; override checks compare erasures.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use walkdir::WalkDir;

use super::{ClassName, MethodSignature, SemanticModel, Visibility};
use crate::ast::*;
use crate::consts::*;
use crate::error::{Error, Result};
use crate::parser::parse_java;

static JAVA_LANG: Lazy<HashSet<&'static str>> = Lazy::new(|| JAVA_LANG_SIMPLE_TYPES.iter().copied().collect());
static PRIMITIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| PRIMITIVE_TYPES.iter().copied().collect());

const OBJECT: &str = "java.lang.Object";
const ENUM: &str = "java.lang.Enum";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    fn of(type_decl: &TypeDecl) -> Self {
        match type_decl {
            TypeDecl::Class(_) => TypeKind::Class,
            TypeDecl::Interface(_) => TypeKind::Interface,
            TypeDecl::Enum(_) => TypeKind::Enum,
            TypeDecl::Annotation(_) => TypeKind::Annotation,
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedMethod {
    signature: MethodSignature,
    erased_parameters: Vec<String>,
    annotations: Vec<String>,
}

impl IndexedMethod {
    fn declares(&self, method: &MethodSignature) -> bool {
        self.signature.simple_name == method.simple_name && self.signature.parameter_types == method.parameter_types
    }
}

#[derive(Debug, Clone)]
struct IndexedType {
    kind: TypeKind,
    top_level: bool,
    package: Option<String>,
    superclass: Option<ClassName>,
    methods: Vec<IndexedMethod>,
    path: Option<PathBuf>,
}

/// Index of every type declared under a source root
#[derive(Debug, Default)]
pub struct SourceTreeModel {
    types: BTreeMap<ClassName, IndexedType>,
}

impl SourceTreeModel {
    /// Index every `.java` file below `root`
    ///
    /// Unreadable files are skipped with a warning. A file that does not parse
    /// fails the whole index, since its classes could otherwise escape the check.
    pub fn index(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::config_error(format!("source root {} is not a directory", root.display())));
        }

        let mut units = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_map(std::result::Result::ok) {
            if units.len() >= MAX_INDEXED_FILES {
                log::warn!("stopped indexing after {} files under {}", MAX_INDEXED_FILES, root.display());
                break;
            }
            let path = entry.path();
            let is_java = path.extension().map(|e| e == JAVA_SOURCE_EXTENSION).unwrap_or(false);
            if !entry.file_type().is_file() || !is_java {
                continue;
            }
            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    log::warn!("skipping unreadable {}: {}", path.display(), e);
                    continue;
                }
            };
            match parse_java(&source) {
                Ok(ast) => units.push((Some(path.to_path_buf()), ast)),
                Err(e) => {
                    log::error!("{}: {}", path.display(), e);
                    return Err(e);
                }
            }
        }

        let model = Self::from_units(units);
        log::info!("indexed {} types under {}", model.len(), root.display());
        Ok(model)
    }

    /// Index in-memory compilation units; any parse failure is an error here
    pub fn from_sources<'a, I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let units = sources
            .into_iter()
            .map(|source| parse_java(source).map(|ast| (None, ast)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_units(units))
    }

    fn from_units(units: Vec<(Option<PathBuf>, Ast)>) -> Self {
        // Every declared name must be known before any reference is resolved
        let mut known = HashSet::new();
        for (_, ast) in &units {
            for type_decl in &ast.type_decls {
                collect_names(&ast.qualified_name_of(type_decl), type_decl, &mut known);
            }
        }

        let mut types = BTreeMap::new();
        for (path, ast) in &units {
            for type_decl in &ast.type_decls {
                let scope = TypeScope {
                    package: ast.package_name(),
                    imports: &ast.imports,
                    known: &known,
                    enclosing: Vec::new(),
                    type_vars: Vec::new(),
                };
                let name = ast.qualified_name_of(type_decl);
                index_type(&mut types, &scope, type_decl, name, true, path.as_deref());
            }
        }
        Self { types }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, class: &ClassName) -> bool {
        self.types.contains_key(class)
    }

    pub fn kind_of(&self, class: &ClassName) -> Option<TypeKind> {
        self.types.get(class).map(|t| t.kind)
    }

    /// File the type was read from, when indexed from disk
    pub fn path_of(&self, class: &ClassName) -> Option<&Path> {
        self.types.get(class).and_then(|t| t.path.as_deref())
    }

    /// Indexed type declared inside another type
    pub fn is_nested(&self, class: &ClassName) -> bool {
        self.types.get(class).map(|t| !t.top_level).unwrap_or(false)
    }

    /// Top-level types in name order; nested types never own a source file
    pub fn top_level_types(&self) -> Vec<ClassName> {
        self.types
            .iter()
            .filter(|(_, t)| t.top_level)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Walk up from `start` to the first type declaring `method`
    fn find_declaration(&self, start: &ClassName, method: &MethodSignature) -> Option<(&IndexedType, &IndexedMethod)> {
        let mut current = Some(start.clone());
        for _ in 0..MAX_HIERARCHY_STEPS {
            let name = current?;
            let indexed = self.types.get(&name)?;
            if let Some(m) = indexed.methods.iter().find(|m| m.declares(method)) {
                return Some((indexed, m));
            }
            current = indexed.superclass.clone();
        }
        None
    }
}

fn collect_names(name: &str, type_decl: &TypeDecl, known: &mut HashSet<String>) {
    known.insert(name.to_string());
    for member in type_decl.members() {
        if let ClassMember::TypeDecl(nested) = member {
            collect_names(&format!("{}.{}", name, nested.name()), nested, known);
        }
    }
}

fn type_params_of(type_decl: &TypeDecl) -> &[TypeParam] {
    match type_decl {
        TypeDecl::Class(c) => &c.type_params,
        TypeDecl::Interface(i) => &i.type_params,
        _ => &[],
    }
}

fn index_type(
    types: &mut BTreeMap<ClassName, IndexedType>,
    outer: &TypeScope<'_>,
    type_decl: &TypeDecl,
    name: String,
    top_level: bool,
    path: Option<&Path>,
) {
    let mut scope = outer.clone();
    scope.enclosing.push(name.clone());
    scope.type_vars.extend(type_params_of(type_decl).iter().cloned());

    let kind = TypeKind::of(type_decl);
    let superclass = match type_decl {
        TypeDecl::Class(_) if name == OBJECT => None,
        TypeDecl::Class(c) => Some(ClassName::new(match &c.extends {
            Some(parent) => scope.erase(parent),
            None => OBJECT.to_string(),
        })),
        TypeDecl::Enum(_) => Some(ClassName::new(ENUM)),
        TypeDecl::Interface(_) | TypeDecl::Annotation(_) => None,
    };

    let in_interface = matches!(kind, TypeKind::Interface | TypeKind::Annotation);
    let methods = type_decl
        .methods()
        .map(|method| index_method(&scope, method, in_interface))
        .collect();

    log::debug!("indexed {} {}", type_decl.kind_name(), name);
    types.insert(
        ClassName::new(name.clone()),
        IndexedType {
            kind,
            top_level,
            package: scope.package.map(str::to_string),
            superclass,
            methods,
            path: path.map(Path::to_path_buf),
        },
    );

    for member in type_decl.members() {
        if let ClassMember::TypeDecl(nested) = member {
            let nested_name = format!("{}.{}", name, nested.name());
            index_type(types, &scope, nested, nested_name, false, path);
        }
    }
}

fn index_method(class_scope: &TypeScope<'_>, method: &MethodDecl, in_interface: bool) -> IndexedMethod {
    let mut scope = class_scope.clone();
    scope.type_vars.extend(method.type_params.iter().cloned());

    let is_static = method.has_modifier(Modifier::Static);
    let is_abstract = method.has_modifier(Modifier::Abstract) || (in_interface && method.body.is_none() && !is_static);
    let visibility = if in_interface && !method.has_modifier(Modifier::Private) {
        Visibility::Public
    } else {
        Visibility::from_modifiers(&method.modifiers)
    };

    let return_type = match &method.return_type {
        Some(t) => scope.render(t),
        None => "void".to_string(),
    };
    let parameter_types = method
        .parameters
        .iter()
        .map(|p| {
            let rendered = scope.render(&p.type_ref);
            if p.varargs { format!("{}...", rendered) } else { rendered }
        })
        .collect();
    let erased_parameters = method
        .parameters
        .iter()
        .map(|p| {
            let erased = scope.erase(&p.type_ref);
            if p.varargs { format!("{}[]", erased) } else { erased }
        })
        .collect();
    let annotations = method.annotations.iter().map(|a| scope.qualify(&a.name)).collect();

    IndexedMethod {
        signature: MethodSignature {
            simple_name: method.name.clone(),
            return_type,
            parameter_types,
            is_abstract,
            has_marker: false,
            is_static,
            visibility,
        },
        erased_parameters,
        annotations,
    }
}

/// Name resolution context of one type body
#[derive(Clone)]
struct TypeScope<'a> {
    package: Option<&'a str>,
    imports: &'a [ImportDecl],
    known: &'a HashSet<String>,
    /// Qualified names of the enclosing types, innermost last
    enclosing: Vec<String>,
    type_vars: Vec<TypeParam>,
}

impl TypeScope<'_> {
    fn type_var(&self, name: &str) -> Option<&TypeParam> {
        self.type_vars.iter().rev().find(|p| p.name == name)
    }

    fn on_demand_imports(&self) -> impl Iterator<Item = &ImportDecl> + '_ {
        self.imports.iter().filter(|i| i.is_wildcard && !i.is_static)
    }

    /// Resolve a simple name against declarations the index knows for certain
    fn lookup(&self, simple: &str) -> Option<String> {
        for import in self.imports.iter().filter(|i| !i.is_wildcard && !i.is_static) {
            if import.name.rsplit('.').next() == Some(simple) {
                return Some(import.name.clone());
            }
        }
        for enclosing in self.enclosing.iter().rev() {
            let candidate = format!("{}.{}", enclosing, simple);
            if self.known.contains(&candidate) {
                return Some(candidate);
            }
        }
        let same_package = match self.package {
            Some(pkg) => format!("{}.{}", pkg, simple),
            None => simple.to_string(),
        };
        if self.known.contains(&same_package) {
            return Some(same_package);
        }
        for import in self.on_demand_imports() {
            let candidate = format!("{}.{}", import.name, simple);
            if self.known.contains(&candidate) {
                return Some(candidate);
            }
        }
        if JAVA_LANG.contains(simple) {
            return Some(format!("java.lang.{}", simple));
        }
        None
    }

    /// Qualified form of a type or annotation name as written in source
    fn qualify(&self, name: &str) -> String {
        if let Some((first, rest)) = name.split_once('.') {
            // `Map.Entry` resolves through `Map`; anything else is already qualified
            return match self.lookup(first) {
                Some(outer) => format!("{}.{}", outer, rest),
                None => name.to_string(),
            };
        }
        if let Some(resolved) = self.lookup(name) {
            return resolved;
        }
        // Outside the index: the first on-demand import is the best guess
        if let Some(import) = self.on_demand_imports().next() {
            return format!("{}.{}", import.name, name);
        }
        match self.package {
            Some(pkg) => format!("{}.{}", pkg, name),
            None => name.to_string(),
        }
    }

    fn is_unqualified_type(&self, t: &TypeRef) -> bool {
        PRIMITIVES.contains(t.name.as_str()) || self.type_var(&t.name).is_some()
    }

    /// Canonical text: qualified name, type arguments as written, array suffix
    fn render(&self, t: &TypeRef) -> String {
        let mut text = if self.is_unqualified_type(t) {
            t.name.clone()
        } else {
            self.qualify(&t.name)
        };
        if !t.type_args.is_empty() {
            let args: Vec<String> = t.type_args.iter().map(|a| a.to_string()).collect();
            text.push_str(&format!("<{}>", args.join(", ")));
        }
        text.push_str(&"[]".repeat(t.array_dims));
        text
    }

    /// Erasure: type arguments dropped, type variables replaced by their first bound
    fn erase(&self, t: &TypeRef) -> String {
        let base = if PRIMITIVES.contains(t.name.as_str()) {
            t.name.clone()
        } else if let Some(var) = self.type_var(&t.name) {
            match var.bounds.first() {
                Some(bound) if self.type_var(&bound.name).is_none() => self.qualify(&bound.name),
                _ => OBJECT.to_string(),
            }
        } else {
            self.qualify(&t.name)
        };
        format!("{}{}", base, "[]".repeat(t.array_dims))
    }
}

impl SemanticModel for SourceTreeModel {
    fn methods_of(&self, class: &ClassName) -> Vec<MethodSignature> {
        self.types
            .get(class)
            .map(|t| t.methods.iter().map(|m| m.signature.clone()).collect())
            .unwrap_or_default()
    }

    fn superclass_of(&self, class: &ClassName) -> Option<ClassName> {
        self.types.get(class).and_then(|t| t.superclass.clone())
    }

    fn overrides(&self, method: &MethodSignature, candidate: &MethodSignature, in_class: &ClassName) -> bool {
        if method.simple_name != candidate.simple_name || method.arity() != candidate.arity() {
            return false;
        }
        if method.is_static || candidate.is_static || candidate.visibility == Visibility::Private {
            return false;
        }

        let own = self.find_declaration(in_class, method);
        let above = match &own {
            Some((declaring, _)) => declaring.superclass.clone(),
            None => self.superclass_of(in_class),
        };
        let inherited = above.and_then(|start| self.find_declaration(&start, candidate));

        match (own, inherited) {
            (Some((own_type, own_method)), Some((base_type, base_method))) => {
                // Package-private methods are only overridden from the same package
                if candidate.visibility == Visibility::Package && own_type.package != base_type.package {
                    return false;
                }
                own_method.erased_parameters == base_method.erased_parameters
            }
            _ => method.parameter_types == candidate.parameter_types,
        }
    }

    fn annotations_of(&self, class: &ClassName, method: &MethodSignature) -> Vec<String> {
        self.types
            .get(class)
            .and_then(|t| t.methods.iter().find(|m| m.declares(method)))
            .map(|m| m.annotations.clone())
            .unwrap_or_default()
    }

    fn is_class(&self, class: &ClassName) -> bool {
        self.kind_of(class) == Some(TypeKind::Class)
    }
}
