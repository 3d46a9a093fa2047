// Common test utilities
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use callsuper::{ClassName, Error, MethodSignature, Result, SemanticModel, SourceLocator};
use tempfile::TempDir;

pub const MARKER: &str = "callsuper.MustCallSuper";
pub const OBJECT: &str = "java.lang.Object";

/// Route library logs to the test harness; `RUST_LOG` still applies
pub fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .try_init();
}

/// Source root of the checked-in Java fixtures
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/src/main/java")
}

/// Write `(qualified class name, source)` pairs into a fresh source tree
pub fn source_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (class, source) in files {
        let mut path = dir.path().to_path_buf();
        path.extend(class.split('.'));
        path.set_extension("java");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, source).expect("write source");
    }
    dir
}

/// Copy of the fixture tree with `TestSon` replaced by `son`
pub fn fixture_tree_with_son(son: &str) -> TempDir {
    let root = fixture_root();
    let read = |rel: &str| fs::read_to_string(root.join(rel)).expect("read fixture");
    let marker = read("callsuper/MustCallSuper.java");
    let parent = read("com/test/TestParent.java");
    source_tree(&[
        ("callsuper.MustCallSuper", marker.as_str()),
        ("com.test.TestParent", parent.as_str()),
        ("com.test.TestSon", son),
    ])
}

pub fn sig(name: &str, params: &[&str]) -> MethodSignature {
    MethodSignature::new(name, "void").with_parameters(params.iter().copied())
}

#[derive(Default)]
struct StubClass {
    superclass: Option<String>,
    methods: Vec<MethodSignature>,
    marked: Vec<MethodSignature>,
    is_class: bool,
}

/// Hand-built class graph that counts `methods_of` calls per class
#[derive(Default)]
pub struct StubModel {
    classes: HashMap<String, StubClass>,
    lookups: RefCell<HashMap<String, usize>>,
}

impl StubModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, name: &str, superclass: &str) -> Self {
        let entry = self.classes.entry(name.to_string()).or_default();
        entry.superclass = Some(superclass.to_string());
        entry.is_class = true;
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.classes.entry(name.to_string()).or_default().is_class = false;
        self
    }

    pub fn method(mut self, class: &str, method: MethodSignature) -> Self {
        self.classes.entry(class.to_string()).or_default().methods.push(method);
        self
    }

    /// Declare `method` on `class` carrying the marker
    pub fn marked(mut self, class: &str, method: MethodSignature) -> Self {
        let entry = self.classes.entry(class.to_string()).or_default();
        entry.methods.push(method.clone());
        entry.marked.push(method);
        self
    }

    pub fn lookups(&self, class: &str) -> usize {
        self.lookups.borrow().get(class).copied().unwrap_or(0)
    }

    /// `C0 extends C1 extends ... extends C{depth} extends Object`
    ///
    /// `C{marked_at}` marks `run(java.lang.String)`, which `C0` overrides.
    pub fn chain(depth: usize, marked_at: usize) -> Self {
        let mut model = Self::new();
        for level in 0..=depth {
            let parent = if level == depth { OBJECT.to_string() } else { format!("C{}", level + 1) };
            model = model.class(&format!("C{}", level), &parent);
            model = model.method(&format!("C{}", level), sig(&format!("own{}", level), &[]));
        }
        model
            .method("C0", sig("run", &["java.lang.String"]))
            .marked(&format!("C{}", marked_at), sig("run", &["java.lang.String"]))
    }
}

impl SemanticModel for StubModel {
    fn methods_of(&self, class: &ClassName) -> Vec<MethodSignature> {
        *self.lookups.borrow_mut().entry(class.to_string()).or_insert(0) += 1;
        self.classes.get(class.as_str()).map(|c| c.methods.clone()).unwrap_or_default()
    }

    fn superclass_of(&self, class: &ClassName) -> Option<ClassName> {
        self.classes
            .get(class.as_str())
            .and_then(|c| c.superclass.as_deref())
            .map(ClassName::from)
    }

    fn overrides(&self, method: &MethodSignature, candidate: &MethodSignature, _in_class: &ClassName) -> bool {
        method.simple_name == candidate.simple_name
            && method.parameter_types == candidate.parameter_types
            && !method.is_static
            && !candidate.is_static
    }

    fn annotations_of(&self, class: &ClassName, method: &MethodSignature) -> Vec<String> {
        let marked = self
            .classes
            .get(class.as_str())
            .map(|c| c.marked.contains(method))
            .unwrap_or(false);
        if marked {
            vec![MARKER.to_string()]
        } else {
            Vec::new()
        }
    }

    fn is_class(&self, class: &ClassName) -> bool {
        self.classes.get(class.as_str()).map(|c| c.is_class).unwrap_or(true)
    }
}

/// In-memory sources that count loads per class
#[derive(Default)]
pub struct MemoryLocator {
    sources: HashMap<String, String>,
    loads: RefCell<HashMap<String, usize>>,
}

impl MemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: &str, source: &str) -> Self {
        self.sources.insert(class.to_string(), source.to_string());
        self
    }

    pub fn loads(&self, class: &str) -> usize {
        self.loads.borrow().get(class).copied().unwrap_or(0)
    }
}

impl SourceLocator for MemoryLocator {
    fn locate(&self, class: &ClassName) -> Result<String> {
        *self.loads.borrow_mut().entry(class.to_string()).or_insert(0) += 1;
        self.sources.get(class.as_str()).cloned().ok_or_else(|| Error::SourceUnavailable {
            class: class.to_string(),
            path: PathBuf::from(class.as_str()),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not in memory"),
        })
    }
}
