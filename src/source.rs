//! Locating and caching subject-class source text

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::consts::JAVA_SOURCE_EXTENSION;
use crate::error::{Error, Result};
use crate::model::ClassName;

/// Maps a qualified class name to the text of its source file
pub trait SourceLocator {
    fn locate(&self, class: &ClassName) -> Result<String>;
}

impl<L: SourceLocator + ?Sized> SourceLocator for &L {
    fn locate(&self, class: &ClassName) -> Result<String> {
        (**self).locate(class)
    }
}

/// Resolves `a.b.C` to `<root>/a/b/C.java`
///
/// Every segment maps to a path component, so only top-level classes are
/// found; `a.Outer.Inner` looks for `a/Outer/Inner.java`.
#[derive(Debug, Clone)]
pub struct FsSourceLocator {
    root: PathBuf,
}

impl FsSourceLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, class: &ClassName) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(class.as_str().split('.'));
        path.set_extension(JAVA_SOURCE_EXTENSION);
        path
    }
}

impl SourceLocator for FsSourceLocator {
    fn locate(&self, class: &ClassName) -> Result<String> {
        let path = self.path_of(class);
        log::debug!("loading {} from {}", class, path.display());
        fs::read_to_string(&path).map_err(|source| Error::SourceUnavailable {
            class: class.to_string(),
            path,
            source,
        })
    }
}

/// Source text per subject class, loaded at most once per run
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<ClassName, String>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached text of `class`, asking `locator` only on the first lookup
    ///
    /// A failed load leaves no entry behind.
    pub fn get_or_load<L: SourceLocator + ?Sized>(&mut self, class: &ClassName, locator: &L) -> Result<&str> {
        let text = match self.entries.entry(class.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(locator.locate(class)?),
        };
        Ok(text.as_str())
    }

    pub fn contains(&self, class: &ClassName) -> bool {
        self.entries.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
