//! Run configuration
//!
//! The source root follows a fixed priority, highest first:
//! 1. an explicit value (command line argument)
//! 2. the `CALLSUPER_SOURCE_ROOT` environment variable
//! 3. `src/main/java` relative to the working directory

use std::env;
use std::path::{Path, PathBuf};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory that qualified class names are resolved against
    pub source_root: PathBuf,
    /// Qualified name of the marker annotation
    pub marker: String,
    /// Qualified name of the universal root class
    pub root_class: String,
    /// Collect every violation of a batch instead of stopping at the first
    pub accumulate_violations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            marker: DEFAULT_MARKER_ANNOTATION.to_string(),
            root_class: DEFAULT_ROOT_CLASS.to_string(),
            accumulate_violations: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with the environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.source_root = Self::resolve_source_root(None);
        if let Ok(marker) = env::var(ENV_MARKER) {
            if !marker.trim().is_empty() {
                log::debug!("marker from {}: {}", ENV_MARKER, marker);
                config.marker = marker.trim().to_string();
            }
        }
        config
    }

    /// Resolve the source root following the priority documented on this module
    pub fn resolve_source_root(explicit: Option<&Path>) -> PathBuf {
        if let Some(root) = explicit {
            log::debug!("source root from argument: {}", root.display());
            return root.to_path_buf();
        }
        if let Ok(root) = env::var(ENV_SOURCE_ROOT) {
            if !root.is_empty() {
                log::debug!("source root from {}: {}", ENV_SOURCE_ROOT, root);
                return PathBuf::from(root);
            }
        }
        log::debug!("source root defaulted to {}", DEFAULT_SOURCE_ROOT);
        PathBuf::from(DEFAULT_SOURCE_ROOT)
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_root_class(mut self, root_class: impl Into<String>) -> Self {
        self.root_class = root_class.into();
        self
    }

    pub fn accumulate(mut self, accumulate: bool) -> Self {
        self.accumulate_violations = accumulate;
        self
    }

    /// Reject settings that would make every lookup miss
    pub fn validate(&self) -> crate::Result<()> {
        if self.marker.trim().is_empty() {
            return Err(crate::Error::config_error("marker annotation name is empty"));
        }
        if self.root_class.trim().is_empty() {
            return Err(crate::Error::config_error("root class name is empty"));
        }
        Ok(())
    }

    /// Simple name of the marker, e.g. `MustCallSuper`
    pub fn marker_simple_name(&self) -> &str {
        self.marker.rsplit('.').next().unwrap_or(&self.marker)
    }
}
