//! One checking run
//!
//! A [`CheckSession`] ties a semantic model and a source locator to the two
//! per-run caches. Construct one per run and drop it at the end; nothing is
//! persisted between runs.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{ClassName, SemanticModel, SourceTreeModel};
use crate::resolver::{AncestorMethodCache, Obligation, OverrideResolver};
use crate::source::{FsSourceLocator, SourceCache, SourceLocator};
use crate::verify::{SubjectSource, Violation};

pub struct CheckSession<M, L> {
    config: Config,
    model: M,
    locator: L,
    ancestors: AncestorMethodCache,
    sources: SourceCache,
}

impl CheckSession<SourceTreeModel, FsSourceLocator> {
    /// Index `config.source_root` and read subject sources from the same tree
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let model = SourceTreeModel::index(&config.source_root)?;
        let locator = FsSourceLocator::new(&config.source_root);
        Ok(Self::new(config, model, locator))
    }
}

impl<M: SemanticModel, L: SourceLocator> CheckSession<M, L> {
    pub fn new(config: Config, model: M, locator: L) -> Self {
        Self {
            config,
            model,
            locator,
            ancestors: AncestorMethodCache::new(),
            sources: SourceCache::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn ancestor_cache(&self) -> &AncestorMethodCache {
        &self.ancestors
    }

    pub fn source_cache(&self) -> &SourceCache {
        &self.sources
    }

    /// Obligations `class` has to discharge, in declaration order
    pub fn obligations(&mut self, class: &ClassName) -> Vec<Obligation> {
        OverrideResolver::new(&self.model, &self.config.marker, &self.config.root_class)
            .resolve(class, &mut self.ancestors)
    }

    /// Verify every obligation of `class` and return the ones that failed
    ///
    /// Unless violations are accumulated, verification of the class stops at the
    /// first failure. Source is only loaded when there is something to verify.
    pub fn check_class(&mut self, class: &ClassName) -> Result<Vec<Violation>> {
        if !self.model.is_class(class) {
            log::debug!("{}: not a class, skipped", class);
            return Ok(Vec::new());
        }
        let obligations = self.obligations(class);
        if obligations.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!("{}: verifying {} obligation(s)", class, obligations.len());
        let text = self.sources.get_or_load(class, &self.locator)?;
        let subject = SubjectSource::parse(text)?;

        let mut violations = Vec::new();
        for obligation in &obligations {
            if subject.verify(obligation) {
                continue;
            }
            violations.push(Violation::new(class.clone(), obligation));
            if !self.config.accumulate_violations {
                break;
            }
        }
        Ok(violations)
    }

    /// Check a batch of classes
    ///
    /// Fails with [`Error::ContractViolation`] on the first violation, or with
    /// [`Error::ContractViolations`] after the whole batch when violations are
    /// accumulated. Unavailable or unparsable sources end the run immediately.
    pub fn check_all<'c, I>(&mut self, roots: I) -> Result<()>
    where
        I: IntoIterator<Item = &'c ClassName>,
    {
        let mut checked = 0;
        let mut collected = Vec::new();

        for class in roots {
            let violations = self.check_class(class)?;
            checked += 1;
            if violations.is_empty() {
                continue;
            }
            if !self.config.accumulate_violations {
                let mut violations = violations;
                return Err(Error::ContractViolation(violations.swap_remove(0)));
            }
            collected.extend(violations);
        }

        log::info!(
            "checked {} class(es), {} ancestor(s) cached, {} source(s) loaded",
            checked,
            self.ancestors.len(),
            self.sources.len()
        );
        match collected.len() {
            0 => Ok(()),
            1 => Err(Error::ContractViolation(collected.remove(0))),
            _ => Err(Error::ContractViolations(collected)),
        }
    }
}
