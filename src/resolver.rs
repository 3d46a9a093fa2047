//! Override resolution
//!
//! Walks the ancestors of a subject class and pairs each of its methods with the
//! nearest marker-bearing ancestor method it overrides. Every pair is an
//! [`Obligation`] the source verifier has to discharge.

use std::collections::HashMap;

use crate::consts::MAX_HIERARCHY_STEPS;
use crate::model::{ClassName, MethodSignature, SemanticModel};

/// A subject method that overrides a marked ancestor method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obligation {
    pub subject_method: MethodSignature,
    pub ancestor_class: ClassName,
    pub ancestor_method: MethodSignature,
}

/// Marker-bearing, non-abstract methods per ancestor class
///
/// Entries are computed on the first visit and never replaced; ancestor classes
/// do not change during a run.
#[derive(Debug, Default)]
pub struct AncestorMethodCache {
    entries: HashMap<ClassName, Vec<MethodSignature>>,
}

impl AncestorMethodCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, class: &ClassName) -> Option<&[MethodSignature]> {
        self.entries.get(class).map(Vec::as_slice)
    }

    /// Cached methods of `class`, running `populate` only on the first lookup
    pub fn get_or_populate<F>(&mut self, class: &ClassName, populate: F) -> &[MethodSignature]
    where
        F: FnOnce() -> Vec<MethodSignature>,
    {
        self.entries.entry(class.clone()).or_insert_with(populate)
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

/// Resolves obligations against one semantic model
pub struct OverrideResolver<'a, M: SemanticModel + ?Sized> {
    model: &'a M,
    marker: &'a str,
    root_class: &'a str,
}

impl<'a, M: SemanticModel + ?Sized> OverrideResolver<'a, M> {
    pub fn new(model: &'a M, marker: &'a str, root_class: &'a str) -> Self {
        Self { model, marker, root_class }
    }

    /// Obligations of `subject`, in the order its methods are declared
    pub fn resolve(&self, subject: &ClassName, cache: &mut AncestorMethodCache) -> Vec<Obligation> {
        let mut unmatched: Vec<(usize, MethodSignature)> =
            self.model.methods_of(subject).into_iter().enumerate().collect();
        let mut obligations: Vec<(usize, Obligation)> = Vec::new();
        let mut ancestor = self.model.superclass_of(subject);
        let mut steps = 0;

        while let Some(current) = ancestor {
            if unmatched.is_empty() || current.as_str() == self.root_class {
                break;
            }
            if steps == MAX_HIERARCHY_STEPS {
                log::warn!("gave up on the ancestors of {} after {} classes", subject, steps);
                break;
            }
            steps += 1;

            let marked = cache.get_or_populate(&current, || self.marked_methods(&current));
            unmatched.retain(|(position, method)| {
                match marked.iter().find(|candidate| self.model.overrides(method, candidate, subject)) {
                    Some(candidate) => {
                        obligations.push((
                            *position,
                            Obligation {
                                subject_method: method.clone(),
                                ancestor_class: current.clone(),
                                ancestor_method: candidate.clone(),
                            },
                        ));
                        false
                    }
                    None => true,
                }
            });

            ancestor = self.model.superclass_of(&current);
        }

        obligations.sort_by_key(|(position, _)| *position);
        log::debug!("{}: {} obligation(s) after {} ancestor(s)", subject, obligations.len(), steps);
        obligations.into_iter().map(|(_, obligation)| obligation).collect()
    }

    fn marked_methods(&self, ancestor: &ClassName) -> Vec<MethodSignature> {
        let marked: Vec<MethodSignature> = self
            .model
            .methods_of(ancestor)
            .into_iter()
            .filter(|m| !m.is_abstract)
            .filter(|m| self.model.annotations_of(ancestor, m).iter().any(|a| a == self.marker))
            .map(|m| m.marked(true))
            .collect();
        log::debug!("{}: {} marked method(s)", ancestor, marked.len());
        marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const MARKER: &str = "callsuper.MustCallSuper";
    const ROOT: &str = "java.lang.Object";

    /// Base -> Mid -> Leaf, with `run` marked on Base and `stop` marked on Mid
    struct Chain {
        lookups: Cell<usize>,
    }

    impl SemanticModel for Chain {
        fn methods_of(&self, class: &ClassName) -> Vec<MethodSignature> {
            self.lookups.set(self.lookups.get() + 1);
            match class.as_str() {
                "Base" => vec![MethodSignature::new("run", "void"), MethodSignature::new("stop", "void")],
                "Mid" => vec![MethodSignature::new("stop", "void")],
                "Leaf" => vec![
                    MethodSignature::new("stop", "void"),
                    MethodSignature::new("run", "void"),
                    MethodSignature::new("extra", "void"),
                ],
                _ => Vec::new(),
            }
        }

        fn superclass_of(&self, class: &ClassName) -> Option<ClassName> {
            match class.as_str() {
                "Leaf" => Some("Mid".into()),
                "Mid" => Some("Base".into()),
                "Base" => Some(ROOT.into()),
                _ => None,
            }
        }

        fn overrides(&self, method: &MethodSignature, candidate: &MethodSignature, _in_class: &ClassName) -> bool {
            method.simple_name == candidate.simple_name && method.parameter_types == candidate.parameter_types
        }

        fn annotations_of(&self, class: &ClassName, method: &MethodSignature) -> Vec<String> {
            match (class.as_str(), method.simple_name.as_str()) {
                ("Base", "run") | ("Base", "stop") | ("Mid", "stop") => vec![MARKER.to_string()],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn nearest_marked_ancestor_wins() {
        let model = Chain { lookups: Cell::new(0) };
        let resolver = OverrideResolver::new(&model, MARKER, ROOT);
        let mut cache = AncestorMethodCache::new();

        let obligations = resolver.resolve(&"Leaf".into(), &mut cache);
        let pairs: Vec<(&str, &str)> = obligations
            .iter()
            .map(|o| (o.subject_method.simple_name.as_str(), o.ancestor_class.as_str()))
            .collect();
        assert_eq!(pairs, vec![("stop", "Mid"), ("run", "Base")]);
        assert!(obligations.iter().all(|o| o.ancestor_method.has_marker));
    }

    #[test]
    fn cache_entries_are_written_once() {
        let model = Chain { lookups: Cell::new(0) };
        let resolver = OverrideResolver::new(&model, MARKER, ROOT);
        let mut cache = AncestorMethodCache::new();

        resolver.resolve(&"Leaf".into(), &mut cache);
        let after_first = model.lookups.get();
        resolver.resolve(&"Leaf".into(), &mut cache);

        // Only the subject's own methods are fetched again
        assert_eq!(model.lookups.get(), after_first + 1);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&ROOT.into()));
    }

    #[test]
    fn root_class_stops_the_walk() {
        let model = Chain { lookups: Cell::new(0) };
        let resolver = OverrideResolver::new(&model, MARKER, "Mid");
        let mut cache = AncestorMethodCache::new();

        assert!(resolver.resolve(&"Leaf".into(), &mut cache).is_empty());
        assert!(cache.is_empty());
    }
}
