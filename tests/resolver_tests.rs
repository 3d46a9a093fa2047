mod common;

use callsuper::{AncestorMethodCache, ClassName, OverrideResolver};
use common::{sig, StubModel, MARKER, OBJECT};

fn resolve(model: &StubModel, subject: &str) -> Vec<(String, String)> {
    let resolver = OverrideResolver::new(model, MARKER, OBJECT);
    let mut cache = AncestorMethodCache::new();
    resolver
        .resolve(&ClassName::from(subject), &mut cache)
        .into_iter()
        .map(|o| (o.subject_method.to_string(), o.ancestor_class.to_string()))
        .collect()
}

#[test]
fn marked_method_found_at_any_depth() {
    for depth in [1, 2, 5] {
        for marked_at in 1..=depth {
            let model = StubModel::chain(depth, marked_at);
            assert_eq!(
                resolve(&model, "C0"),
                vec![("run(java.lang.String)".to_string(), format!("C{}", marked_at))],
                "depth {} marked at {}",
                depth,
                marked_at
            );
        }
    }
}

#[test]
fn abstract_ancestor_methods_are_excluded() {
    let model = StubModel::new()
        .class("Son", "Parent")
        .class("Parent", OBJECT)
        .method("Son", sig("m2", &["java.lang.String"]))
        .marked("Parent", sig("m2", &["java.lang.String"]).abstract_method(true));
    assert!(resolve(&model, "Son").is_empty());
}

#[test]
fn unmarked_overrides_have_no_obligation() {
    let model = StubModel::new()
        .class("Son", "Parent")
        .class("Parent", OBJECT)
        .method("Son", sig("m1", &["java.lang.String"]))
        .method("Parent", sig("m1", &["java.lang.String"]));
    assert!(resolve(&model, "Son").is_empty());
}

#[test]
fn overloads_are_not_overrides() {
    let model = StubModel::new()
        .class("Son", "Parent")
        .class("Parent", OBJECT)
        .method("Son", sig("m1", &["int"]))
        .marked("Parent", sig("m1", &["java.lang.String"]));
    assert!(resolve(&model, "Son").is_empty());
}

#[test]
fn nearest_marked_ancestor_wins() {
    let model = StubModel::new()
        .class("Leaf", "Mid")
        .class("Mid", "Base")
        .class("Base", OBJECT)
        .method("Leaf", sig("run", &[]))
        .marked("Mid", sig("run", &[]))
        .marked("Base", sig("run", &[]));
    assert_eq!(resolve(&model, "Leaf"), vec![("run()".to_string(), "Mid".to_string())]);
}

#[test]
fn obligations_follow_declaration_order() {
    let model = StubModel::new()
        .class("Leaf", "Mid")
        .class("Mid", "Base")
        .class("Base", OBJECT)
        .method("Leaf", sig("first", &[]))
        .method("Leaf", sig("second", &[]))
        .method("Leaf", sig("third", &[]))
        .marked("Mid", sig("second", &[]))
        .marked("Base", sig("first", &[]))
        .marked("Base", sig("third", &[]));
    let names: Vec<String> = resolve(&model, "Leaf").into_iter().map(|(m, _)| m).collect();
    assert_eq!(names, vec!["first()", "second()", "third()"]);
}

#[test]
fn walk_stops_once_every_method_is_matched() {
    let model = StubModel::new()
        .class("Leaf", "Mid")
        .class("Mid", "Base")
        .class("Base", OBJECT)
        .method("Leaf", sig("run", &[]))
        .marked("Mid", sig("run", &[]));
    assert_eq!(resolve(&model, "Leaf").len(), 1);
    assert_eq!(model.lookups("Base"), 0);
}

#[test]
fn configured_root_ends_the_walk() {
    let model = StubModel::chain(3, 3);
    let resolver = OverrideResolver::new(&model, MARKER, "C2");
    let mut cache = AncestorMethodCache::new();
    assert!(resolver.resolve(&ClassName::from("C0"), &mut cache).is_empty());
    assert!(!cache.contains(&ClassName::from("C2")));
    assert!(!cache.contains(&ClassName::from("C3")));
}

#[test]
fn ancestors_are_fetched_once_per_run() {
    let model = StubModel::chain(4, 4).class("Sibling", "C1").method("Sibling", sig("run", &["java.lang.String"]));
    let resolver = OverrideResolver::new(&model, MARKER, OBJECT);
    let mut cache = AncestorMethodCache::new();

    assert_eq!(resolver.resolve(&ClassName::from("C0"), &mut cache).len(), 1);
    assert_eq!(resolver.resolve(&ClassName::from("Sibling"), &mut cache).len(), 1);
    assert_eq!(resolver.resolve(&ClassName::from("C0"), &mut cache).len(), 1);

    for ancestor in ["C1", "C2", "C3", "C4"] {
        assert_eq!(model.lookups(ancestor), 1, "{}", ancestor);
    }
    assert_eq!(cache.len(), 4);
    let cached = cache.get(&ClassName::from("C4")).expect("cached");
    assert_eq!(cached.len(), 1);
    assert!(cached[0].has_marker);
}

#[test]
fn cyclic_hierarchy_terminates() {
    let model = StubModel::new()
        .class("A", "B")
        .class("B", "A")
        .method("A", sig("run", &[]));
    assert!(resolve(&model, "A").is_empty());
}
