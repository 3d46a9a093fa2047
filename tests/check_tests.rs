//! End-to-end runs over Java source trees
//!
//! The fixture tree mirrors the classic parent/son pair: `TestParent` marks
//! `m1(String)` and `m3()` and declares the abstract `m2(String)`.

mod common;

use callsuper::{check_tree, CheckSession, ClassName, Config, Error, FsSourceLocator, SourceTreeModel};
use common::{fixture_root, fixture_tree_with_son, sig, MemoryLocator, StubModel, OBJECT};

fn son_class() -> ClassName {
    ClassName::from("com.test.TestSon")
}

fn son_with(m1_body: &str, m2_body: &str, m3_body: &str) -> String {
    format!(
        r#"package com.test;

public class TestSon extends TestParent {{

    @Override
    public void m1(String s) {{
        {}
    }}

    @Override
    public void m2(String s) {{
        {}
    }}

    @Override
    public void m3() {{
        {}
    }}
}}
"#,
        m1_body, m2_body, m3_body
    )
}

fn run(son: &str, accumulate: bool) -> callsuper::Result<()> {
    common::init_logger();
    let tree = fixture_tree_with_son(son);
    let config = Config::default().with_source_root(tree.path()).accumulate(accumulate);
    check_tree(config, &[son_class()])
}

#[test]
fn fixture_tree_passes() {
    common::init_logger();
    let config = Config::default().with_source_root(fixture_root());
    check_tree(config.clone(), &[]).expect("whole tree");
    check_tree(config, &[son_class()]).expect("single class");
}

#[test]
fn fixture_obligations() {
    let mut session = CheckSession::from_config(Config::default().with_source_root(fixture_root())).expect("index");
    let obligations = session.obligations(&son_class());
    let described: Vec<String> = obligations
        .iter()
        .map(|o| format!("{} -> {}.{}", o.subject_method, o.ancestor_class, o.ancestor_method))
        .collect();
    assert_eq!(
        described,
        vec![
            "m1(java.lang.String) -> com.test.TestParent.m1(java.lang.String)",
            "m3() -> com.test.TestParent.m3()",
        ]
    );
    assert!(session.obligations(&ClassName::from("com.test.TestParent")).is_empty());
}

#[test]
fn missing_super_call_is_a_violation() {
    let son = son_with("System.out.println(s);", "", "super.m3();");
    match run(&son, false) {
        Err(Error::ContractViolation(violation)) => {
            assert_eq!(violation.class, son_class());
            assert_eq!(violation.method.simple_name, "m1");
            assert_eq!(violation.ancestor_class.as_str(), "com.test.TestParent");
            let message = violation.to_string();
            assert!(message.contains("[com.test.TestSon]"), "{}", message);
            assert!(message.contains("[m1]"), "{}", message);
        }
        other => panic!("expected a violation, got {:?}", other),
    }
}

#[test]
fn super_call_in_second_position_is_a_violation() {
    let son = son_with("System.out.println(s);\n        super.m1(s);", "", "super.m3();");
    assert!(matches!(run(&son, false), Err(Error::ContractViolation(_))));
}

#[test]
fn literal_argument_passes() {
    let son = son_with("super.m1(\"literal\");", "", "super.m3();");
    run(&son, false).expect("arity-only check");
}

#[test]
fn abstract_ancestor_method_is_never_verified() {
    let son = son_with("super.m1(s);", "this.m2(s);", "super.m3();");
    run(&son, false).expect("m2 carries no obligation");
}

#[test]
fn accumulated_run_reports_every_violation() {
    let son = son_with("", "", "m1(\"x\");");
    match run(&son, true) {
        Err(Error::ContractViolations(violations)) => {
            let methods: Vec<&str> = violations.iter().map(|v| v.method.simple_name.as_str()).collect();
            assert_eq!(methods, vec!["m1", "m3"]);
        }
        other => panic!("expected violations, got {:?}", other),
    }
    assert!(matches!(run(&son, false), Err(Error::ContractViolation(v)) if v.method.simple_name == "m1"));
}

#[test]
fn missing_source_is_unavailable() {
    let parent = std::fs::read_to_string(fixture_root().join("com/test/TestParent.java")).expect("fixture");
    let son = son_with("super.m1(s);", "", "super.m3();");
    let model = SourceTreeModel::from_sources([parent.as_str(), son.as_str()]).expect("parse");
    let empty = tempfile::tempdir().expect("tempdir");

    let mut session = CheckSession::new(Config::default(), model, FsSourceLocator::new(empty.path()));
    match session.check_all(&[son_class()]) {
        Err(Error::SourceUnavailable { class, path, .. }) => {
            assert_eq!(class, "com.test.TestSon");
            assert!(path.ends_with("com/test/TestSon.java"));
        }
        other => panic!("expected unavailable source, got {:?}", other),
    }
}

#[test]
fn unparsable_subject_is_fatal() {
    let son = son_with("super.m1(s)", "", "super.m3();");
    let err = run(&son, true).unwrap_err();
    assert!(err.is_parse_failure(), "{}", err);
}

#[test]
fn caches_fill_once_per_class() {
    let model = StubModel::new()
        .class("p.Base", OBJECT)
        .class("p.Mid", "p.Base")
        .class("p.A", "p.Mid")
        .class("p.B", "p.Mid")
        .marked("p.Base", sig("start", &[]))
        .method("p.A", sig("start", &[]))
        .method("p.B", sig("start", &[]));
    let locator = MemoryLocator::new()
        .with("p.A", "package p; class A extends Mid { void start() { super.start(); } }")
        .with("p.B", "package p; class B extends Mid { void start() { super.start(); } }");

    let mut session = CheckSession::new(Config::default(), &model, &locator);
    let roots = [ClassName::from("p.A"), ClassName::from("p.B"), ClassName::from("p.A")];
    session.check_all(&roots).expect("check");

    assert_eq!(locator.loads("p.A"), 1);
    assert_eq!(locator.loads("p.B"), 1);
    assert_eq!(model.lookups("p.Mid"), 1);
    assert_eq!(model.lookups("p.Base"), 1);
    assert_eq!(session.ancestor_cache().len(), 2);
    assert_eq!(session.source_cache().len(), 2);
}

#[test]
fn classes_without_obligations_never_load_source() {
    let model = StubModel::new()
        .class("p.Plain", OBJECT)
        .method("p.Plain", sig("start", &[]))
        .interface("p.Api")
        .method("p.Api", sig("start", &[]));
    let locator = MemoryLocator::new();

    let mut session = CheckSession::new(Config::default(), &model, &locator);
    session
        .check_all(&[ClassName::from("p.Plain"), ClassName::from("p.Api")])
        .expect("nothing to verify");
    assert_eq!(locator.loads("p.Plain"), 0);
    assert_eq!(locator.loads("p.Api"), 0);
    assert_eq!(model.lookups("p.Api"), 0);
}

#[test]
fn custom_marker_name() {
    let tree = common::source_tree(&[
        ("org.hooks.Hook", "package org.hooks; public @interface Hook {}"),
        (
            "app.Base",
            "package app; import org.hooks.Hook; public class Base { @Hook public void close() {} }",
        ),
        ("app.Impl", "package app; public class Impl extends Base { public void close() { cleanup(); } void cleanup() {} }"),
    ]);
    let default_marker = Config::default().with_source_root(tree.path());
    check_tree(default_marker.clone(), &[]).expect("default marker is absent");

    let custom = default_marker.with_marker("org.hooks.Hook");
    assert!(matches!(check_tree(custom, &[]), Err(Error::ContractViolation(v)) if v.class.as_str() == "app.Impl"));
}

#[test]
fn package_private_marker_on_a_nested_ancestor() {
    let tree = common::source_tree(&[
        ("callsuper.MustCallSuper", "package callsuper; public @interface MustCallSuper {}"),
        (
            "app.Outer",
            "package app; import callsuper.MustCallSuper; public class Outer { public static class Base { @MustCallSuper void close() {} } }",
        ),
        ("app.Son", "package app; public class Son extends Outer.Base { void close() { } }"),
    ]);
    let config = Config::default().with_source_root(tree.path());
    let mut session = CheckSession::from_config(config.clone()).expect("index");
    let obligations = session.obligations(&ClassName::from("app.Son"));
    assert_eq!(obligations.len(), 1);
    assert_eq!(obligations[0].ancestor_class.as_str(), "app.Outer.Base");

    assert!(matches!(check_tree(config, &[]), Err(Error::ContractViolation(v)) if v.class.as_str() == "app.Son"));
}

#[test]
fn tree_with_unicode_names_and_hex_floats_is_checked() {
    let tree = common::source_tree(&[
        ("callsuper.MustCallSuper", "package callsuper; public @interface MustCallSuper {}"),
        ("app.Util", "package app; public class Util { int café = 1; double half = 0x1.0p-1; }"),
        ("app.Base", "package app; import callsuper.MustCallSuper; public class Base { @MustCallSuper public void close() {} }"),
        ("app.Impl", "package app; public class Impl extends Base { public void close() { } }"),
    ]);
    let config = Config::default().with_source_root(tree.path());
    assert!(matches!(check_tree(config, &[]), Err(Error::ContractViolation(v)) if v.class.as_str() == "app.Impl"));
}

#[test]
fn nested_class_is_named_through_its_top_level_class() {
    let tree = common::source_tree(&[(
        "app.Outer",
        "package app; public class Outer { public static class Inner { void run() {} } }",
    )]);
    let config = Config::default().with_source_root(tree.path());
    match check_tree(config.clone(), &[ClassName::from("app.Outer.Inner")]) {
        Err(Error::Config { message }) => assert!(message.contains("app.Outer.Inner"), "{}", message),
        other => panic!("expected a config error, got {:?}", other),
    }
    check_tree(config, &[ClassName::from("app.Outer")]).expect("top-level class");
}
