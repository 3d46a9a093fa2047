mod common;

use callsuper::{verify, ClassName, Error, MethodSignature, Obligation, SubjectSource};
use common::sig;

fn obligation(method: MethodSignature) -> Obligation {
    Obligation {
        subject_method: method.clone(),
        ancestor_class: ClassName::from("com.test.TestParent"),
        ancestor_method: method.marked(true),
    }
}

fn m1() -> Obligation {
    obligation(sig("m1", &["java.lang.String"]))
}

fn son(body: &str) -> String {
    format!(
        r#"
package com.test;

public class TestSon extends TestParent {{
    @Override
    public void m1(String s) {{
{}
    }}
}}
"#,
        body
    )
}

#[test]
fn super_call_as_first_statement_passes() {
    let source = son("        super.m1(s);\n        System.out.println(s);");
    assert!(verify(&source, &m1()).expect("verify"));
}

#[test]
fn missing_or_late_super_call_fails() {
    assert!(!verify(&son(""), &m1()).expect("verify"));
    assert!(!verify(&son("        System.out.println(s);"), &m1()).expect("verify"));
    assert!(!verify(&son("        System.out.println(s);\n        super.m1(s);"), &m1()).expect("verify"));
}

#[test]
fn scope_must_be_bare_super() {
    assert!(!verify(&son("        this.m1(s);"), &m1()).expect("verify"));
    assert!(!verify(&son("        m1(s);"), &m1()).expect("verify"));
    assert!(!verify(&son("        TestSon.super.m1(s);"), &m1()).expect("verify"));
}

#[test]
fn wrong_name_or_arity_fails() {
    assert!(!verify(&son("        super.m3();"), &m1()).expect("verify"));
    assert!(!verify(&son("        super.m1();"), &m1()).expect("verify"));
    assert!(!verify(&son("        super.m1(s, s);"), &m1()).expect("verify"));
}

#[test]
fn argument_types_are_not_checked() {
    assert!(verify(&son("        super.m1(\"literal\");"), &m1()).expect("verify"));
    assert!(verify(&son("        super.m1(null);"), &m1()).expect("verify"));
}

#[test]
fn nested_or_wrapped_calls_do_not_count() {
    assert!(!verify(&son("        { super.m1(s); }"), &m1()).expect("verify"));
    assert!(!verify(&son("        if (s != null) super.m1(s);"), &m1()).expect("verify"));
    assert!(!verify(&son("        Runnable r = () -> super.m1(s);"), &m1()).expect("verify"));
}

#[test]
fn verification_is_idempotent() {
    let passing = son("        super.m1(s);");
    let failing = son("        this.m1(s);");
    let parsed = SubjectSource::parse(&passing).expect("parse");
    for _ in 0..3 {
        assert!(verify(&passing, &m1()).expect("verify"));
        assert!(parsed.verify(&m1()));
        assert!(!verify(&failing, &m1()).expect("verify"));
    }
}

#[test]
fn declaration_lookup_tolerates_package_prefixes() {
    let source = r#"
package com.test;

public class TestSon extends TestParent {
    public void m1(java.lang.String s) { super.m1(s); }
}
"#;
    assert!(verify(source, &m1()).expect("verify"));
}

#[test]
fn suffix_match_picks_the_textually_similar_overload() {
    // `com.foo.MyString` ends with `String`, so the first overload is the one found
    let source = r#"
class TestSon extends TestParent {
    public void m1(String s) { }
    public void m1(MyString s) { super.m1(s); }
}
"#;
    let obligation = obligation(sig("m1", &["com.foo.MyString"]));
    assert!(!verify(source, &obligation).expect("verify"));
}

#[test]
fn missing_declaration_fails() {
    let source = "class TestSon extends TestParent { public void m1(int s) { super.m1(s); } }";
    assert!(!verify(source, &m1()).expect("verify"));
}

#[test]
fn abstract_declaration_fails() {
    let source = "abstract class TestSon extends TestParent { public abstract void m1(String s); }";
    assert!(!verify(source, &m1()).expect("verify"));
}

#[test]
fn syntax_errors_keep_their_position() {
    let source = "class TestSon extends TestParent {\n    public void m1(String s) { super.m1(s) }\n}";
    match verify(source, &m1()) {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn units_must_declare_exactly_one_type() {
    let two = "class TestSon extends TestParent { public void m1(String s) { super.m1(s); } } class Other {}";
    assert!(matches!(verify(two, &m1()), Err(Error::TopLevelTypes { found: 2 })));
    assert!(matches!(verify("package com.test;", &m1()), Err(Error::TopLevelTypes { found: 0 })));
}

#[test]
fn generic_subject_method() {
    let source = r#"
package p;

import java.util.List;
import java.util.Map;

class Repo<K, V> extends Base<K, V> {
    @Override
    public List<V> load(Map<K, V> seed, int... ids) {
        super.load(seed, ids);
        return null;
    }
}
"#;
    let method = MethodSignature::new("load", "java.util.List<V>").with_parameters(["java.util.Map<K, V>", "int..."]);
    assert!(verify(source, &obligation(method)).expect("verify"));
}

#[test]
fn return_type_must_name_the_same_type() {
    let source = |return_type: &str| {
        format!(
            "package p;\nclass Factory extends Base {{\n    {} make() {{\n        super.make();\n        return null;\n    }}\n}}\n",
            return_type
        )
    };
    let widget = MethodSignature::new("make", "com.foo.Widget");
    assert!(verify(&source("Widget"), &obligation(widget.clone())).expect("verify"));
    assert!(verify(&source("com.foo.Widget"), &obligation(widget.clone())).expect("verify"));
    assert!(!verify(&source("MyWidget"), &obligation(widget)).expect("verify"));
    assert!(!verify(&source("Widget"), &obligation(MethodSignature::new("make", "com.foo.MyWidget"))).expect("verify"));
}
