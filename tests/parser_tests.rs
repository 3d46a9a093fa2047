use callsuper::ast::{AstPrinter, ClassMember, Expr, Stmt, TypeDecl};
use callsuper::parser::parse_java;
use callsuper::Error;

const LIFECYCLE: &str = r#"
package app.ui;

import java.util.ArrayList;
import java.util.List;
import java.util.Map;
import java.util.function.Function;
import static java.util.Objects.requireNonNull;

/**
 * Screen with a lifecycle.
 */
public class MainScreen extends BaseScreen<Map<String, List<Integer>>> implements Runnable {
    private static final int LIMIT = 1 << 4;
    private final List<String> events = new ArrayList<>();
    private int[] counters = {1, 2, 3};

    static {
        System.loadLibrary("ui");
    }

    public MainScreen() {
        super();
    }

    @Override
    protected void onCreate(Bundle state) {
        super.onCreate(state);
        requireNonNull(state);
        for (String key : state.keys()) {
            events.add(key);
        }
        Function<String, Integer> length = String::length;
        events.forEach(e -> counters[0] += length.apply(e));
    }

    @Override
    public void onResume() throws IllegalStateException {
        super.onResume();
        switch (events.size()) {
            case 0:
                return;
            default:
                break;
        }
        try (Session session = open()) {
            session.touch();
        } catch (RuntimeException | Error e) {
            throw new IllegalStateException(e);
        } finally {
            counters = new int[LIMIT];
        }
    }

    @Override
    public void run() {
        new Thread(new Runnable() {
            @Override
            public void run() {
                System.out.println("tick");
            }
        }).start();
        int total = events.isEmpty() ? 0 : (int) events.stream().count();
        label:
        while (total > 0) {
            total--;
            if (total % 2 == 0) continue label;
        }
    }

    static class Session implements AutoCloseable {
        void touch() {}
        @Override
        public void close() {}
    }

    enum State { CREATED, RESUMED { @Override public String toString() { return "resumed"; } } }
}
"#;

#[test]
fn parses_a_realistic_class() {
    let ast = parse_java(LIFECYCLE).expect("Failed to parse");
    assert_eq!(ast.package_name(), Some("app.ui"));
    assert_eq!(ast.imports.len(), 5);
    assert!(ast.imports[4].is_static);
    assert_eq!(ast.type_decls.len(), 1);

    let screen = &ast.type_decls[0];
    let TypeDecl::Class(decl) = screen else {
        panic!("expected a class");
    };
    assert_eq!(decl.extends.as_ref().map(|t| t.to_string()).as_deref(), Some("BaseScreen<Map<String, List<Integer>>>"));

    let names: Vec<&str> = screen.methods().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["onCreate", "onResume", "run"]);

    let nested: Vec<&str> = screen
        .members()
        .iter()
        .filter_map(|m| match m {
            ClassMember::TypeDecl(t) => Some(t.name()),
            _ => None,
        })
        .collect();
    assert_eq!(nested, vec!["Session", "State"]);
}

#[test]
fn first_statements_of_lifecycle_methods() {
    let ast = parse_java(LIFECYCLE).expect("Failed to parse");
    for method in ast.type_decls[0].methods().take(2) {
        let Some(Stmt::Expression(stmt)) = method.first_statement() else {
            panic!("{} should start with an expression statement", method.name);
        };
        let call = stmt.expr.as_method_call().expect("call");
        assert!(call.target.as_deref().map(Expr::is_super_keyword).unwrap_or(false));
        assert_eq!(call.name, method.name);
    }
}

#[test]
fn printer_outlines_declarations() {
    let ast = parse_java(LIFECYCLE).expect("Failed to parse");
    let out = AstPrinter::new().print(&ast);
    assert!(out.contains("package app.ui;"));
    assert!(out.contains("import static java.util.Objects.requireNonNull;"));
    assert!(out.contains("class MainScreen"));
}

#[test]
fn unterminated_string_is_a_lexical_error() {
    let err = parse_java("class A { void m() { String s = \"open; } }").unwrap_err();
    assert!(err.is_parse_failure());
}

#[test]
fn error_position_points_at_offending_token() {
    let source = "class A {\n    void m() {\n        int x = ;\n    }\n}";
    match parse_java(source) {
        Err(Error::Parse { line, column, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(column, 17);
        }
        other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn intersection_cast_of_a_lambda() {
    let source = "class A { Object f() { return (Runnable & java.io.Serializable) () -> {}; } }";
    let ast = parse_java(source).expect("Failed to parse");
    let method = ast.type_decls[0].methods().next().expect("method");
    let Some(Stmt::Return(ret)) = method.first_statement() else {
        panic!("expected a return statement");
    };
    match ret.value.as_ref() {
        Some(Expr::Cast(cast)) => {
            assert_eq!(cast.target_type.to_string(), "Runnable");
            let bounds: Vec<String> = cast.additional_bounds.iter().map(|b| b.to_string()).collect();
            assert_eq!(bounds, vec!["java.io.Serializable"]);
        }
        other => panic!("expected a cast, got {:?}", other),
    }
}

#[test]
fn annotated_varargs_parameter() {
    let ast = parse_java("class A { void log(String fmt, String @Deprecated ... args) {} }").expect("Failed to parse");
    let method = ast.type_decls[0].methods().next().expect("method");
    assert_eq!(method.parameters.len(), 2);
    assert!(method.parameters[1].varargs);
    assert_eq!(method.parameters[1].type_text(), "String...");
}

#[test]
fn unicode_names_and_hex_floats() {
    let ast = parse_java("package app; public class Util { int café = 1; double half = 0x1.0p-1; void größe() {} }")
        .expect("Failed to parse");
    let names: Vec<&str> = ast.type_decls[0].methods().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["größe"]);
}

#[test]
fn parenthesized_bitwise_and_is_not_a_cast() {
    let ast = parse_java("class A { boolean f(int flags, int mask) { return (flags & mask) != 0; } }").expect("Failed to parse");
    let method = ast.type_decls[0].methods().next().expect("method");
    let Some(Stmt::Return(ret)) = method.first_statement() else {
        panic!("expected a return statement");
    };
    assert!(!matches!(ret.value, Some(Expr::Cast(_))));
}
