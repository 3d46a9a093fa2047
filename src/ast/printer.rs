use super::nodes::*;
use super::Ast;
use std::fmt;

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.type_args.is_empty() {
            write!(f, "<{}>", join(&self.type_args, ", "))?;
        }
        for _ in 0..self.array_dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArg::Type(t) => write!(f, "{}", t),
            TypeArg::Wildcard(w) => match &w.bound {
                None => write!(f, "?"),
                Some((BoundKind::Extends, t)) => write!(f, "? extends {}", t),
                Some((BoundKind::Super, t)) => write!(f, "? super {}", t),
            },
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Boolean(v) => write!(f, "{}", v),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Char(c) => write!(f, "'{}'", c),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::Xor => "^",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::URShift => ">>>",
        }
    }
}

impl AssignmentOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            AssignmentOp::Assign => "=",
            AssignmentOp::AddAssign => "+=",
            AssignmentOp::SubAssign => "-=",
            AssignmentOp::MulAssign => "*=",
            AssignmentOp::DivAssign => "/=",
            AssignmentOp::ModAssign => "%=",
            AssignmentOp::AndAssign => "&=",
            AssignmentOp::OrAssign => "|=",
            AssignmentOp::XorAssign => "^=",
            AssignmentOp::LShiftAssign => "<<=",
            AssignmentOp::RShiftAssign => ">>=",
            AssignmentOp::URShiftAssign => ">>>=",
        }
    }
}

/// Source-like rendering; used for diagnostics and textual comparisons
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(l) => write!(f, "{}", l.value),
            Expr::Identifier(id) => write!(f, "{}", id.name),
            Expr::Binary(b) => write!(f, "{} {} {}", b.left, b.operator.symbol(), b.right),
            Expr::Unary(u) => match u.operator {
                UnaryOp::Plus => write!(f, "+{}", u.operand),
                UnaryOp::Minus => write!(f, "-{}", u.operand),
                UnaryOp::Not => write!(f, "!{}", u.operand),
                UnaryOp::BitNot => write!(f, "~{}", u.operand),
                UnaryOp::PreInc => write!(f, "++{}", u.operand),
                UnaryOp::PreDec => write!(f, "--{}", u.operand),
                UnaryOp::PostInc => write!(f, "{}++", u.operand),
                UnaryOp::PostDec => write!(f, "{}--", u.operand),
            },
            Expr::Assignment(a) => write!(f, "{} {} {}", a.target, a.operator.symbol(), a.value),
            Expr::MethodCall(call) => {
                if let Some(target) = &call.target {
                    write!(f, "{}.", target)?;
                }
                if !call.type_args.is_empty() {
                    write!(f, "<{}>", join(&call.type_args, ", "))?;
                }
                write!(f, "{}({})", call.name, join(&call.arguments, ", "))
            }
            Expr::FieldAccess(fa) => write!(f, "{}.{}", fa.target, fa.name),
            Expr::ArrayAccess(aa) => write!(f, "{}[{}]", aa.array, aa.index),
            Expr::Cast(c) => {
                write!(f, "({}", c.target_type)?;
                for bound in &c.additional_bounds {
                    write!(f, " & {}", bound)?;
                }
                write!(f, ") {}", c.expr)
            }
            Expr::InstanceOf(i) => write!(f, "{} instanceof {}", i.expr, i.target_type),
            Expr::Conditional(c) => write!(f, "{} ? {} : {}", c.condition, c.then_expr, c.else_expr),
            Expr::New(n) => {
                write!(f, "new {}({})", n.target_type, join(&n.arguments, ", "))?;
                if n.anonymous_body.is_some() {
                    write!(f, " {{ ... }}")?;
                }
                Ok(())
            }
            Expr::NewArray(n) => {
                write!(f, "new {}", n.element_type)?;
                for dim in &n.dimensions {
                    write!(f, "[{}]", dim)?;
                }
                for _ in n.dimensions.len()..n.total_dims {
                    write!(f, "[]")?;
                }
                if let Some(init) = &n.initializer {
                    write!(f, "{{{}}}", join(init, ", "))?;
                }
                Ok(())
            }
            Expr::Parenthesized(inner) => write!(f, "({})", inner),
            Expr::ArrayInitializer(items) => write!(f, "{{{}}}", join(items, ", ")),
            Expr::Lambda(l) => {
                let params: Vec<String> = l
                    .parameters
                    .iter()
                    .map(|p| match &p.type_ref {
                        Some(t) => format!("{} {}", t, p.name),
                        None => p.name.clone(),
                    })
                    .collect();
                write!(f, "({}) -> ", params.join(", "))?;
                match &l.body {
                    LambdaBody::Expr(e) => write!(f, "{}", e),
                    LambdaBody::Block(_) => write!(f, "{{ ... }}"),
                }
            }
            Expr::MethodRef(m) => write!(f, "{}::{}", m.target, m.name),
            Expr::ClassLiteral(c) => write!(f, "{}.class", c.type_ref),
            Expr::Annotation(a) => write!(f, "@{}", a.name),
        }
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(sep)
}

/// Outline printer: declarations, member signatures and the first statement of each body
pub struct AstPrinter {
    indent_level: usize,
    output: String,
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            output: String::new(),
        }
    }

    pub fn print(&mut self, ast: &Ast) -> String {
        self.output.clear();
        if let Some(package) = &ast.package_decl {
            self.writeln(&format!("package {};", package.name));
        }
        for import in &ast.imports {
            let keyword = if import.is_static { "import static" } else { "import" };
            let suffix = if import.is_wildcard { ".*" } else { "" };
            self.writeln(&format!("{} {}{};", keyword, import.name, suffix));
        }
        for type_decl in &ast.type_decls {
            self.print_type_decl(type_decl);
        }
        std::mem::take(&mut self.output)
    }

    fn indent(&mut self) {
        self.indent_level += 2;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(2);
    }

    fn writeln(&mut self, s: &str) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn print_type_decl(&mut self, type_decl: &TypeDecl) {
        let mut header = modifiers_prefix(type_decl.modifiers());
        header.push_str(&format!("{} {}", type_decl.kind_name(), type_decl.name()));
        match type_decl {
            TypeDecl::Class(c) => {
                if let Some(ext) = &c.extends {
                    header.push_str(&format!(" extends {}", ext));
                }
                if !c.implements.is_empty() {
                    header.push_str(&format!(" implements {}", join(&c.implements, ", ")));
                }
            }
            TypeDecl::Interface(i) if !i.extends.is_empty() => {
                header.push_str(&format!(" extends {}", join(&i.extends, ", ")));
            }
            TypeDecl::Enum(e) => {
                let names: Vec<&str> = e.constants.iter().map(|c| c.name.as_str()).collect();
                header.push_str(&format!(" [{}]", names.join(", ")));
            }
            _ => {}
        }
        self.writeln(&format!("{} {{", header));
        self.indent();
        for member in type_decl.members() {
            self.print_member(member);
        }
        self.dedent();
        self.writeln("}");
    }

    fn print_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Field(field) => {
                let names: Vec<&str> = field.variables.iter().map(|v| v.name.as_str()).collect();
                let line = format!("{}{} {};", modifiers_prefix(&field.modifiers), field.type_ref, names.join(", "));
                self.writeln(&line);
            }
            ClassMember::Method(method) => {
                for annotation in &method.annotations {
                    self.writeln(&format!("@{}", annotation.name));
                }
                let params: Vec<String> = method
                    .parameters
                    .iter()
                    .map(|p| format!("{} {}", p.type_text(), p.name))
                    .collect();
                let signature = format!(
                    "{}{} {}({})",
                    modifiers_prefix(&method.modifiers),
                    method.return_type_text(),
                    method.name,
                    params.join(", ")
                );
                self.print_body_outline(signature, method.body.as_ref());
            }
            ClassMember::Constructor(ctor) => {
                let params: Vec<String> = ctor
                    .parameters
                    .iter()
                    .map(|p| format!("{} {}", p.type_text(), p.name))
                    .collect();
                let signature = format!("{}{}({})", modifiers_prefix(&ctor.modifiers), ctor.name, params.join(", "));
                self.print_body_outline(signature, Some(&ctor.body));
            }
            ClassMember::Initializer(init) => {
                let label = if init.is_static { "static".to_string() } else { String::new() };
                self.print_body_outline(label, Some(&init.body));
            }
            ClassMember::TypeDecl(nested) => self.print_type_decl(nested),
        }
    }

    fn print_body_outline(&mut self, header: String, body: Option<&Block>) {
        match body {
            None => self.writeln(&format!("{};", header)),
            Some(block) => {
                self.writeln(&format!("{} {{ // {} statement(s)", header, block.statements.len()));
                if let Some(first) = block.statements.first() {
                    self.indent();
                    self.writeln(&statement_summary(first));
                    self.dedent();
                }
                self.writeln("}");
            }
        }
    }
}

fn modifiers_prefix(modifiers: &[Modifier]) -> String {
    modifiers.iter().map(|m| format!("{} ", m)).collect()
}

/// One-line description of a statement
pub fn statement_summary(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expression(s) => format!("{};", s.expr),
        Stmt::Declaration(d) => {
            let names: Vec<&str> = d.variables.iter().map(|v| v.name.as_str()).collect();
            format!("{} {};", d.type_ref, names.join(", "))
        }
        Stmt::TypeDecl(t) => format!("{} {} {{ ... }}", t.kind_name(), t.name()),
        Stmt::If(s) => format!("if ({}) ...", s.condition),
        Stmt::While(s) => format!("while ({}) ...", s.condition),
        Stmt::DoWhile(s) => format!("do ... while ({});", s.condition),
        Stmt::For(_) => "for (...) ...".to_string(),
        Stmt::ForEach(s) => format!("for ({} {} : {}) ...", s.var_type, s.var_name, s.iterable),
        Stmt::Switch(s) => format!("switch ({}) {{ ... }}", s.expression),
        Stmt::Return(s) => match &s.value {
            Some(v) => format!("return {};", v),
            None => "return;".to_string(),
        },
        Stmt::Break(_) => "break;".to_string(),
        Stmt::Continue(_) => "continue;".to_string(),
        Stmt::Try(_) => "try { ... }".to_string(),
        Stmt::Throw(s) => format!("throw {};", s.expr),
        Stmt::Assert(s) => format!("assert {};", s.condition),
        Stmt::Synchronized(s) => format!("synchronized ({}) {{ ... }}", s.lock),
        Stmt::Labeled(s) => format!("{}: ...", s.label),
        Stmt::Block(_) => "{ ... }".to_string(),
        Stmt::Empty(_) => ";".to_string(),
    }
}
