use super::{HasSpan, Span};

// Package and Import Declarations
#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub name: String,
    pub is_static: bool,
    pub is_wildcard: bool,
    pub span: Span,
}

// Type Declarations
#[derive(Debug, Clone)]
pub enum TypeDecl {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Annotation(AnnotationDecl),
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Class(c) => &c.name,
            TypeDecl::Interface(i) => &i.name,
            TypeDecl::Enum(e) => &e.name,
            TypeDecl::Annotation(a) => &a.name,
        }
    }

    pub fn modifiers(&self) -> &[Modifier] {
        match self {
            TypeDecl::Class(c) => &c.modifiers,
            TypeDecl::Interface(i) => &i.modifiers,
            TypeDecl::Enum(e) => &e.modifiers,
            TypeDecl::Annotation(a) => &a.modifiers,
        }
    }

    pub fn members(&self) -> &[ClassMember] {
        match self {
            TypeDecl::Class(c) => &c.body,
            TypeDecl::Interface(i) => &i.body,
            TypeDecl::Enum(e) => &e.body,
            TypeDecl::Annotation(a) => &a.body,
        }
    }

    /// Methods declared directly in this type, in source order
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members().iter().filter_map(|m| match m {
            ClassMember::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDecl::Class(_) => "class",
            TypeDecl::Interface(_) => "interface",
            TypeDecl::Enum(_) => "enum",
            TypeDecl::Annotation(_) => "@interface",
        }
    }
}

impl HasSpan for TypeDecl {
    fn span(&self) -> Span {
        match self {
            TypeDecl::Class(c) => c.span,
            TypeDecl::Interface(i) => i.span,
            TypeDecl::Enum(e) => e.span,
            TypeDecl::Annotation(a) => a.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeRef>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub implements: Vec<TypeRef>,
    pub constants: Vec<EnumConstant>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub arguments: Vec<Expr>,
    pub body: Option<Vec<ClassMember>>,
    pub span: Span,
}

/// `@interface` declaration; elements are bodiless methods with an optional default
#[derive(Debug, Clone)]
pub struct AnnotationDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

// Modifiers and Annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    // Java 8: default interface method
    Default,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<AnnotationArg>,
    pub span: Span,
}

impl Annotation {
    /// Last segment of the annotation name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub enum AnnotationArg {
    Value(Expr),
    Named(String, Expr),
}

// Type References
#[derive(Debug, Clone)]
pub struct TypeRef {
    pub name: String,
    pub type_args: Vec<TypeArg>,
    pub array_dims: usize,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeArg {
    Type(TypeRef),
    Wildcard(WildcardType),
}

#[derive(Debug, Clone)]
pub struct WildcardType {
    pub bound: Option<(BoundKind, TypeRef)>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind { Extends, Super }

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<TypeRef>,
    pub span: Span,
}

// Members
#[derive(Debug, Clone)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Initializer(InitializerBlock),
    TypeDecl(TypeDecl),
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_ref: TypeRef,
    pub variables: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    /// `None` for `void`
    pub return_type: Option<TypeRef>,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub throws: Vec<TypeRef>,
    /// Annotation element default value
    pub default_value: Option<Expr>,
    pub body: Option<Block>,
    pub span: Span,
}

impl MethodDecl {
    /// Return type as written in source, `void` included
    pub fn return_type_text(&self) -> String {
        match &self.return_type {
            Some(t) => t.to_string(),
            None => "void".to_string(),
        }
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn first_statement(&self) -> Option<&Stmt> {
        self.body.as_ref().and_then(|b| b.statements.first())
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub throws: Vec<TypeRef>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_ref: TypeRef,
    pub name: String,
    pub varargs: bool,
    pub span: Span,
}

impl Parameter {
    /// Declared type as text, with `...` for a varargs parameter
    pub fn type_text(&self) -> String {
        if self.varargs {
            format!("{}...", self.type_ref)
        } else {
            self.type_ref.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct InitializerBlock {
    pub is_static: bool,
    pub body: Block,
    pub span: Span,
}

// Statements
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(ExprStmt),
    Declaration(VarDeclStmt),
    TypeDecl(TypeDecl),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    ForEach(ForEachStmt),
    Switch(SwitchStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Try(TryStmt),
    Throw(ThrowStmt),
    Assert(AssertStmt),
    Synchronized(SynchronizedStmt),
    Labeled(LabeledStmt),
    Block(Block),
    Empty(Span),
}

impl HasSpan for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Expression(s) => s.span,
            Stmt::Declaration(s) => s.span,
            Stmt::TypeDecl(t) => t.span(),
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForEach(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Assert(s) => s.span,
            Stmt::Synchronized(s) => s.span,
            Stmt::Labeled(s) => s.span,
            Stmt::Block(b) => b.span,
            Stmt::Empty(span) => *span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_ref: TypeRef,
    pub variables: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: String,
    pub array_dims: usize,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub condition: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Vec<Stmt>,
    pub condition: Option<Expr>,
    pub update: Vec<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForEachStmt {
    pub modifiers: Vec<Modifier>,
    pub var_type: TypeRef,
    pub var_name: String,
    pub iterable: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub expression: Expr,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub labels: Vec<Expr>, // empty labels indicates default
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BreakStmt {
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ContinueStmt {
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TryStmt {
    pub resources: Vec<TryResource>,
    pub try_block: Block,
    pub catch_clauses: Vec<CatchClause>,
    pub finally_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TryResource {
    pub modifiers: Vec<Modifier>,
    pub type_ref: TypeRef,
    pub name: String,
    pub initializer: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub parameter: Parameter,
    // Additional alternatives for multi-catch: catch (A | B e)
    pub alt_types: Vec<TypeRef>,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ThrowStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssertStmt {
    pub condition: Expr,
    pub message: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SynchronizedStmt {
    pub lock: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LabeledStmt {
    pub label: String,
    pub statement: Box<Stmt>,
    pub span: Span,
}

// Expressions
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(LiteralExpr),
    /// Names, plus the `this` and `super` keywords
    Identifier(IdentifierExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Assignment(AssignmentExpr),
    MethodCall(MethodCallExpr),
    FieldAccess(FieldAccessExpr),
    ArrayAccess(ArrayAccessExpr),
    Cast(CastExpr),
    InstanceOf(InstanceOfExpr),
    Conditional(ConditionalExpr),
    New(NewExpr),
    NewArray(NewArrayExpr),
    Parenthesized(Box<Expr>),
    // Array initializers and annotation element arrays like @Target({A,B})
    ArrayInitializer(Vec<Expr>),
    Lambda(LambdaExpr),
    MethodRef(MethodRefExpr),
    ClassLiteral(ClassLiteralExpr),
    /// Nested annotation used as an element value
    Annotation(Box<Annotation>),
}

impl Expr {
    pub fn as_method_call(&self) -> Option<&MethodCallExpr> {
        match self {
            Expr::MethodCall(call) => Some(call),
            _ => None,
        }
    }

    /// True for the bare `super` keyword, not `Outer.super`
    pub fn is_super_keyword(&self) -> bool {
        matches!(self, Expr::Identifier(id) if id.name == "super")
    }
}

impl HasSpan for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Identifier(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::FieldAccess(e) => e.span,
            Expr::ArrayAccess(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::InstanceOf(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::New(e) => e.span,
            Expr::NewArray(e) => e.span,
            Expr::Parenthesized(inner) => inner.span(),
            Expr::ArrayInitializer(items) => items
                .iter()
                .map(|e| e.span())
                .reduce(Span::merge)
                .unwrap_or_else(|| Span::single(super::Location::start())),
            Expr::Lambda(e) => e.span,
            Expr::MethodRef(e) => e.span,
            Expr::ClassLiteral(e) => e.span,
            Expr::Annotation(a) => a.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Char(String),
    Null,
}

#[derive(Debug, Clone)]
pub struct IdentifierExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add, Sub, Mul, Div, Mod,
    Lt, Le, Gt, Ge, Eq, Ne,
    And, Or, BitAnd, BitOr, Xor, LShift, RShift, URShift,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus, Minus, Not, BitNot, PreInc, PreDec, PostInc, PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign, AddAssign, SubAssign, MulAssign, DivAssign, ModAssign,
    AndAssign, OrAssign, XorAssign, LShiftAssign, RShiftAssign, URShiftAssign,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub target: Box<Expr>,
    pub operator: AssignmentOp,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodCallExpr {
    /// Explicit scope, e.g. `super` in `super.m()`
    pub target: Option<Box<Expr>>,
    pub type_args: Vec<TypeArg>,
    pub name: String,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldAccessExpr {
    pub target: Box<Expr>,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayAccessExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CastExpr {
    pub target_type: TypeRef,
    /// `& Bound` types of an intersection cast
    pub additional_bounds: Vec<TypeRef>,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InstanceOfExpr {
    pub expr: Box<Expr>,
    pub target_type: TypeRef,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    pub target_type: TypeRef,
    pub arguments: Vec<Expr>,
    pub anonymous_body: Option<Vec<ClassMember>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NewArrayExpr {
    pub element_type: TypeRef,
    pub dimensions: Vec<Expr>,
    /// Total number of `[]` pairs, sized or not
    pub total_dims: usize,
    pub initializer: Option<Vec<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub parameters: Vec<LambdaParam>,
    pub body: LambdaBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LambdaParam {
    pub type_ref: Option<TypeRef>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct MethodRefExpr {
    pub target: Box<Expr>,
    /// Method name, or `new` for constructor references
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassLiteralExpr {
    pub type_ref: TypeRef,
    pub span: Span,
}
