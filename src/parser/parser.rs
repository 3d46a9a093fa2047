//! Recursive descent parser for Java compilation units
//!
//! The parser is strict: the first syntax error aborts the parse. A checker that
//! silently skipped a malformed method could report a contract as satisfied.

use super::error::{ParseError, ParseResult};
use super::lexer::{Lexer, LexicalToken, Token};
use crate::ast::*;

/// Binary operator precedence levels, loosest first
const BINARY_LEVELS: &[&[(Token, BinaryOp)]] = &[
    &[(Token::PipePipe, BinaryOp::Or)],
    &[(Token::AndAnd, BinaryOp::And)],
    &[(Token::Pipe, BinaryOp::BitOr)],
    &[(Token::Caret, BinaryOp::Xor)],
    &[(Token::Amp, BinaryOp::BitAnd)],
    &[(Token::Eq, BinaryOp::Eq), (Token::Ne, BinaryOp::Ne)],
    &[
        (Token::Lt, BinaryOp::Lt),
        (Token::Le, BinaryOp::Le),
        (Token::Gt, BinaryOp::Gt),
        (Token::Ge, BinaryOp::Ge),
    ],
    &[
        (Token::LShift, BinaryOp::LShift),
        (Token::RShift, BinaryOp::RShift),
        (Token::URShift, BinaryOp::URShift),
    ],
    &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
    &[
        (Token::Star, BinaryOp::Mul),
        (Token::Slash, BinaryOp::Div),
        (Token::Percent, BinaryOp::Mod),
    ],
];

// Index of the relational level, where `instanceof` also binds
const RELATIONAL_LEVEL: usize = 6;

/// Parser for Java source
pub struct Parser {
    tokens: Vec<LexicalToken>,
    current: usize,
    // `>` still owed from a split `>>` or `>>>` closing nested type arguments
    pending_gt: usize,
}

impl Parser {
    /// Create a new parser from source code
    pub fn new(source: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            current: 0,
            pending_gt: 0,
        })
    }

    /// Parse the source code into an AST
    pub fn parse(mut self) -> ParseResult<Ast> {
        let start = self.current_location();

        let package_decl = if self.check(&Token::Package) || self.is_annotated_package() {
            Some(self.parse_package_decl()?)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.check(&Token::Import) {
            imports.push(self.parse_import_decl()?);
        }

        let mut type_decls = Vec::new();
        while !self.is_at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
            type_decls.push(self.parse_type_decl(modifiers, annotations)?);
        }

        let span = Span::new(start, self.previous_end());
        Ok(Ast {
            package_decl,
            imports,
            type_decls,
            span,
        })
    }

    // Helper methods
    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek_token_type(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx).map(|t| t.token_type())
    }

    fn check(&self, token_type: &Token) -> bool {
        self.pending_gt == 0 && self.peek_token_type(self.current) == Some(token_type)
    }

    fn check_at(&self, offset: usize, token_type: &Token) -> bool {
        self.peek_token_type(self.current + offset) == Some(token_type)
    }

    fn advance(&mut self) -> &LexicalToken {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn previous(&self) -> &LexicalToken {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn match_token(&mut self, token_type: &Token) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_location(&self) -> Location {
        match self.tokens.get(self.current) {
            Some(token) => token.location(),
            None => self.previous_end(),
        }
    }

    /// End position of the last consumed token
    fn previous_end(&self) -> Location {
        if self.tokens.is_empty() || self.current == 0 {
            return Location::start();
        }
        let previous = self.previous();
        let mut end = previous.location();
        end.advance_str(previous.lexeme());
        end
    }

    fn span_from(&self, start: Location) -> Span {
        Span::new(start, self.previous_end())
    }

    fn error_here(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.current) {
            Some(token) => ParseError::unexpected_token(expected, &describe(token), token.location()),
            None => ParseError::unexpected_end_of_input(expected, self.previous_end()),
        }
    }

    fn consume(&mut self, token_type: &Token, expected: &str) -> ParseResult<()> {
        if self.check(token_type) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(expected))
        }
    }

    fn parse_identifier(&mut self) -> ParseResult<String> {
        if self.check(&Token::Identifier) {
            Ok(self.advance().lexeme().to_string())
        } else {
            Err(self.error_here("identifier"))
        }
    }

    fn parse_qualified_name(&mut self) -> ParseResult<String> {
        let mut parts = vec![self.parse_identifier()?];
        while self.check(&Token::Dot) && self.check_at(1, &Token::Identifier) {
            self.advance();
            parts.push(self.parse_identifier()?);
        }
        Ok(parts.join("."))
    }

    fn is_annotated_package(&self) -> bool {
        if !self.check(&Token::At) || self.check_at(1, &Token::Interface) {
            return false;
        }
        let mut i = self.current;
        self.skip_annotations(&mut i) && self.peek_token_type(i) == Some(&Token::Package)
    }

    // Package declaration parsing
    fn parse_package_decl(&mut self) -> ParseResult<PackageDecl> {
        let start = self.current_location();
        self.parse_annotations()?;
        self.consume(&Token::Package, "'package'")?;
        let name = self.parse_qualified_name()?;
        self.consume(&Token::Semicolon, "';' after package name")?;
        Ok(PackageDecl { name, span: self.span_from(start) })
    }

    // Import declaration parsing
    fn parse_import_decl(&mut self) -> ParseResult<ImportDecl> {
        let start = self.current_location();
        self.consume(&Token::Import, "'import'")?;
        let is_static = self.match_token(&Token::Static);
        let name = self.parse_qualified_name()?;
        let mut is_wildcard = false;
        if self.match_token(&Token::Dot) {
            self.consume(&Token::Star, "'*' after '.' in import")?;
            is_wildcard = true;
        }
        self.consume(&Token::Semicolon, "';' after import")?;
        Ok(ImportDecl {
            name,
            is_static,
            is_wildcard,
            span: self.span_from(start),
        })
    }

    // Modifiers and annotations may interleave: `@Override public final`
    fn parse_modifiers_and_annotations(&mut self) -> ParseResult<(Vec<Modifier>, Vec<Annotation>)> {
        let mut modifiers = Vec::new();
        let mut annotations = Vec::new();
        loop {
            if self.check(&Token::At) && !self.check_at(1, &Token::Interface) {
                annotations.push(self.parse_annotation()?);
            } else if let Some(modifier) = self.parse_modifier() {
                modifiers.push(modifier);
            } else {
                break;
            }
        }
        Ok((modifiers, annotations))
    }

    fn parse_modifier(&mut self) -> Option<Modifier> {
        let modifier = match self.peek_token_type(self.current)? {
            Token::Public => Modifier::Public,
            Token::Protected => Modifier::Protected,
            Token::Private => Modifier::Private,
            Token::Abstract => Modifier::Abstract,
            Token::Static => Modifier::Static,
            Token::Final => Modifier::Final,
            Token::Native => Modifier::Native,
            Token::Synchronized => Modifier::Synchronized,
            Token::Transient => Modifier::Transient,
            Token::Volatile => Modifier::Volatile,
            Token::Strictfp => Modifier::Strictfp,
            // `default` is a modifier only in front of an interface method
            Token::Default if !self.check_at(1, &Token::Colon) => Modifier::Default,
            _ => return None,
        };
        // A `synchronized (` block is a statement, not a modifier
        if modifier == Modifier::Synchronized && self.check_at(1, &Token::LParen) {
            return None;
        }
        self.advance();
        Some(modifier)
    }

    fn parse_annotations(&mut self) -> ParseResult<Vec<Annotation>> {
        let mut annotations = Vec::new();
        while self.check(&Token::At) && !self.check_at(1, &Token::Interface) {
            annotations.push(self.parse_annotation()?);
        }
        Ok(annotations)
    }

    fn parse_annotation(&mut self) -> ParseResult<Annotation> {
        let start = self.current_location();
        self.consume(&Token::At, "'@'")?;
        let name = self.parse_qualified_name()?;
        let mut arguments = Vec::new();
        if self.match_token(&Token::LParen) {
            if !self.check(&Token::RParen) {
                loop {
                    if self.check(&Token::Identifier) && self.check_at(1, &Token::Assign) {
                        let key = self.parse_identifier()?;
                        self.advance(); // '='
                        arguments.push(AnnotationArg::Named(key, self.parse_element_value()?));
                    } else {
                        arguments.push(AnnotationArg::Value(self.parse_element_value()?));
                    }
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
            self.consume(&Token::RParen, "')' after annotation arguments")?;
        }
        Ok(Annotation { name, arguments, span: self.span_from(start) })
    }

    fn parse_element_value(&mut self) -> ParseResult<Expr> {
        if self.check(&Token::At) {
            return Ok(Expr::Annotation(Box::new(self.parse_annotation()?)));
        }
        if self.check(&Token::LBrace) {
            self.advance();
            let mut values = Vec::new();
            while !self.check(&Token::RBrace) {
                values.push(self.parse_element_value()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
            self.consume(&Token::RBrace, "'}' after element values")?;
            return Ok(Expr::ArrayInitializer(values));
        }
        self.parse_conditional_expr()
    }

    // Type declaration parsing
    fn parse_type_decl(&mut self, modifiers: Vec<Modifier>, annotations: Vec<Annotation>) -> ParseResult<TypeDecl> {
        match self.peek_token_type(self.current) {
            Some(Token::Class) => Ok(TypeDecl::Class(self.parse_class_decl(modifiers, annotations)?)),
            Some(Token::Interface) => Ok(TypeDecl::Interface(self.parse_interface_decl(modifiers, annotations)?)),
            Some(Token::Enum) => Ok(TypeDecl::Enum(self.parse_enum_decl(modifiers, annotations)?)),
            Some(Token::At) if self.check_at(1, &Token::Interface) => {
                Ok(TypeDecl::Annotation(self.parse_annotation_decl(modifiers, annotations)?))
            }
            _ => Err(self.error_here("type declaration")),
        }
    }

    fn parse_class_decl(&mut self, modifiers: Vec<Modifier>, annotations: Vec<Annotation>) -> ParseResult<ClassDecl> {
        let start = self.current_location();
        self.consume(&Token::Class, "'class'")?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_optional_type_parameters()?;
        let extends = if self.match_token(&Token::Extends) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };
        let implements = if self.match_token(&Token::Implements) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        let body = self.parse_class_body(&name)?;
        Ok(ClassDecl {
            modifiers,
            annotations,
            name,
            type_params,
            extends,
            implements,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_interface_decl(&mut self, modifiers: Vec<Modifier>, annotations: Vec<Annotation>) -> ParseResult<InterfaceDecl> {
        let start = self.current_location();
        self.consume(&Token::Interface, "'interface'")?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_optional_type_parameters()?;
        let extends = if self.match_token(&Token::Extends) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        let body = self.parse_class_body(&name)?;
        Ok(InterfaceDecl {
            modifiers,
            annotations,
            name,
            type_params,
            extends,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_enum_decl(&mut self, modifiers: Vec<Modifier>, annotations: Vec<Annotation>) -> ParseResult<EnumDecl> {
        let start = self.current_location();
        self.consume(&Token::Enum, "'enum'")?;
        let name = self.parse_identifier()?;
        let implements = if self.match_token(&Token::Implements) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        self.consume(&Token::LBrace, "'{' after enum declaration")?;

        let mut constants = Vec::new();
        while !self.check(&Token::Semicolon) && !self.check(&Token::RBrace) {
            constants.push(self.parse_enum_constant(&name)?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }

        let mut body = Vec::new();
        if self.match_token(&Token::Semicolon) {
            while !self.check(&Token::RBrace) {
                if self.is_at_end() {
                    return Err(self.error_here("'}' to close enum body"));
                }
                if let Some(member) = self.parse_class_member(&name)? {
                    body.push(member);
                }
            }
        }
        self.consume(&Token::RBrace, "'}' to close enum body")?;

        Ok(EnumDecl {
            modifiers,
            annotations,
            name,
            implements,
            constants,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_enum_constant(&mut self, enum_name: &str) -> ParseResult<EnumConstant> {
        let start = self.current_location();
        let annotations = self.parse_annotations()?;
        let name = self.parse_identifier()?;
        let arguments = if self.check(&Token::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let body = if self.check(&Token::LBrace) {
            Some(self.parse_class_body(enum_name)?)
        } else {
            None
        };
        Ok(EnumConstant {
            annotations,
            name,
            arguments,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_annotation_decl(&mut self, modifiers: Vec<Modifier>, annotations: Vec<Annotation>) -> ParseResult<AnnotationDecl> {
        let start = self.current_location();
        self.consume(&Token::At, "'@'")?;
        self.consume(&Token::Interface, "'interface'")?;
        let name = self.parse_identifier()?;
        let body = self.parse_class_body(&name)?;
        Ok(AnnotationDecl {
            modifiers,
            annotations,
            name,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_class_body(&mut self, type_name: &str) -> ParseResult<Vec<ClassMember>> {
        self.consume(&Token::LBrace, "'{' to open type body")?;
        let mut members = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(self.error_here("'}' to close type body"));
            }
            if let Some(member) = self.parse_class_member(type_name)? {
                members.push(member);
            }
        }
        self.consume(&Token::RBrace, "'}' to close type body")?;
        Ok(members)
    }

    /// One member of a type body; `None` for a stray `;`
    fn parse_class_member(&mut self, type_name: &str) -> ParseResult<Option<ClassMember>> {
        let start = self.current_location();
        if self.match_token(&Token::Semicolon) {
            return Ok(None);
        }
        if self.check(&Token::LBrace) {
            let body = self.parse_block()?;
            return Ok(Some(ClassMember::Initializer(InitializerBlock { is_static: false, body, span: self.span_from(start) })));
        }
        if self.check(&Token::Static) && self.check_at(1, &Token::LBrace) {
            self.advance();
            let body = self.parse_block()?;
            return Ok(Some(ClassMember::Initializer(InitializerBlock { is_static: true, body, span: self.span_from(start) })));
        }

        let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;

        if self.check(&Token::Class) || self.check(&Token::Interface) || self.check(&Token::Enum)
            || (self.check(&Token::At) && self.check_at(1, &Token::Interface))
        {
            return Ok(Some(ClassMember::TypeDecl(self.parse_type_decl(modifiers, annotations)?)));
        }

        let type_params = self.parse_optional_type_parameters()?;

        // Constructor: Identifier followed by '('
        if self.check(&Token::Identifier) && self.check_at(1, &Token::LParen) {
            let name = self.parse_identifier()?;
            if name != type_name {
                return Err(ParseError::invalid_syntax(
                    &format!("method '{}' is missing a return type", name),
                    self.previous().location(),
                ));
            }
            let parameters = self.parse_formal_parameters()?;
            let throws = self.parse_throws()?;
            let body = self.parse_block()?;
            return Ok(Some(ClassMember::Constructor(ConstructorDecl {
                modifiers,
                annotations,
                type_params,
                name,
                parameters,
                throws,
                body,
                span: self.span_from(start),
            })));
        }

        let return_type = if self.match_token(&Token::Void) {
            None
        } else {
            Some(self.parse_type_ref()?)
        };
        let name = self.parse_identifier()?;

        if self.check(&Token::LParen) {
            let method = self.parse_method_rest(start, modifiers, annotations, type_params, return_type, name)?;
            return Ok(Some(ClassMember::Method(method)));
        }

        let type_ref = match return_type {
            Some(t) if type_params.is_empty() => t,
            _ => return Err(self.error_here("'(' after method name")),
        };
        let variables = self.parse_variable_declarators(name)?;
        self.consume(&Token::Semicolon, "';' after field declaration")?;
        Ok(Some(ClassMember::Field(FieldDecl {
            modifiers,
            annotations,
            type_ref,
            variables,
            span: self.span_from(start),
        })))
    }

    fn parse_method_rest(
        &mut self,
        start: Location,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        type_params: Vec<TypeParam>,
        mut return_type: Option<TypeRef>,
        name: String,
    ) -> ParseResult<MethodDecl> {
        let parameters = self.parse_formal_parameters()?;
        // Legacy array dimensions after the parameter list: `int m()[]`
        while self.check(&Token::LBracket) && self.check_at(1, &Token::RBracket) {
            self.advance();
            self.advance();
            match return_type.as_mut() {
                Some(t) => t.array_dims += 1,
                None => return Err(ParseError::invalid_syntax("void method cannot declare array dimensions", self.previous().location())),
            }
        }
        let throws = self.parse_throws()?;
        let default_value = if self.match_token(&Token::Default) {
            Some(self.parse_element_value()?)
        } else {
            None
        };
        let body = if self.check(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            self.consume(&Token::Semicolon, "'{' or ';' after method declaration")?;
            None
        };
        Ok(MethodDecl {
            modifiers,
            annotations,
            type_params,
            return_type,
            name,
            parameters,
            throws,
            default_value,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_throws(&mut self) -> ParseResult<Vec<TypeRef>> {
        if self.match_token(&Token::Throws) {
            self.parse_type_list()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_formal_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        self.consume(&Token::LParen, "'(' to open parameter list")?;
        let mut parameters = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let start = self.current_location();
                let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
                let mut type_ref = self.parse_type_ref()?;
                // `String @NonNull ... args`
                self.parse_annotations()?;
                let varargs = self.match_token(&Token::Ellipsis);
                let name = self.parse_identifier()?;
                while self.check(&Token::LBracket) {
                    self.advance();
                    self.consume(&Token::RBracket, "']' after array dimension")?;
                    type_ref.array_dims += 1;
                }
                parameters.push(Parameter {
                    modifiers,
                    annotations,
                    type_ref,
                    name,
                    varargs,
                    span: self.span_from(start),
                });
                if varargs || !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' to close parameter list")?;
        Ok(parameters)
    }

    fn parse_variable_declarators(&mut self, first_name: String) -> ParseResult<Vec<VariableDeclarator>> {
        let mut variables = Vec::new();
        let mut name = first_name;
        loop {
            let start = self.previous().location();
            let mut array_dims = 0;
            while self.match_token(&Token::LBracket) {
                self.consume(&Token::RBracket, "']' after array dimension")?;
                array_dims += 1;
            }
            let initializer = if self.match_token(&Token::Assign) {
                Some(self.parse_variable_initializer()?)
            } else {
                None
            };
            variables.push(VariableDeclarator {
                name,
                array_dims,
                initializer,
                span: self.span_from(start),
            });
            if !self.match_token(&Token::Comma) {
                break;
            }
            name = self.parse_identifier()?;
        }
        Ok(variables)
    }

    fn parse_variable_initializer(&mut self) -> ParseResult<Expr> {
        if self.check(&Token::LBrace) {
            Ok(Expr::ArrayInitializer(self.parse_array_initializer()?))
        } else {
            self.parse_expression()
        }
    }

    fn parse_array_initializer(&mut self) -> ParseResult<Vec<Expr>> {
        self.consume(&Token::LBrace, "'{' to open array initializer")?;
        let mut items = Vec::new();
        while !self.check(&Token::RBrace) {
            items.push(self.parse_variable_initializer()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.consume(&Token::RBrace, "'}' to close array initializer")?;
        Ok(items)
    }

    // Types
    fn parse_optional_type_parameters(&mut self) -> ParseResult<Vec<TypeParam>> {
        if !self.check(&Token::Lt) {
            return Ok(Vec::new());
        }
        self.advance();
        let mut params = Vec::new();
        loop {
            let start = self.current_location();
            self.parse_annotations()?;
            let name = self.parse_identifier()?;
            let mut bounds = Vec::new();
            if self.match_token(&Token::Extends) {
                bounds.push(self.parse_type_ref()?);
                while self.match_token(&Token::Amp) {
                    bounds.push(self.parse_type_ref()?);
                }
            }
            params.push(TypeParam { name, bounds, span: self.span_from(start) });
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect_closing_angle()?;
        Ok(params)
    }

    fn parse_type_list(&mut self) -> ParseResult<Vec<TypeRef>> {
        let mut types = vec![self.parse_type_ref()?];
        while self.match_token(&Token::Comma) {
            types.push(self.parse_type_ref()?);
        }
        Ok(types)
    }

    fn parse_type_ref(&mut self) -> ParseResult<TypeRef> {
        let start = self.current_location();
        // Type-use annotations carry nothing the checker needs
        self.parse_annotations()?;

        let mut type_args = Vec::new();
        let name = match self.peek_token_type(self.current) {
            Some(t) if t.is_primitive_type() => self.advance().lexeme().to_string(),
            Some(Token::Identifier) => {
                let mut parts = vec![self.parse_identifier()?];
                loop {
                    if self.check(&Token::Lt) {
                        type_args = self.parse_type_arguments()?;
                    }
                    if self.check(&Token::Dot) && self.check_at(1, &Token::Identifier) {
                        self.advance();
                        parts.push(self.parse_identifier()?);
                        // Arguments of an outer segment (`Outer<A>.Inner`) are not kept
                        type_args.clear();
                        continue;
                    }
                    break;
                }
                parts.join(".")
            }
            _ => return Err(self.error_here("type")),
        };

        let mut array_dims = 0;
        while self.check(&Token::LBracket) && self.check_at(1, &Token::RBracket) {
            self.advance();
            self.advance();
            array_dims += 1;
        }

        Ok(TypeRef {
            name,
            type_args,
            array_dims,
            span: self.span_from(start),
        })
    }

    fn parse_type_arguments(&mut self) -> ParseResult<Vec<TypeArg>> {
        self.consume(&Token::Lt, "'<' for type arguments")?;
        let mut args = Vec::new();
        loop {
            if self.check(&Token::Question) {
                let start = self.current_location();
                self.advance();
                let bound = if self.match_token(&Token::Extends) {
                    Some((BoundKind::Extends, self.parse_type_ref()?))
                } else if self.match_token(&Token::Super) {
                    Some((BoundKind::Super, self.parse_type_ref()?))
                } else {
                    None
                };
                args.push(TypeArg::Wildcard(WildcardType { bound, span: self.span_from(start) }));
            } else {
                args.push(TypeArg::Type(self.parse_type_ref()?));
            }
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect_closing_angle()?;
        Ok(args)
    }

    /// Consume one `>`, splitting `>>` and `>>>` across nested argument lists
    fn expect_closing_angle(&mut self) -> ParseResult<()> {
        if self.pending_gt > 0 {
            self.pending_gt -= 1;
            return Ok(());
        }
        match self.peek_token_type(self.current) {
            Some(Token::Gt) => {
                self.advance();
            }
            Some(Token::RShift) => {
                self.advance();
                self.pending_gt = 1;
            }
            Some(Token::URShift) => {
                self.advance();
                self.pending_gt = 2;
            }
            _ => return Err(self.error_here("'>'")),
        }
        Ok(())
    }

    // Lookahead helpers; none of these consume tokens

    fn skip_annotations(&self, i: &mut usize) -> bool {
        while self.peek_token_type(*i) == Some(&Token::At) {
            *i += 1;
            if self.peek_token_type(*i) != Some(&Token::Identifier) {
                return false;
            }
            *i += 1;
            while self.peek_token_type(*i) == Some(&Token::Dot) && self.peek_token_type(*i + 1) == Some(&Token::Identifier) {
                *i += 2;
            }
            if self.peek_token_type(*i) == Some(&Token::LParen) && !self.skip_balanced(i, &Token::LParen, &Token::RParen) {
                return false;
            }
        }
        true
    }

    fn skip_balanced(&self, i: &mut usize, open: &Token, close: &Token) -> bool {
        let mut depth = 0usize;
        loop {
            match self.peek_token_type(*i) {
                Some(t) if t == open => depth += 1,
                Some(t) if t == close => {
                    depth -= 1;
                    if depth == 0 {
                        *i += 1;
                        return true;
                    }
                }
                Some(_) => {}
                None => return false,
            }
            *i += 1;
        }
    }

    fn lookahead_type_args(&self, i: &mut usize) -> bool {
        let mut depth: isize = 0;
        loop {
            match self.peek_token_type(*i) {
                Some(Token::Lt) => depth += 1,
                Some(Token::Gt) => depth -= 1,
                Some(Token::RShift) => depth -= 2,
                Some(Token::URShift) => depth -= 3,
                Some(Token::Identifier) | Some(Token::Dot) | Some(Token::Comma) | Some(Token::Question)
                | Some(Token::Extends) | Some(Token::Super) | Some(Token::LBracket) | Some(Token::RBracket)
                | Some(Token::Amp) | Some(Token::At) => {}
                Some(t) if t.is_primitive_type() => {}
                _ => return false,
            }
            *i += 1;
            if depth <= 0 {
                return depth == 0;
            }
        }
    }

    fn lookahead_type_ref(&self, i: &mut usize) -> bool {
        if !self.skip_annotations(i) {
            return false;
        }
        match self.peek_token_type(*i) {
            Some(t) if t.is_primitive_type() => *i += 1,
            Some(Token::Identifier) => {
                *i += 1;
                loop {
                    if self.peek_token_type(*i) == Some(&Token::Lt) && !self.lookahead_type_args(i) {
                        return false;
                    }
                    if self.peek_token_type(*i) == Some(&Token::Dot) && self.peek_token_type(*i + 1) == Some(&Token::Identifier) {
                        *i += 2;
                        continue;
                    }
                    break;
                }
            }
            _ => return false,
        }
        while self.peek_token_type(*i) == Some(&Token::LBracket) && self.peek_token_type(*i + 1) == Some(&Token::RBracket) {
            *i += 2;
        }
        true
    }

    /// `Type name` followed by something that can only continue a declaration
    fn is_local_var_decl_start(&self) -> bool {
        let mut i = self.current;
        if !self.lookahead_type_ref(&mut i) {
            return false;
        }
        if self.peek_token_type(i) != Some(&Token::Identifier) {
            return false;
        }
        matches!(
            self.peek_token_type(i + 1),
            Some(Token::Assign) | Some(Token::Semicolon) | Some(Token::Comma) | Some(Token::LBracket) | Some(Token::Colon)
        )
    }

    fn is_lambda_start(&self) -> bool {
        match self.peek_token_type(self.current) {
            Some(Token::Identifier) => self.check_at(1, &Token::Arrow),
            Some(Token::LParen) => {
                let mut i = self.current;
                self.skip_balanced(&mut i, &Token::LParen, &Token::RParen)
                    && self.peek_token_type(i) == Some(&Token::Arrow)
            }
            _ => false,
        }
    }

    /// `(Type) operand` as opposed to a parenthesized expression
    fn is_cast_start(&self) -> bool {
        if !self.check(&Token::LParen) {
            return false;
        }
        let mut i = self.current + 1;
        let primitive = self.peek_token_type(i).map(|t| t.is_primitive_type()).unwrap_or(false);
        if !self.lookahead_type_ref(&mut i) {
            return false;
        }
        // `(A & B) operand`; `(a & b) != 0` is rejected by the operand check below
        let mut intersection = false;
        while self.peek_token_type(i) == Some(&Token::Amp) {
            i += 1;
            if !self.lookahead_type_ref(&mut i) {
                return false;
            }
            intersection = true;
        }
        if self.peek_token_type(i) != Some(&Token::RParen) {
            return false;
        }
        if primitive && !intersection {
            return true;
        }
        match self.peek_token_type(i + 1) {
            Some(Token::Identifier) | Some(Token::LParen) | Some(Token::This) | Some(Token::Super)
            | Some(Token::New) | Some(Token::Bang) | Some(Token::Tilde) => true,
            Some(t) => t.is_literal(),
            None => false,
        }
    }

    // Statements

    fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.current_location();
        self.consume(&Token::LBrace, "'{' to open block")?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(self.error_here("'}' to close block"));
            }
            statements.push(self.parse_block_statement()?);
        }
        self.consume(&Token::RBrace, "'}' to close block")?;
        Ok(Block { statements, span: self.span_from(start) })
    }

    /// Statement allowed directly in a block: local declarations included
    fn parse_block_statement(&mut self) -> ParseResult<Stmt> {
        let local_type = self.check(&Token::Class)
            || self.check(&Token::Interface)
            || self.check(&Token::Enum)
            || ((self.check(&Token::Abstract) || self.check(&Token::Final) || self.check(&Token::Strictfp))
                && self.check_at(1, &Token::Class));
        if local_type {
            let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
            return Ok(Stmt::TypeDecl(self.parse_type_decl(modifiers, annotations)?));
        }

        if self.check(&Token::Final) || (self.check(&Token::At) && !self.check_at(1, &Token::Interface)) {
            let start = self.current_location();
            let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
            if self.check(&Token::Class) {
                return Ok(Stmt::TypeDecl(self.parse_type_decl(modifiers, annotations)?));
            }
            let decl = self.parse_local_var_decl(start, modifiers, annotations)?;
            self.consume(&Token::Semicolon, "';' after variable declaration")?;
            return Ok(Stmt::Declaration(VarDeclStmt { span: self.span_from(start), ..decl }));
        }

        if self.is_local_var_decl_start() {
            let start = self.current_location();
            let decl = self.parse_local_var_decl(start, Vec::new(), Vec::new())?;
            self.consume(&Token::Semicolon, "';' after variable declaration")?;
            return Ok(Stmt::Declaration(VarDeclStmt { span: self.span_from(start), ..decl }));
        }

        self.parse_statement()
    }

    fn parse_local_var_decl(&mut self, start: Location, modifiers: Vec<Modifier>, annotations: Vec<Annotation>) -> ParseResult<VarDeclStmt> {
        let type_ref = self.parse_type_ref()?;
        let name = self.parse_identifier()?;
        let variables = self.parse_variable_declarators(name)?;
        Ok(VarDeclStmt {
            modifiers,
            annotations,
            type_ref,
            variables,
            span: self.span_from(start),
        })
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_location();
        let token = match self.peek_token_type(self.current) {
            Some(t) => t.clone(),
            None => return Err(self.error_here("statement")),
        };

        match token {
            Token::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            Token::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(self.span_from(start)))
            }
            Token::If => self.parse_if_stmt(),
            Token::While => self.parse_while_stmt(),
            Token::Do => self.parse_do_while_stmt(),
            Token::For => self.parse_for_stmt(),
            Token::Try => self.parse_try_stmt(),
            Token::Switch => self.parse_switch_stmt(),
            Token::Return => {
                self.advance();
                let value = if self.check(&Token::Semicolon) { None } else { Some(self.parse_expression()?) };
                self.consume(&Token::Semicolon, "';' after return")?;
                Ok(Stmt::Return(ReturnStmt { value, span: self.span_from(start) }))
            }
            Token::Break => {
                self.advance();
                let label = if self.check(&Token::Identifier) { Some(self.parse_identifier()?) } else { None };
                self.consume(&Token::Semicolon, "';' after break")?;
                Ok(Stmt::Break(BreakStmt { label, span: self.span_from(start) }))
            }
            Token::Continue => {
                self.advance();
                let label = if self.check(&Token::Identifier) { Some(self.parse_identifier()?) } else { None };
                self.consume(&Token::Semicolon, "';' after continue")?;
                Ok(Stmt::Continue(ContinueStmt { label, span: self.span_from(start) }))
            }
            Token::Throw => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(&Token::Semicolon, "';' after throw")?;
                Ok(Stmt::Throw(ThrowStmt { expr, span: self.span_from(start) }))
            }
            Token::Assert => {
                self.advance();
                let condition = self.parse_expression()?;
                let message = if self.match_token(&Token::Colon) { Some(self.parse_expression()?) } else { None };
                self.consume(&Token::Semicolon, "';' after assert")?;
                Ok(Stmt::Assert(AssertStmt { condition, message, span: self.span_from(start) }))
            }
            Token::Synchronized => {
                self.advance();
                self.consume(&Token::LParen, "'(' after synchronized")?;
                let lock = self.parse_expression()?;
                self.consume(&Token::RParen, "')' after lock expression")?;
                let body = self.parse_block()?;
                Ok(Stmt::Synchronized(SynchronizedStmt { lock, body, span: self.span_from(start) }))
            }
            Token::Identifier if self.check_at(1, &Token::Colon) => {
                let label = self.parse_identifier()?;
                self.advance(); // ':'
                let statement = Box::new(self.parse_statement()?);
                Ok(Stmt::Labeled(LabeledStmt { label, statement, span: self.span_from(start) }))
            }
            _ => {
                let expr = self.parse_expression()?;
                if !is_statement_expression(&expr) {
                    return Err(ParseError::invalid_syntax(&format!("not a statement: {}", expr), start));
                }
                self.consume(&Token::Semicolon, "';' after expression")?;
                Ok(Stmt::Expression(ExprStmt { expr, span: self.span_from(start) }))
            }
        }
    }

    fn parse_parenthesized_condition(&mut self, keyword: &str) -> ParseResult<Expr> {
        self.consume(&Token::LParen, &format!("'(' after {}", keyword))?;
        let condition = self.parse_expression()?;
        self.consume(&Token::RParen, "')' after condition")?;
        Ok(condition)
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_location();
        self.consume(&Token::If, "'if'")?;
        let condition = self.parse_parenthesized_condition("if")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token(&Token::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt { condition, then_branch, else_branch, span: self.span_from(start) }))
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_location();
        self.consume(&Token::While, "'while'")?;
        let condition = self.parse_parenthesized_condition("while")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While(WhileStmt { condition, body, span: self.span_from(start) }))
    }

    fn parse_do_while_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_location();
        self.consume(&Token::Do, "'do'")?;
        let body = Box::new(self.parse_statement()?);
        self.consume(&Token::While, "'while' after do-body")?;
        let condition = self.parse_parenthesized_condition("while")?;
        self.consume(&Token::Semicolon, "';' after do-while")?;
        Ok(Stmt::DoWhile(DoWhileStmt { body, condition, span: self.span_from(start) }))
    }

    fn parse_for_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_location();
        self.consume(&Token::For, "'for'")?;
        self.consume(&Token::LParen, "'(' after for")?;

        // Enhanced for: [modifiers] Type name ':' expr
        let header_start = self.current_location();
        let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
        let mut i = self.current;
        if self.lookahead_type_ref(&mut i)
            && self.peek_token_type(i) == Some(&Token::Identifier)
            && self.peek_token_type(i + 1) == Some(&Token::Colon)
        {
            let var_type = self.parse_type_ref()?;
            let var_name = self.parse_identifier()?;
            self.consume(&Token::Colon, "':' in enhanced for")?;
            let iterable = self.parse_expression()?;
            self.consume(&Token::RParen, "')' after enhanced for header")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Stmt::ForEach(ForEachStmt {
                modifiers,
                var_type,
                var_name,
                iterable,
                body,
                span: self.span_from(start),
            }));
        }

        let mut init = Vec::new();
        if !modifiers.is_empty() || !annotations.is_empty() || self.is_local_var_decl_start() {
            let decl = self.parse_local_var_decl(header_start, modifiers, annotations)?;
            init.push(Stmt::Declaration(decl));
        } else if !self.check(&Token::Semicolon) {
            loop {
                let expr_start = self.current_location();
                let expr = self.parse_expression()?;
                init.push(Stmt::Expression(ExprStmt { expr, span: self.span_from(expr_start) }));
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::Semicolon, "';' after for init")?;
        let condition = if self.check(&Token::Semicolon) { None } else { Some(self.parse_expression()?) };
        self.consume(&Token::Semicolon, "';' after for condition")?;
        let mut update = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                update.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' after for header")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For(ForStmt { init, condition, update, body, span: self.span_from(start) }))
    }

    fn parse_try_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_location();
        self.consume(&Token::Try, "'try'")?;

        let mut resources = Vec::new();
        if self.match_token(&Token::LParen) {
            while !self.check(&Token::RParen) {
                let res_start = self.current_location();
                let (modifiers, _) = self.parse_modifiers_and_annotations()?;
                let type_ref = self.parse_type_ref()?;
                let name = self.parse_identifier()?;
                self.consume(&Token::Assign, "'=' in try resource")?;
                let initializer = self.parse_expression()?;
                resources.push(TryResource { modifiers, type_ref, name, initializer, span: self.span_from(res_start) });
                if !self.match_token(&Token::Semicolon) {
                    break;
                }
            }
            self.consume(&Token::RParen, "')' after try resources")?;
        }

        let try_block = self.parse_block()?;
        let mut catch_clauses = Vec::new();
        while self.check(&Token::Catch) {
            let catch_start = self.current_location();
            self.advance();
            self.consume(&Token::LParen, "'(' after catch")?;
            let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
            let type_ref = self.parse_type_ref()?;
            let mut alt_types = Vec::new();
            while self.match_token(&Token::Pipe) {
                alt_types.push(self.parse_type_ref()?);
            }
            let param_start = self.current_location();
            let name = self.parse_identifier()?;
            self.consume(&Token::RParen, "')' after catch parameter")?;
            let parameter = Parameter {
                modifiers,
                annotations,
                type_ref,
                name,
                varargs: false,
                span: self.span_from(param_start),
            };
            let block = self.parse_block()?;
            catch_clauses.push(CatchClause { parameter, alt_types, block, span: self.span_from(catch_start) });
        }
        let finally_block = if self.match_token(&Token::Finally) { Some(self.parse_block()?) } else { None };

        if resources.is_empty() && catch_clauses.is_empty() && finally_block.is_none() {
            return Err(ParseError::invalid_syntax("'try' without 'catch', 'finally' or resources", start));
        }
        Ok(Stmt::Try(TryStmt { resources, try_block, catch_clauses, finally_block, span: self.span_from(start) }))
    }

    fn parse_switch_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_location();
        self.consume(&Token::Switch, "'switch'")?;
        let expression = self.parse_parenthesized_condition("switch")?;
        self.consume(&Token::LBrace, "'{' after switch")?;

        let mut cases: Vec<SwitchCase> = Vec::new();
        while !self.check(&Token::RBrace) {
            let case_start = self.current_location();
            let mut labels = Vec::new();
            let mut is_default = false;
            // Consecutive labels share one statement group
            loop {
                if self.match_token(&Token::Case) {
                    labels.push(self.parse_conditional_expr()?);
                    self.consume(&Token::Colon, "':' after case label")?;
                } else if self.check(&Token::Default) && self.check_at(1, &Token::Colon) {
                    self.advance();
                    self.advance();
                    is_default = true;
                } else {
                    break;
                }
            }
            if labels.is_empty() && !is_default {
                return Err(self.error_here("'case', 'default' or '}'"));
            }
            if is_default {
                labels.clear();
            }
            let mut statements = Vec::new();
            while !self.check(&Token::Case) && !self.check(&Token::RBrace)
                && !(self.check(&Token::Default) && self.check_at(1, &Token::Colon))
            {
                if self.is_at_end() {
                    return Err(self.error_here("'}' to close switch"));
                }
                statements.push(self.parse_block_statement()?);
            }
            cases.push(SwitchCase { labels, statements, span: self.span_from(case_start) });
        }
        self.consume(&Token::RBrace, "'}' to close switch")?;
        Ok(Stmt::Switch(SwitchStmt { expression, cases, span: self.span_from(start) }))
    }

    // Expressions

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        if self.is_lambda_start() {
            return self.parse_lambda();
        }
        self.parse_assignment_expr()
    }

    fn parse_assignment_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let target = self.parse_conditional_expr()?;
        let operator = match self.peek_token_type(self.current) {
            Some(Token::Assign) => AssignmentOp::Assign,
            Some(Token::AddAssign) => AssignmentOp::AddAssign,
            Some(Token::SubAssign) => AssignmentOp::SubAssign,
            Some(Token::MulAssign) => AssignmentOp::MulAssign,
            Some(Token::DivAssign) => AssignmentOp::DivAssign,
            Some(Token::ModAssign) => AssignmentOp::ModAssign,
            Some(Token::AndAssign) => AssignmentOp::AndAssign,
            Some(Token::OrAssign) => AssignmentOp::OrAssign,
            Some(Token::XorAssign) => AssignmentOp::XorAssign,
            Some(Token::LShiftAssign) => AssignmentOp::LShiftAssign,
            Some(Token::RShiftAssign) => AssignmentOp::RShiftAssign,
            Some(Token::URShiftAssign) => AssignmentOp::URShiftAssign,
            _ => return Ok(target),
        };
        if !matches!(target, Expr::Identifier(_) | Expr::FieldAccess(_) | Expr::ArrayAccess(_)) {
            return Err(ParseError::invalid_syntax(&format!("invalid assignment target: {}", target), start));
        }
        self.advance();
        let value = if self.check(&Token::LBrace) {
            Expr::ArrayInitializer(self.parse_array_initializer()?)
        } else {
            self.parse_expression()?
        };
        Ok(Expr::Assignment(AssignmentExpr {
            target: Box::new(target),
            operator,
            value: Box::new(value),
            span: self.span_from(start),
        }))
    }

    fn parse_conditional_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let condition = self.parse_binary_expr(0)?;
        if !self.match_token(&Token::Question) {
            return Ok(condition);
        }
        let then_expr = self.parse_expression()?;
        self.consume(&Token::Colon, "':' in conditional expression")?;
        let else_expr = if self.is_lambda_start() { self.parse_lambda()? } else { self.parse_conditional_expr()? };
        Ok(Expr::Conditional(ConditionalExpr {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            span: self.span_from(start),
        }))
    }

    fn parse_binary_expr(&mut self, level: usize) -> ParseResult<Expr> {
        if level >= BINARY_LEVELS.len() {
            return self.parse_unary_expr();
        }
        let start = self.current_location();
        let mut expr = self.parse_binary_expr(level + 1)?;
        'outer: loop {
            if level == RELATIONAL_LEVEL && self.match_token(&Token::InstanceOf) {
                let target_type = self.parse_type_ref()?;
                expr = Expr::InstanceOf(InstanceOfExpr {
                    expr: Box::new(expr),
                    target_type,
                    span: self.span_from(start),
                });
                continue;
            }
            for (token, operator) in BINARY_LEVELS[level] {
                if self.match_token(token) {
                    let right = self.parse_binary_expr(level + 1)?;
                    expr = Expr::Binary(BinaryExpr {
                        left: Box::new(expr),
                        operator: *operator,
                        right: Box::new(right),
                        span: self.span_from(start),
                    });
                    continue 'outer;
                }
            }
            break;
        }
        Ok(expr)
    }

    fn parse_unary_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let operator = match self.peek_token_type(self.current) {
            Some(Token::Plus) => Some(UnaryOp::Plus),
            Some(Token::Minus) => Some(UnaryOp::Minus),
            Some(Token::Bang) => Some(UnaryOp::Not),
            Some(Token::Tilde) => Some(UnaryOp::BitNot),
            Some(Token::Inc) => Some(UnaryOp::PreInc),
            Some(Token::Dec) => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let operand = self.parse_unary_expr()?;
            return Ok(Expr::Unary(UnaryExpr { operator, operand: Box::new(operand), span: self.span_from(start) }));
        }

        if self.is_cast_start() {
            self.advance(); // '('
            let target_type = self.parse_type_ref()?;
            let mut additional_bounds = Vec::new();
            while self.match_token(&Token::Amp) {
                additional_bounds.push(self.parse_type_ref()?);
            }
            self.consume(&Token::RParen, "')' after cast type")?;
            let operand = if self.is_lambda_start() { self.parse_lambda()? } else { self.parse_unary_expr()? };
            return Ok(Expr::Cast(CastExpr {
                target_type,
                additional_bounds,
                expr: Box::new(operand),
                span: self.span_from(start),
            }));
        }

        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let mut expr = self.parse_primary_expr()?;
        loop {
            if self.match_token(&Token::Dot) {
                expr = self.parse_member_suffix(start, expr)?;
                continue;
            }
            if self.check(&Token::LBracket) {
                if self.check_at(1, &Token::RBracket) {
                    // `Name[].class` or `Name[]::new`
                    let type_ref = self.expr_to_array_type(start, &expr)?;
                    expr = self.parse_type_suffix(start, type_ref)?;
                    continue;
                }
                self.advance();
                let index = self.parse_expression()?;
                self.consume(&Token::RBracket, "']' after index")?;
                expr = Expr::ArrayAccess(ArrayAccessExpr {
                    array: Box::new(expr),
                    index: Box::new(index),
                    span: self.span_from(start),
                });
                continue;
            }
            if self.match_token(&Token::DoubleColon) {
                let name = if self.match_token(&Token::New) { "new".to_string() } else { self.parse_identifier()? };
                expr = Expr::MethodRef(MethodRefExpr { target: Box::new(expr), name, span: self.span_from(start) });
                continue;
            }
            break;
        }

        while self.check(&Token::Inc) || self.check(&Token::Dec) {
            let operator = if self.check(&Token::Inc) { UnaryOp::PostInc } else { UnaryOp::PostDec };
            self.advance();
            expr = Expr::Unary(UnaryExpr { operator, operand: Box::new(expr), span: self.span_from(start) });
        }
        Ok(expr)
    }

    /// Whatever follows a `.` in a postfix chain
    fn parse_member_suffix(&mut self, start: Location, target: Expr) -> ParseResult<Expr> {
        match self.peek_token_type(self.current) {
            Some(Token::Identifier) => {
                let name = self.parse_identifier()?;
                if self.check(&Token::LParen) {
                    let arguments = self.parse_arguments()?;
                    Ok(Expr::MethodCall(MethodCallExpr {
                        target: Some(Box::new(target)),
                        type_args: Vec::new(),
                        name,
                        arguments,
                        span: self.span_from(start),
                    }))
                } else {
                    Ok(Expr::FieldAccess(FieldAccessExpr { target: Box::new(target), name, span: self.span_from(start) }))
                }
            }
            Some(Token::Lt) => {
                let type_args = self.parse_type_arguments()?;
                let name = self.parse_identifier()?;
                let arguments = self.parse_arguments()?;
                Ok(Expr::MethodCall(MethodCallExpr {
                    target: Some(Box::new(target)),
                    type_args,
                    name,
                    arguments,
                    span: self.span_from(start),
                }))
            }
            Some(Token::Class) => {
                self.advance();
                let type_ref = self.expr_to_type(start, &target, 0)?;
                Ok(Expr::ClassLiteral(ClassLiteralExpr { type_ref, span: self.span_from(start) }))
            }
            // Qualified `Outer.this` and `Outer.super`
            Some(Token::This) | Some(Token::Super) => {
                let name = self.advance().lexeme().to_string();
                Ok(Expr::FieldAccess(FieldAccessExpr { target: Box::new(target), name, span: self.span_from(start) }))
            }
            // Qualified instance creation `outer.new Inner()`; the outer instance is not kept
            Some(Token::New) => self.parse_new_expression(),
            _ => Err(self.error_here("member name after '.'")),
        }
    }

    fn parse_type_suffix(&mut self, start: Location, type_ref: TypeRef) -> ParseResult<Expr> {
        if self.match_token(&Token::DoubleColon) {
            self.consume(&Token::New, "'new' in array constructor reference")?;
            let target = Expr::ClassLiteral(ClassLiteralExpr { type_ref, span: self.span_from(start) });
            return Ok(Expr::MethodRef(MethodRefExpr { target: Box::new(target), name: "new".to_string(), span: self.span_from(start) }));
        }
        self.consume(&Token::Dot, "'.class' after array type")?;
        self.consume(&Token::Class, "'class' after array type")?;
        Ok(Expr::ClassLiteral(ClassLiteralExpr { type_ref, span: self.span_from(start) }))
    }

    fn expr_to_array_type(&mut self, start: Location, expr: &Expr) -> ParseResult<TypeRef> {
        let mut dims = 0;
        while self.check(&Token::LBracket) && self.check_at(1, &Token::RBracket) {
            self.advance();
            self.advance();
            dims += 1;
        }
        self.expr_to_type(start, expr, dims)
    }

    fn expr_to_type(&self, start: Location, expr: &Expr, array_dims: usize) -> ParseResult<TypeRef> {
        match qualified_name_of(expr) {
            Some(name) => Ok(TypeRef { name, type_args: Vec::new(), array_dims, span: self.span_from(start) }),
            None => Err(ParseError::invalid_syntax(&format!("'{}' is not a type name", expr), start)),
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.consume(&Token::LParen, "'(' to open argument list")?;
        let mut arguments = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' after arguments")?;
        Ok(arguments)
    }

    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let token = match self.tokens.get(self.current) {
            Some(t) if self.pending_gt == 0 => t.clone(),
            _ => return Err(self.error_here("expression")),
        };

        match token.token {
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(&Token::RParen, "')' after expression")?;
                Ok(Expr::Parenthesized(Box::new(inner)))
            }
            Token::New => self.parse_new_expression(),
            Token::This | Token::Super | Token::Identifier => {
                self.advance();
                let name = token.lexeme.clone();
                if self.check(&Token::LParen) {
                    // Unqualified call, or explicit constructor call `this(..)` / `super(..)`
                    let arguments = self.parse_arguments()?;
                    return Ok(Expr::MethodCall(MethodCallExpr {
                        target: None,
                        type_args: Vec::new(),
                        name,
                        arguments,
                        span: self.span_from(start),
                    }));
                }
                Ok(Expr::Identifier(IdentifierExpr { name, span: self.span_from(start) }))
            }
            ref t if t.is_primitive_type() || *t == Token::Void => {
                // `int.class`, `int[].class`, `void.class`, `int[]::new`
                self.advance();
                let mut type_ref = TypeRef { name: token.lexeme.clone(), type_args: Vec::new(), array_dims: 0, span: self.span_from(start) };
                while self.check(&Token::LBracket) && self.check_at(1, &Token::RBracket) {
                    self.advance();
                    self.advance();
                    type_ref.array_dims += 1;
                }
                self.parse_type_suffix(start, type_ref)
            }
            ref t if t.is_literal() => {
                self.advance();
                let value = literal_value(&token)?;
                Ok(Expr::Literal(LiteralExpr { value, span: self.span_from(start) }))
            }
            _ => Err(self.error_here("expression")),
        }
    }

    fn parse_new_expression(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        self.consume(&Token::New, "'new'")?;
        // Constructor type arguments `new <T>Foo()` carry nothing we need
        if self.check(&Token::Lt) {
            self.parse_type_arguments()?;
        }
        self.parse_annotations()?;

        let name = match self.peek_token_type(self.current) {
            Some(t) if t.is_primitive_type() => self.advance().lexeme().to_string(),
            Some(Token::Identifier) => self.parse_qualified_name()?,
            _ => return Err(self.error_here("type after 'new'")),
        };

        let mut type_args = Vec::new();
        if self.check(&Token::Lt) {
            if self.check_at(1, &Token::Gt) {
                // Diamond operator
                self.advance();
                self.advance();
            } else {
                type_args = self.parse_type_arguments()?;
            }
        }
        let mut target_type = TypeRef { name, type_args, array_dims: 0, span: self.span_from(start) };

        if self.check(&Token::LBracket) {
            let mut dimensions = Vec::new();
            let mut total_dims = 0;
            while self.match_token(&Token::LBracket) {
                if self.match_token(&Token::RBracket) {
                    total_dims += 1;
                    continue;
                }
                if total_dims > dimensions.len() {
                    return Err(ParseError::invalid_syntax("sized dimension after unsized dimension", self.current_location()));
                }
                dimensions.push(self.parse_expression()?);
                self.consume(&Token::RBracket, "']' in array creation")?;
                total_dims += 1;
            }
            let initializer = if dimensions.is_empty() {
                Some(self.parse_array_initializer()?)
            } else {
                None
            };
            return Ok(Expr::NewArray(NewArrayExpr {
                element_type: target_type,
                dimensions,
                total_dims,
                initializer,
                span: self.span_from(start),
            }));
        }

        let arguments = self.parse_arguments()?;
        let anonymous_body = if self.check(&Token::LBrace) {
            let simple = target_type.name.rsplit('.').next().unwrap_or_default().to_string();
            Some(self.parse_class_body(&simple)?)
        } else {
            None
        };
        target_type.span = self.span_from(start);
        Ok(Expr::New(NewExpr { target_type, arguments, anonymous_body, span: self.span_from(start) }))
    }

    fn parse_lambda(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let mut parameters = Vec::new();
        if self.check(&Token::Identifier) {
            parameters.push(LambdaParam { type_ref: None, name: self.parse_identifier()? });
        } else {
            self.consume(&Token::LParen, "'(' to open lambda parameters")?;
            if !self.check(&Token::RParen) {
                loop {
                    if self.check(&Token::Identifier) && (self.check_at(1, &Token::Comma) || self.check_at(1, &Token::RParen)) {
                        parameters.push(LambdaParam { type_ref: None, name: self.parse_identifier()? });
                    } else {
                        self.parse_modifiers_and_annotations()?;
                        let mut type_ref = self.parse_type_ref()?;
                        if self.match_token(&Token::Ellipsis) {
                            type_ref.array_dims += 1;
                        }
                        let name = self.parse_identifier()?;
                        parameters.push(LambdaParam { type_ref: Some(type_ref), name });
                    }
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
            self.consume(&Token::RParen, "')' to close lambda parameters")?;
        }
        self.consume(&Token::Arrow, "'->' in lambda")?;
        let body = if self.check(&Token::LBrace) {
            LambdaBody::Block(self.parse_block()?)
        } else {
            LambdaBody::Expr(Box::new(self.parse_expression()?))
        };
        Ok(Expr::Lambda(LambdaExpr { parameters, body, span: self.span_from(start) }))
    }
}

fn describe(token: &LexicalToken) -> String {
    format!("'{}'", token.lexeme())
}

/// Java allows only these expression kinds as statements
fn is_statement_expression(expr: &Expr) -> bool {
    match expr {
        Expr::Assignment(_) | Expr::MethodCall(_) | Expr::New(_) => true,
        Expr::Unary(u) => matches!(u.operator, UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec),
        _ => false,
    }
}

/// Dotted name of an identifier chain (`a.b.C`), if it is one
fn qualified_name_of(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(id) if id.name != "this" && id.name != "super" => Some(id.name.clone()),
        Expr::FieldAccess(fa) => qualified_name_of(&fa.target).map(|prefix| format!("{}.{}", prefix, fa.name)),
        _ => None,
    }
}

fn literal_value(token: &LexicalToken) -> ParseResult<Literal> {
    let lexeme = token.lexeme();
    let invalid = || ParseError::invalid_syntax(&format!("invalid numeric literal '{}'", lexeme), token.location());
    let value = match token.token_type() {
        Token::True => Literal::Boolean(true),
        Token::False => Literal::Boolean(false),
        Token::Null => Literal::Null,
        Token::StringLiteral => Literal::String(lexeme[1..lexeme.len() - 1].to_string()),
        Token::CharLiteral => Literal::Char(lexeme[1..lexeme.len() - 1].to_string()),
        Token::HexInteger | Token::BinaryInteger | Token::IntegerLiteral => {
            let digits: String = lexeme.chars().filter(|c| *c != '_' && *c != 'l' && *c != 'L').collect();
            let (radix, body) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
                (16, hex.to_string())
            } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
                (2, bin.to_string())
            } else if digits.len() > 1 && digits.starts_with('0') {
                (8, digits[1..].to_string())
            } else {
                (10, digits)
            };
            // Two's complement literals such as 0xFFFFFFFFFFFFFFFFL wrap like Java
            let value = u64::from_str_radix(&body, radix).map_err(|_| invalid())?;
            Literal::Integer(value as i64)
        }
        Token::FloatLiteral => {
            let digits: String = lexeme
                .chars()
                .filter(|c| !matches!(c, '_' | 'f' | 'F' | 'd' | 'D'))
                .collect();
            Literal::Float(digits.parse::<f64>().map_err(|_| invalid())?)
        }
        _ => return Err(ParseError::unexpected_token("literal", &describe(token), token.location())),
    };
    Ok(value)
}

/// Parse source code into an AST
pub fn parse(source: &str) -> ParseResult<Ast> {
    Parser::new(source)?.parse()
}
