use callsuper::parser::lexer::Token;
use callsuper::parser::Lexer;

fn kinds(source: &str) -> Vec<Token> {
    Lexer::new(source)
        .tokenize()
        .expect("Failed to tokenize")
        .into_iter()
        .map(|t| t.token_type().clone())
        .collect()
}

#[test]
fn lexer_override_header() {
    let source = "@Override protected void onCreate(Bundle state) throws Exception";
    let tokens = Lexer::new(source).tokenize().expect("Failed to tokenize");

    assert_eq!(tokens.len(), 10);
    assert!(tokens[0].is(&Token::At));
    assert!(tokens[1].is(&Token::Identifier));
    assert_eq!(tokens[1].lexeme(), "Override");
    assert!(tokens[2].is(&Token::Protected));
    assert!(tokens[3].is(&Token::Void));
    assert!(tokens[4].is(&Token::Identifier));
    assert!(tokens[5].is(&Token::LParen));
    assert!(tokens[8].is(&Token::RParen));
    assert!(tokens[9].is(&Token::Throws));
}

#[test]
fn lexer_compound_assignment_operators() {
    assert_eq!(
        kinds("+ - * / % = += -= *= /= %="),
        vec![
            Token::Plus,
            Token::Minus,
            Token::Star,
            Token::Slash,
            Token::Percent,
            Token::Assign,
            Token::AddAssign,
            Token::SubAssign,
            Token::MulAssign,
            Token::DivAssign,
            Token::ModAssign,
        ]
    );
}

#[test]
fn lexer_super_call_statement() {
    assert_eq!(
        kinds("super.m1(s);"),
        vec![Token::Super, Token::Dot, Token::Identifier, Token::LParen, Token::Identifier, Token::RParen, Token::Semicolon]
    );
}

#[test]
fn lexer_javadoc_and_comments_are_skipped() {
    let source = "/**\n * Must call super.\n */\n// trailing\n/* block */";
    assert!(kinds(source).is_empty());
}

#[test]
fn lexer_locations_are_one_based() {
    let tokens = Lexer::new("class A {\n  void m() {}\n}").tokenize().expect("Failed to tokenize");
    let void = &tokens[3];
    assert!(void.is(&Token::Void));
    assert_eq!(void.location().line, 2);
    assert_eq!(void.location().column, 3);
}

#[test]
fn lexer_unicode_identifiers() {
    let tokens = Lexer::new("int café = 1; String 名前;").tokenize().expect("Failed to tokenize");
    assert!(tokens[1].is(&Token::Identifier));
    assert_eq!(tokens[1].lexeme(), "café");
    assert_eq!(tokens[6].lexeme(), "名前");
    assert_eq!(tokens[6].location().column, 22);
}

#[test]
fn lexer_hex_floating_literals() {
    for literal in ["0x1.8p1", "0x1p-3", "0X.8P2f", "0xA.Bp+4d", "0x1.p0"] {
        assert_eq!(kinds(literal), vec![Token::FloatLiteral], "{}", literal);
    }
    assert_eq!(kinds("0x1F"), vec![Token::HexInteger]);
}
