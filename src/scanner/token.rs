use crate::span::Span;

#[derive(Clone, Debug)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, span: Span) -> Self {
        Token {
            token_type,
            lexeme: lexeme.into(),
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,  // (
    RightParen, // )
    LeftBrace,  // {
    RightBrace, // }
    Comma,      // ,
    Semicolon,  // ;
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /

    // One or two character tokens
    Assign,       // =
    Equal,        // ==
    NotEqual,     // !=
    Greater,      // >
    GreaterEqual, // >=
    Less,         // <
    LessEqual,    // <=

    // Literals
    Identifier,     // variable and function names
    String(String), // "ash nazg"
    Int(i64),       // 123
    Float(f64),     // 45.67

    // Keywords (each with one or more accepted spellings, see keywords.rs)
    And,    // and / agh
    Or,     // or / urz
    Not,    // not, also spelled !
    If,     // if / gul
    Elif,   // elif / gulnakh
    Else,   // else / skai
    While,  // while / arburz
    Fun,    // fun
    Return, // return / zagh
    Print,  // print / krimp
    True,   // true / goth
    False,  // false / burzum

    Eof, // end of file
}
