pub mod token;

use crate::scanner::token::{Token, TokenType};
use crate::span::Span;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize, // index of the first char of the current line
    start_span: Span,  // span of the token being scanned
    keywords: HashMap<String, TokenType>,
}

impl Scanner {
    pub fn new(source: impl Into<String>, keywords: &HashMap<String, TokenType>) -> Self {
        Scanner {
            source: source.into().chars().collect(),
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
            start_span: Span::default(),
            keywords: keywords.clone(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, Vec<LexError>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_span = Span {
                line: self.line,
                col: self.current - self.line_start + 1,
                length: 1,
            };
            self.scan_token();
        }

        self.start_span = Span {
            line: self.line,
            col: self.current - self.line_start + 1,
            length: 1,
        };
        self.tokens
            .push(Token::new(TokenType::Eof, "", self.start_span));
        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            ';' => self.add_token(TokenType::Semicolon),
            '+' => self.add_token(TokenType::Plus),
            '-' => self.add_token(TokenType::Minus),
            '*' => self.add_token(TokenType::Star),

            // One or two character tokens
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::Equal
                } else {
                    TokenType::Assign
                };
                self.add_token(token_type);
            }

            '!' => {
                let token_type = if self.match_char('=') {
                    TokenType::NotEqual
                } else {
                    TokenType::Not
                };
                self.add_token(token_type);
            }

            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }

            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }

            '/' => {
                // Handle comments or division
                if self.match_char('/') {
                    // Comment goes until end of line
                    while self.peek() != Some('\n') && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.match_char('*') {
                    // Multi-line comment
                    loop {
                        if self.is_at_end() {
                            self.report_error("Unterminated multi-line comment");
                            break;
                        }

                        if self.peek() == Some('\n') {
                            self.line += 1;
                            self.line_start = self.current + 1;
                        }

                        if self.peek() == Some('*') && self.peek_next() == Some('/') {
                            self.advance(); // consume '*'
                            self.advance(); // consume '/'
                            break;
                        }

                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }

            // Whitespace
            ' ' | '\r' | '\t' => {}

            '\n' => {
                self.line += 1;
                self.line_start = self.current;
            }

            // strings
            '"' => self.handle_string(),

            // numbers
            c if c.is_ascii_digit() => self.handle_number(),

            // identifiers and keywords
            c if c.is_alphabetic() || c == '_' => self.handle_identifier(),

            _ => self.report_error(format!("Unexpected character: '{}'", c)),
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.current_char().expect("Unexpected EOF");
        self.current += 1;
        ch
    }

    fn current_char(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek(&self) -> Option<char> {
        self.current_char()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.current += 1;
                true
            }
            _ => false,
        }
    }

    fn handle_string(&mut self) {
        // The value (escapes resolved) diverges from the lexeme, so build it as we go
        let mut value = String::new();

        loop {
            match self.peek() {
                None => {
                    self.report_error("Unterminated string");
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance(); // consume '\'
                    match self.peek() {
                        None => {
                            self.report_error("Unterminated string");
                            return;
                        }
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('"') => value.push('"'),
                        // any other escaped character stands for itself
                        Some(other) => value.push(other),
                    }
                    self.advance();
                }
                Some('\n') => {
                    self.line += 1;
                    self.line_start = self.current + 1;
                    value.push('\n');
                    self.advance();
                }
                Some(other) => {
                    value.push(other);
                    self.advance();
                }
            }
        }

        self.add_token(TokenType::String(value));
    }

    fn handle_number(&mut self) {
        // First character is already consumed and is a digit
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // At most one decimal point, and only when a digit follows it
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance(); // consume '.'

            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        if is_float {
            match text.parse::<f64>() {
                Ok(num) => self.add_token(TokenType::Float(num)),
                Err(_) => self.report_error(format!("Invalid number: '{}'", text)),
            }
        } else {
            match text.parse::<i64>() {
                Ok(num) => self.add_token(TokenType::Int(num)),
                Err(_) => self.report_error(format!("Invalid number: '{}'", text)),
            }
        }
    }

    fn handle_identifier(&mut self) {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        // Keyword spellings are case-sensitive; anything unknown is an identifier
        let token_type = self
            .keywords
            .get(&text)
            .cloned()
            .unwrap_or(TokenType::Identifier);

        self.add_token(token_type);
    }

    fn add_token(&mut self, t: TokenType) {
        let text = self.source[self.start..self.current]
            .iter()
            .collect::<String>();
        let span = Span {
            length: self.current - self.start,
            ..self.start_span
        };
        self.tokens.push(Token::new(t, text, span));
    }

    fn report_error(&mut self, message: impl Into<String>) {
        self.errors.push(LexError {
            span: Span {
                length: (self.current - self.start).max(1),
                ..self.start_span
            },
            message: message.into(),
        });
    }
}
