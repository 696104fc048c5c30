pub mod ast;

use crate::parser::ast::{
    BinOp, CmpOp, Expr, ExprKind, LogicOp, Program, Stmt, StmtKind, UnaryOp,
};
use crate::scanner::token::{Token, TokenType};
use crate::span::Span;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    // utility methods
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().token_type == token_type
    }

    fn match_any(&mut self, types: &[TokenType]) -> bool {
        for t in types {
            if self.check(t.clone()) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        let current = self.peek();
        let context = if self.current > 0 {
            format!(" after '{}'", self.previous().lexeme)
        } else {
            String::new()
        };
        ParseError {
            span: current.span,
            message: format!(
                "Expected {}{}, got {:?}",
                expected, context, current.token_type
            ),
        }
    }

    fn consume(&mut self, token_type: TokenType, expected: &str) -> Result<&Token, ParseError> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(expected))
        }
    }

    pub fn parse(mut self) -> Result<Program, Vec<ParseError>> {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.terminated_statement(TokenType::Eof) {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    errors.push(e);
                    self.synchronize(); // skip to the next statement
                }
            }
        }

        if errors.is_empty() {
            Ok(Program { statements })
        } else {
            Err(errors)
        }
    }

    fn synchronize(&mut self) {
        self.advance(); // Skip the token that caused the error

        while !self.is_at_end() {
            // A semicolon ends a statement, so we're at a fresh start
            if self.previous().token_type == TokenType::Semicolon {
                return;
            }

            // A keyword that begins a statement is also a safe resume point
            match self.peek().token_type {
                TokenType::Fun
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {}
            }

            self.advance(); // Keep skipping
        }
    }

    /// A statement plus its terminator. Block-shaped statements (if, while,
    /// fun) take an optional semicolon; everything else requires one, except
    /// immediately before `stop` (RightBrace inside a block, Eof at top level).
    fn terminated_statement(&mut self, stop: TokenType) -> Result<Stmt, ParseError> {
        let stmt = self.statement()?;

        if self.check(TokenType::Semicolon) {
            self.advance();
        } else if !self.ends_with_block(&stmt) && !self.check(stop) && !self.is_at_end() {
            return Err(self.error_expected("';'"));
        }

        Ok(stmt)
    }

    fn ends_with_block(&self, stmt: &Stmt) -> bool {
        matches!(
            stmt.kind,
            StmtKind::If { .. } | StmtKind::While { .. } | StmtKind::FunDef { .. }
        )
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.check(TokenType::Fun) {
            self.fun_def()
        } else if self.check(TokenType::Return) {
            self.return_stmt()
        } else if self.check(TokenType::If) {
            self.if_stmt()
        } else if self.check(TokenType::While) {
            self.while_stmt()
        } else if self.check(TokenType::Print) {
            self.print_stmt()
        } else if self.check(TokenType::Identifier)
            && self
                .peek_next()
                .is_some_and(|t| t.token_type == TokenType::Assign)
        {
            self.assignment()
        } else {
            let span = self.peek().span;
            let expr = self.logical_expr()?;
            Ok(Stmt {
                kind: StmtKind::ExprStmt(expr),
                span,
            })
        }
    }

    fn assignment(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        let name = self
            .consume(TokenType::Identifier, "identifier")?
            .lexeme
            .clone();
        self.consume(TokenType::Assign, "'='")?;
        let value = self.logical_expr()?;

        Ok(Stmt {
            kind: StmtKind::Assign { name, value },
            span,
        })
    }

    fn fun_def(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.advance(); // consume fun

        let name = self
            .consume(TokenType::Identifier, "function name")?
            .lexeme
            .clone();

        self.consume(TokenType::LeftParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenType::RightParen) {
            params.push(
                self.consume(TokenType::Identifier, "parameter name")?
                    .lexeme
                    .clone(),
            );

            while self.check(TokenType::Comma) {
                self.advance();
                params.push(
                    self.consume(TokenType::Identifier, "parameter name")?
                        .lexeme
                        .clone(),
                );
            }
        }
        self.consume(TokenType::RightParen, "')'")?;

        let body = Rc::new(self.block()?);

        Ok(Stmt {
            kind: StmtKind::FunDef { name, params, body },
            span,
        })
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.advance(); // consume return

        let value = if self.check(TokenType::Semicolon)
            || self.check(TokenType::RightBrace)
            || self.is_at_end()
        {
            None
        } else {
            Some(self.logical_expr()?)
        };

        Ok(Stmt {
            kind: StmtKind::Return(value),
            span,
        })
    }

    // Handles both `if` and `elif`: the keyword has already been checked by the
    // caller, and an elif chain becomes a nested If in the else branch.
    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.advance(); // consume if/elif

        // Parenthesized or bare condition: '(' is ordinary grouping
        let condition = self.logical_expr()?;
        let then_branch = Box::new(self.block()?);

        let else_branch = if self.check(TokenType::Elif) {
            Some(Box::new(self.if_stmt()?))
        } else if self.check(TokenType::Else) {
            self.advance(); // consume else
            Some(Box::new(self.block()?))
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        })
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.advance(); // consume while

        let condition = self.logical_expr()?;
        let body = Box::new(self.block()?);

        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            span,
        })
    }

    fn print_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.advance(); // consume print

        // `print x;` and `print(x);` both work: parens are grouping
        let expr = self.logical_expr()?;

        Ok(Stmt {
            kind: StmtKind::Print(expr),
            span,
        })
    }

    fn block(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.consume(TokenType::LeftBrace, "'{'")?;

        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            statements.push(self.terminated_statement(TokenType::RightBrace)?);
        }

        self.consume(TokenType::RightBrace, "'}'")?;

        Ok(Stmt {
            kind: StmtKind::Block(statements),
            span,
        })
    }

    fn logical_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.comparison()?;

        while self.match_any(&[TokenType::And, TokenType::Or]) {
            let span = self.previous().span;
            let operator = match self.previous().token_type {
                TokenType::And => LogicOp::And,
                _ => LogicOp::Or,
            };
            let right = self.comparison()?;
            left = Expr {
                kind: ExprKind::Logical {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                span,
            };
        }

        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.expr()?;

        while self.match_any(&[
            TokenType::Equal,
            TokenType::NotEqual,
            TokenType::Less,
            TokenType::LessEqual,
            TokenType::Greater,
            TokenType::GreaterEqual,
        ]) {
            let span = self.previous().span;
            let operator = match self.previous().token_type {
                TokenType::Equal => CmpOp::Eq,
                TokenType::NotEqual => CmpOp::Ne,
                TokenType::Less => CmpOp::Lt,
                TokenType::LessEqual => CmpOp::Le,
                TokenType::Greater => CmpOp::Gt,
                _ => CmpOp::Ge,
            };
            let right = self.expr()?;
            left = Expr {
                kind: ExprKind::Compare {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                span,
            };
        }

        Ok(left)
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;

        while self.match_any(&[TokenType::Plus, TokenType::Minus]) {
            let span = self.previous().span;
            let operator = match self.previous().token_type {
                TokenType::Plus => BinOp::Add,
                _ => BinOp::Sub,
            };
            let right = self.term()?;
            left = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                span,
            };
        }

        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;

        while self.match_any(&[TokenType::Star, TokenType::Slash]) {
            let span = self.previous().span;
            let operator = match self.previous().token_type {
                TokenType::Star => BinOp::Mul,
                _ => BinOp::Div,
            };
            let right = self.unary()?;
            left = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                span,
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_any(&[TokenType::Not, TokenType::Minus]) {
            let span = self.previous().span;
            let operator = match self.previous().token_type {
                TokenType::Not => UnaryOp::Not,
                _ => UnaryOp::Neg,
            };
            let operand = self.unary()?; // recursive for chained unary: --x
            Ok(Expr {
                kind: ExprKind::Unary {
                    operator,
                    operand: Box::new(operand),
                },
                span,
            })
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let span = token.span;

        match &token.token_type {
            TokenType::Int(n) => {
                let value = *n;
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Int(value),
                    span,
                })
            }
            TokenType::Float(x) => {
                let value = *x;
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Float(value),
                    span,
                })
            }
            TokenType::String(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str(value),
                    span,
                })
            }
            TokenType::True => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(true),
                    span,
                })
            }
            TokenType::False => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(false),
                    span,
                })
            }
            TokenType::Identifier => {
                let name = token.lexeme.clone();
                self.advance();

                // One token of lookahead: '(' makes this a call
                if self.check(TokenType::LeftParen) {
                    self.advance();
                    let mut arguments = Vec::new();

                    if !self.check(TokenType::RightParen) {
                        arguments.push(self.logical_expr()?);
                        while self.check(TokenType::Comma) {
                            self.advance();
                            arguments.push(self.logical_expr()?);
                        }
                    }
                    self.consume(TokenType::RightParen, "')'")?;

                    Ok(Expr {
                        kind: ExprKind::Call { name, arguments },
                        span,
                    })
                } else {
                    Ok(Expr {
                        kind: ExprKind::Var(name),
                        span,
                    })
                }
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.logical_expr()?;
                self.consume(TokenType::RightParen, "')'")?;
                Ok(expr)
            }
            _ => Err(ParseError {
                span,
                message: format!("Unexpected token: {:?}", token.token_type),
            }),
        }
    }
}
