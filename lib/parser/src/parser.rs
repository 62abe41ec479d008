mod expr;
mod stmt;

use std::fmt::Display;

use cursor::Line;
use errors::LoxError;
use itertools::Itertools;

pub use expr::Expr;
pub use stmt::Stmt;

use scanner::{Token, TokenKind};
use TokenKind::*;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub line: Line,
    /// The offending lexeme, quoted, or `end` if input ran out.
    pub at: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {}] Error at {}: {}", self.line, self.at, self.error)
    }
}

impl From<ParseError> for LoxError {
    fn from(e: ParseError) -> Self {
        LoxError::new(e.line, format!("Error at {}: {}", e.at, e.error))
    }
}

#[derive(thiserror::Error, Debug, Default, PartialEq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    #[error("expect expression")]
    ExpectedExpression,
    #[error("expect closing parenthesis")]
    ExpectedClosingParen,
    #[error("expect ';' after {0}")]
    ExpectedSemicolon(&'static str),
    #[error("expect variable name")]
    ExpectedVariableName,
    #[error("expect end of expression")]
    ExpectedEnd,
}

impl ParseErrorType {
    fn at(self, token: &Token) -> ParseError {
        ParseError {
            error: self,
            line: token.line(),
            at: match token.ty() {
                Eof => "end".to_string(),
                _ => format!("'{}'", token.lexeme()),
            },
        }
    }
}

#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if tokens.last().map(Token::ty) != Some(Eof) {
            let line = tokens.last().map_or(Line(1), Token::line);
            tokens.push(Token::eof(line));
        }
        Self { tokens, current: 0 }
    }

    /// program -> declaration* EOF
    ///
    /// Gives up at the first syntax error.
    pub fn parse(mut self) -> Result<Vec<Stmt<'a>>> {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            stmts.push(self.declaration()?);
        }
        Ok(stmts)
    }

    /// Like [`Parser::parse`], but skips to the next statement boundary after an error
    /// so that every syntax error in the program is reported.
    pub fn parse_all(mut self) -> std::result::Result<Vec<Stmt<'a>>, ParseErrors> {
        let mut errors = ParseErrors::default();
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    log::debug!("Synchronizing after: {e}");
                    errors.0.push(e);
                    self.synchronize();
                }
            }
        }

        if errors.0.is_empty() {
            Ok(stmts)
        } else {
            Err(errors)
        }
    }

    /// Parses a single expression spanning all tokens.
    pub fn parse_expression(mut self) -> Result<Expr<'a>> {
        let expr = self.expression()?;
        self.consume_or_error(Eof, ParseErrorType::ExpectedEnd)?;
        Ok(expr)
    }

    fn declaration(&mut self) -> Result<Stmt<'a>> {
        let stmt = if self.consume_any(&[Var]).is_some() {
            self.var_declaration()?
        } else {
            self.statement()?
        };
        log::trace!("Parsed {stmt}");
        Ok(stmt)
    }

    fn var_declaration(&mut self) -> Result<Stmt<'a>> {
        let name = self.consume_or_error(Identifier, ParseErrorType::ExpectedVariableName)?;

        let initializer = match self.consume_any(&[Equal]) {
            Some(_) => Some(self.expression()?),
            None => None,
        };

        self.consume_or_error(
            Semicolon,
            ParseErrorType::ExpectedSemicolon("variable declaration"),
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt<'a>> {
        if let Some(keyword) = self.consume_any(&[Print]) {
            return self.print_statement(keyword);
        }

        self.expression_statement()
    }

    fn print_statement(&mut self, keyword: Token<'a>) -> Result<Stmt<'a>> {
        let expr = self.expression()?;

        self.consume_or_error(Semicolon, ParseErrorType::ExpectedSemicolon("value"))?;

        Ok(Stmt::Print { keyword, expr })
    }

    fn expression_statement(&mut self) -> Result<Stmt<'a>> {
        let value = self.expression()?;

        self.consume_or_error(Semicolon, ParseErrorType::ExpectedSemicolon("expression"))?;

        Ok(Stmt::Expression(value))
    }

    fn expression(&mut self) -> Result<Expr<'a>> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.comparison()?;

        while let Some(operator) = self.consume_any(&[BangEqual, EqualEqual]) {
            let right = Box::new(self.comparison()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.term()?;

        while let Some(operator) = self.consume_any(&[Greater, GreaterEqual, Less, LessEqual]) {
            let right = Box::new(self.term()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.factor()?;

        while let Some(operator) = self.consume_any(&[Minus, Plus]) {
            let right = Box::new(self.factor()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.unary()?;

        while let Some(operator) = self.consume_any(&[Slash, Star]) {
            let right = Box::new(self.unary()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr<'a>> {
        if let Some(operator) = self.consume_any(&[Bang, Minus]) {
            let right = Box::new(self.unary()?);
            return Ok(Expr::Unary { operator, right });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr<'a>> {
        let token = self.peek().clone();

        if let Some(literal) = token.literal() {
            self.advance();
            return Ok(Expr::Literal(literal));
        }

        match token.ty() {
            Identifier => {
                self.advance();
                Ok(Expr::Variable(token))
            }
            LeftParen => {
                self.advance();
                let expr = self.expression()?;

                self.consume_or_error(RightParen, ParseErrorType::ExpectedClosingParen)?;

                Ok(Expr::Grouping(Box::new(expr)))
            }
            _ => Err(ParseErrorType::ExpectedExpression.at(&token)),
        }
    }

    /// Discards tokens until just past a `;` or just before a token that starts a statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().ty() == Semicolon {
                return;
            }

            match self.peek().ty() {
                Class | Fun | For | If | Print | Return | Var | While => return,
                _ => {}
            }

            self.advance();
        }
    }
}

// Helpers
impl<'a> Parser<'a> {
    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token<'a> {
        &self.tokens[self.current - 1]
    }

    /// Returns the current token and moves past it, unless it is `Eof`.
    fn advance(&mut self) -> Token<'a> {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Consumes the current token if it has one of the given kinds.
    fn consume_any(&mut self, kinds: &[TokenKind]) -> Option<Token<'a>> {
        kinds.contains(&self.peek().ty()).then(|| self.advance())
    }

    fn consume_or_error(&mut self, kind: TokenKind, error: ParseErrorType) -> Result<Token<'a>> {
        if self.peek().ty() == kind {
            Ok(self.advance())
        } else {
            Err(error.at(self.peek()))
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().ty() == Eof
    }
}
