use std::fmt::Display;

use cursor::Line;

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub data: TokenData<'a>,
    pub lexeme: &'a str,
    pub line: Line,
}

impl<'a> Token<'a> {
    pub fn new(data: TokenData<'a>, lexeme: &'a str, line: Line) -> Token<'a> {
        Self { data, lexeme, line }
    }

    pub fn eof(line: Line) -> Token<'a> {
        Self::new(TokenData::Eof, "", line)
    }

    pub fn ty(&self) -> TokenKind {
        (&self.data).into()
    }

    pub fn lexeme(&self) -> &'a str {
        self.lexeme
    }

    pub fn line(&self) -> Line {
        self.line
    }

    /// The value this token denotes, if it is a literal.
    pub fn literal(&self) -> Option<Literal<'a>> {
        match self.data {
            TokenData::Number(n) => Some(Literal::Number(n)),
            TokenData::Str(s) => Some(Literal::Str(s)),
            TokenData::True => Some(Literal::Bool(true)),
            TokenData::False => Some(Literal::Bool(false)),
            TokenData::Nil => Some(Literal::Nil),
            _ => None,
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Number(f64),
    Str(&'a str),
    Bool(bool),
    Nil,
}

impl Display for Literal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Str(s) => write!(f, "\"{s}\""),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Nil => write!(f, "nil"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(TokenKind))]
pub enum TokenData<'a> {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    Str(&'a str),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}

impl TokenData<'_> {
    pub fn keyword(ident: &str) -> Option<TokenData<'static>> {
        use TokenData::*;
        Some(match ident {
            "and" => And,
            "class" => Class,
            "else" => Else,
            "false" => False,
            "for" => For,
            "fun" => Fun,
            "if" => If,
            "nil" => Nil,
            "or" => Or,
            "print" => Print,
            "return" => Return,
            "super" => Super,
            "this" => This,
            "true" => True,
            "var" => Var,
            "while" => While,
            _ => return None,
        })
    }
}
