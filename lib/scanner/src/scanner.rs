use std::fmt::Display;

use cursor::{Cursor, Line};
use errors::LoxError;
use itertools::{Either, Itertools};

pub mod token;
pub use token::{Literal, Token, TokenData, TokenKind};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("unexpected character {0}")]
    UnexpectedCharacter(char),
    #[error("unterminated string")]
    UnterminatedString,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {error}")]
pub struct ScanError {
    pub error: ScanErrorType,
    pub line: Line,
}

impl From<ScanError> for LoxError {
    fn from(e: ScanError) -> Self {
        LoxError::new(e.line, format!("Error: {}", e.error))
    }
}

#[derive(thiserror::Error, Debug, Default, PartialEq)]
pub struct ScanErrors(pub Vec<ScanError>);

impl ScanErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ScanErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

/// Scans the whole source, collecting every token and every lexical error in one pass.
/// The token list always ends with `Eof`, even if errors occurred.
pub fn scan(source: &str) -> (Vec<Token<'_>>, ScanErrors) {
    let (tokens, errors) = TokenStream::new(source).partition_map(|t| match t {
        Ok(token) => Either::Left(token),
        Err(error) => Either::Right(error),
    });
    (tokens, ScanErrors(errors))
}

#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    done: bool,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        let cursor = Cursor::new(source);
        Self { start: cursor.clone(), current: cursor, done: false }
    }

    fn make_token(&self, data: TokenData<'a>) -> Token<'a> {
        Token::new(data, self.start.slice_until(&self.current), self.current.line())
    }

    fn error(&self, error: ScanErrorType) -> ScanError {
        ScanError { error, line: self.current.line() }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.current.peek() {
                Some(' ' | '\r' | '\t' | '\n') => {
                    self.current.next();
                }
                Some('/') if self.current.peek_next() == Some('/') => {
                    // The newline is left for the next iteration so that it bumps the line.
                    self.current.advance_while(|c| c != '\n');
                }
                _ => return,
            }
        }
    }

    fn either(
        &mut self,
        expected: char,
        matched: TokenData<'a>,
        otherwise: TokenData<'a>,
    ) -> Token<'a> {
        if self.current.advance_if(expected) {
            self.make_token(matched)
        } else {
            self.make_token(otherwise)
        }
    }

    fn string(&mut self) -> Result<Token<'a>, ScanError> {
        self.current.advance_while(|c| c != '"');
        if !self.current.advance_if('"') {
            return Err(self.error(ScanErrorType::UnterminatedString));
        }

        let lexeme = self.start.slice_until(&self.current);
        Ok(self.make_token(Str(&lexeme[1..lexeme.len() - 1])))
    }

    fn number(&mut self) -> Token<'a> {
        self.current.advance_while(|c| c.is_ascii_digit());

        if self.current.peek() == Some('.')
            && self.current.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.current.next();
            self.current.advance_while(|c| c.is_ascii_digit());
        }

        let value = self
            .start
            .slice_until(&self.current)
            .parse()
            .expect("digits with an optional fraction always form a valid f64");
        self.make_token(Number(value))
    }

    fn identifier(&mut self) -> Token<'a> {
        self.current.advance_while(is_alphanumeric);
        let data = TokenData::keyword(self.start.slice_until(&self.current)).unwrap_or(Identifier);
        self.make_token(data)
    }

    fn scan_token(&mut self, c: char) -> Result<Token<'a>, ScanError> {
        Ok(match c {
            '(' => self.make_token(LeftParen),
            ')' => self.make_token(RightParen),
            '{' => self.make_token(LeftBrace),
            '}' => self.make_token(RightBrace),
            ',' => self.make_token(Comma),
            '.' => self.make_token(Dot),
            '-' => self.make_token(Minus),
            '+' => self.make_token(Plus),
            ';' => self.make_token(Semicolon),
            '*' => self.make_token(Star),
            '/' => self.make_token(Slash),

            '!' => self.either('=', BangEqual, Bang),
            '=' => self.either('=', EqualEqual, Equal),
            '<' => self.either('=', LessEqual, Less),
            '>' => self.either('=', GreaterEqual, Greater),

            '"' => return self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_alpha(c) => self.identifier(),

            c => return Err(self.error(ScanErrorType::UnexpectedCharacter(c))),
        })
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.skip_whitespace();
        self.start = self.current.clone();

        match self.current.next() {
            Some(c) => Some(self.scan_token(c)),
            None => {
                self.done = true;
                Some(Ok(self.make_token(Eof)))
            }
        }
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "unexpected scan errors: {errors}");
        tokens.iter().map(Token::ty).collect()
    }

    #[test]
    fn single_char_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("=(){},.-+;*/!<>"),
            vec![
                Equal, LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus,
                Semicolon, Star, Slash, Bang, Less, Greater, Eof
            ]
        );
    }

    #[test]
    fn two_char_tokens() {
        let (tokens, _) = scan("! != = == < <= > >=");
        assert_eq!(
            tokens.iter().map(|t| (t.ty(), t.lexeme())).collect::<Vec<_>>(),
            vec![
                (TokenKind::Bang, "!"),
                (TokenKind::BangEqual, "!="),
                (TokenKind::Equal, "="),
                (TokenKind::EqualEqual, "=="),
                (TokenKind::Less, "<"),
                (TokenKind::LessEqual, "<="),
                (TokenKind::Greater, ">"),
                (TokenKind::GreaterEqual, ">="),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn string_literals() {
        let (tokens, errors) = scan("\"hello world\"");
        assert!(errors.is_empty());
        assert_eq!(
            tokens,
            vec![
                Token::new(Str("hello world"), "\"hello world\"", Line(1)),
                Token::eof(Line(1)),
            ]
        );
        assert_eq!(tokens[0].literal(), Some(Literal::Str("hello world")));

        // A string spanning lines is reported at the line where it ends.
        let (tokens, errors) = scan("\"a\nb\" c");
        assert!(errors.is_empty());
        assert_eq!(tokens[0], Token::new(Str("a\nb"), "\"a\nb\"", Line(2)));
        assert_eq!(tokens[1], Token::new(Identifier, "c", Line(2)));

        // No escape sequences.
        let (tokens, _) = scan(r#""a\n""#);
        assert_eq!(tokens[0].data, Str(r"a\n"));
    }

    #[test]
    fn unterminated_string() {
        let (tokens, errors) = scan("\"");
        assert_eq!(
            errors,
            ScanErrors(vec![ScanError {
                error: ScanErrorType::UnterminatedString,
                line: Line(1)
            }])
        );
        assert_eq!(tokens, vec![Token::eof(Line(1))]);

        let (tokens, errors) = scan("1 \"hello\nworld");
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].line, Line(2));
        assert_eq!(
            tokens.iter().map(Token::ty).collect::<Vec<_>>(),
            vec![TokenKind::Number, TokenKind::Eof]
        );
        assert_eq!(errors.to_string(), "[line 2] Error: unterminated string");
    }

    #[test]
    fn numbers() {
        let (tokens, _) = scan("123 4.5 6. .7");
        assert_eq!(
            tokens.iter().map(|t| t.data.clone()).collect::<Vec<_>>(),
            vec![Number(123.0), Number(4.5), Number(6.0), Dot, Dot, Number(7.0), Eof]
        );
        assert_eq!(tokens[1].lexeme(), "4.5");
        assert_eq!(tokens[1].literal(), Some(Literal::Number(4.5)));
    }

    #[test]
    fn identifiers_and_keywords() {
        use TokenKind::*;
        assert_eq!(
            kinds("and class else false for fun if nil or print return super this true var while"),
            vec![
                And, Class, Else, False, For, Fun, If, Nil, Or, Print, Return, Super, This, True,
                Var, While, Eof
            ]
        );

        let (tokens, _) = scan("orchid _under score9 var_ 9lives");
        assert_eq!(
            tokens.iter().map(|t| (t.ty(), t.lexeme())).collect::<Vec<_>>(),
            vec![
                (Identifier, "orchid"),
                (Identifier, "_under"),
                (Identifier, "score9"),
                (Identifier, "var_"),
                (Number, "9"),
                (Identifier, "lives"),
                (Eof, ""),
            ]
        );

        let (tokens, _) = scan("true false nil");
        assert_eq!(
            tokens.iter().map(Token::literal).collect::<Vec<_>>(),
            vec![Some(Literal::Bool(true)), Some(Literal::Bool(false)), Some(Literal::Nil), None]
        );
    }

    #[test]
    fn comments() {
        let (tokens, _) = scan("a // comment\nb // trailing");
        assert_eq!(
            tokens,
            vec![
                Token::new(Identifier, "a", Line(1)),
                Token::new(Identifier, "b", Line(2)),
                Token::eof(Line(2)),
            ]
        );
    }

    #[test]
    fn unexpected_characters_do_not_stop_scanning() {
        let (tokens, errors) = scan("1 @ 2\n# 3");
        assert_eq!(
            errors,
            ScanErrors(vec![
                ScanError { error: ScanErrorType::UnexpectedCharacter('@'), line: Line(1) },
                ScanError { error: ScanErrorType::UnexpectedCharacter('#'), line: Line(2) },
            ])
        );
        assert_eq!(
            tokens.iter().map(|t| (t.data.clone(), t.line())).collect::<Vec<_>>(),
            vec![
                (Number(1.0), Line(1)),
                (Number(2.0), Line(1)),
                (Number(3.0), Line(2)),
                (Eof, Line(2)),
            ]
        );
        assert_eq!(
            LoxError::from(errors.0[0].clone()).to_string(),
            "[line 1] Error: unexpected character @"
        );
    }

    #[test]
    fn eof_is_emitted_once_at_last_line() {
        let mut stream = TokenStream::new("\n\n");
        assert_eq!(stream.next(), Some(Ok(Token::eof(Line(3)))));
        assert_eq!(stream.next(), None);
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn scans_large_input() {
        let source = "1 ".repeat(200_000);
        let (tokens, errors) = scan(&source);
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 200_001);
        assert_eq!(tokens.last(), Some(&Token::eof(Line(1))));
    }
}
