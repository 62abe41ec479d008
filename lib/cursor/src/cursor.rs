use std::{fmt::Formatter, str::Chars};

#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    chars: Chars<'a>,
    line: Line,
}

impl<'a> std::fmt::Debug for Cursor<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The full source is usually too verbose, only show it with {:#?}
        if f.alternate() {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("offset", &self.offset())
                .field("source", &self.source)
                .finish()
        } else {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("offset", &self.offset())
                .finish()
        }
    }
}

impl<'a> PartialEq for Cursor<'a> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.source, other.source)
            && std::ptr::eq(self.chars.as_str(), other.chars.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub struct Line(pub usize);

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, chars: source.chars(), line: Line(1) }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    /// Byte offset of the next character into the source.
    pub fn offset(&self) -> usize {
        self.source.len() - self.chars.as_str().len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    /// Consumes the next character only if it is `expected`.
    pub fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Consumes characters as long as `pred` holds for the next one.
    pub fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.next();
        }
    }

    /// The source text between `self` and the (later) cursor `end`.
    pub fn slice_until(&self, end: &Cursor<'a>) -> &'a str {
        assert!(std::ptr::eq(self.source, end.source), "cursors must share one source");
        &self.source[self.offset()..end.offset()]
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line.0 += 1;
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_until() {
        let mut cursor = Cursor::new("ab\ncd\n\n");

        cursor.next(); // 'a'

        let start = cursor.clone();

        cursor.next(); // 'b'
        cursor.next(); // '\n'
        cursor.next(); // 'c'

        assert_eq!(start.slice_until(&cursor), "b\nc");
        assert_eq!(start.slice_until(&start), "");
    }

    #[test]
    fn lines_advance_on_newline() {
        let mut cursor = Cursor::new("a\n\"b\nc\"\n");
        assert_eq!(cursor.line(), Line(1));

        cursor.advance_while(|c| c != '"');
        assert_eq!(cursor.line(), Line(2));

        cursor.next(); // '"'
        cursor.advance_while(|c| c != '"');
        assert_eq!(cursor.line(), Line(3));

        cursor.next(); // '"'
        cursor.next(); // '\n'
        assert_eq!(cursor.line(), Line(4));
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.line(), Line(4));
    }

    #[test]
    fn lookahead() {
        let mut cursor = Cursor::new("!=");
        assert_eq!(cursor.peek(), Some('!'));
        assert_eq!(cursor.peek_next(), Some('='));

        assert!(!cursor.advance_if('='));
        assert!(cursor.advance_if('!'));
        assert_eq!(cursor.offset(), 1);
        assert!(cursor.advance_if('='));
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.peek_next(), None);
        assert!(!cursor.advance_if('='));

        let cursor = Cursor::new("");
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.line(), Line(1));
    }

    #[test]
    fn multibyte_offsets() {
        let mut cursor = Cursor::new("é1");
        let start = cursor.clone();
        cursor.next();
        assert_eq!(cursor.offset(), 2);
        assert_eq!(start.slice_until(&cursor), "é");
    }

    #[test]
    fn equality_is_by_source_identity_and_position() {
        let source = String::from("ab");
        let copy = source.clone();

        let mut cursor = Cursor::new(&source);
        assert_eq!(cursor, Cursor::new(&source));
        assert_ne!(Cursor::new(&source), Cursor::new(&copy));

        cursor.next();
        assert_ne!(cursor, Cursor::new(&source));
    }

    #[test]
    #[should_panic(expected = "cursors must share one source")]
    fn slice_until_rejects_foreign_cursor() {
        let source = String::from("ab");
        let copy = source.clone();
        Cursor::new(&source).slice_until(&Cursor::new(&copy));
    }
}
