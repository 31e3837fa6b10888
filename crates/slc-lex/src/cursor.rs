//! Character cursor for traversing a source buffer.
//!
//! `Cursor` tracks byte offset, line, and column over a reference-counted
//! source buffer, handling UTF-8 decoding and the newline-resets-column
//! rule. It has no knowledge of tokens; `Lexer` builds scanning on top of
//! it. Owning an `Rc<str>` rather than borrowing a `&str` lets a `Lexer`
//! hold both the buffer and a cursor into it without a self-referential
//! struct.
use std::rc::Rc;

/// A two-character-lookahead cursor over a source buffer.
pub struct Cursor {
    source: Rc<str>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    pub fn new(source: impl Into<Rc<str>>) -> Self {
        Self {
            source: source.into(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// The character under the cursor, or `'\0'` at end of input.
    pub fn peek(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    /// The character one past the one under the cursor, or `'\0'`.
    pub fn peek_second(&self) -> char {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Consumes and returns the character under the cursor, advancing
    /// line/column bookkeeping. A no-op (returns `'\0'`) at end of input.
    pub fn advance(&mut self) -> char {
        let Some(c) = self.source[self.pos..].chars().next() else {
            return '\0';
        };
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    /// Consumes the current character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_through_ascii() {
        let mut c = Cursor::new("ab");
        assert_eq!(c.advance(), 'a');
        assert_eq!(c.advance(), 'b');
        assert!(c.is_at_end());
    }

    #[test]
    fn newline_resets_column_and_bumps_line() {
        let mut c = Cursor::new("a\nb");
        c.advance();
        assert_eq!(c.line(), 1);
        c.advance();
        assert_eq!(c.line(), 2);
        assert_eq!(c.column(), 1);
    }

    #[test]
    fn handles_multibyte_utf8() {
        let mut c = Cursor::new("é!");
        let ch = c.advance();
        assert_eq!(ch, 'é');
        assert_eq!(c.offset(), 'é'.len_utf8());
    }

    #[test]
    fn peek_second_looks_two_ahead() {
        let c = Cursor::new("ab");
        assert_eq!(c.peek(), 'a');
        assert_eq!(c.peek_second(), 'b');
    }
}
