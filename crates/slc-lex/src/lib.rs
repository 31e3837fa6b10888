//! The streaming lexer.
//!
//! `Lexer` turns a single source buffer into a stream of [`Token`]s,
//! tracking source positions as it goes and reporting lexical errors
//! through a shared [`Reporter`] rather than ever panicking. It never
//! looks more than two characters ahead (see [`cursor::Cursor`]) and
//! produces exactly one terminal `Eof` token, however malformed the
//! input.

pub mod cursor;

use cursor::Cursor;
use slc_util::diagnostic::{Diagnostic, ErrorKind};
use slc_util::{Pool, Reporter, SourcePosition, Symbol};

/// The fixed set of token kinds the lexical surface defines.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Keywords. `Func` covers both spellings `func` and `function`.
    Func,
    Struct,
    Var,
    If,
    Else,
    While,
    For,
    Return,
    True,
    False,

    /// An identifier, including otherwise-meaningful words like `int` or
    /// `print` that are not reserved at the lexical level.
    Identifier,
    Int(i64),
    Float(f64),
    Str(Symbol),

    // Arithmetic.
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison.
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical.
    AndAnd,
    OrOr,
    Bang,

    // Assignment.
    Eq,
    Arrow,

    // Delimiters.
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,

    Eof,
    /// A token that failed to scan; `lexeme` carries the diagnostic text
    /// that was also reported to the [`Reporter`].
    Error,
}

/// `(kind, lexeme, position)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: SourcePosition,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// Scans a source buffer into a stream of [`Token`]s on demand.
pub struct Lexer<'p> {
    pool: &'p Pool,
    file: Symbol,
    cursor: Cursor,
    peeked: Option<Token>,
}

impl<'p> Lexer<'p> {
    /// Creates a lexer over `source`, ready to scan as `filename`.
    pub fn new(pool: &'p Pool, filename: &str, source: impl Into<String>) -> Self {
        let source: String = source.into();
        Lexer {
            pool,
            file: pool.intern(filename),
            cursor: Cursor::new(source),
            peeked: None,
        }
    }

    /// Reconfigures the lexer for a new file, discarding any lookahead.
    /// Lets one `Lexer` be reused across `compile()` calls.
    pub fn set_input(&mut self, filename: &str, source: impl Into<String>) {
        let source: String = source.into();
        self.file = self.pool.intern(filename);
        self.cursor = Cursor::new(source);
        self.peeked = None;
    }

    /// The memory pool backing this lexer's string interning, shared so
    /// that downstream phases (the parser's identifier/field names) can
    /// intern through the same table rather than opening a second one.
    pub fn pool(&self) -> &'p Pool {
        self.pool
    }

    /// The position the cursor currently sits at (the start of whatever
    /// would be scanned next, ignoring any pending lookahead token).
    pub fn current_position(&self) -> SourcePosition {
        SourcePosition {
            file: self.file,
            line: self.cursor.line(),
            column: self.cursor.column(),
            offset: self.cursor.offset(),
        }
    }

    /// Returns the next token without consuming it. Calling `peek`
    /// repeatedly returns the same token until `next_token` is called.
    pub fn peek(&mut self, reporter: &mut Reporter) -> Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan_token(reporter));
        }
        self.peeked.clone().unwrap()
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self, reporter: &mut Reporter) -> Token {
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.scan_token(reporter)
    }

    fn report(&self, reporter: &mut Reporter, start: SourcePosition, message: impl Into<String>) {
        let range = slc_util::SourceRange::point(start);
        reporter.report(Diagnostic::error(ErrorKind::Lexical, message, range));
    }

    fn scan_token(&mut self, reporter: &mut Reporter) -> Token {
        self.skip_trivia();

        let start = self.current_position();
        if self.cursor.is_at_end() {
            return Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                position: start,
            };
        }

        let c = self.cursor.peek();
        match c {
            '(' => self.simple(start, TokenKind::LParen),
            ')' => self.simple(start, TokenKind::RParen),
            '{' => self.simple(start, TokenKind::LBrace),
            '}' => self.simple(start, TokenKind::RBrace),
            '[' => self.simple(start, TokenKind::LBracket),
            ']' => self.simple(start, TokenKind::RBracket),
            ',' => self.simple(start, TokenKind::Comma),
            ';' => self.simple(start, TokenKind::Semicolon),
            ':' => self.simple(start, TokenKind::Colon),
            '+' => self.simple(start, TokenKind::Plus),
            '*' => self.simple(start, TokenKind::Star),
            '/' => self.simple(start, TokenKind::Slash),
            '%' => self.simple(start, TokenKind::Percent),
            '.' => self.lex_dot(start),
            '-' => self.lex_two(start, '>', TokenKind::Arrow, TokenKind::Minus),
            '=' => self.lex_two(start, '=', TokenKind::EqEq, TokenKind::Eq),
            '!' => self.lex_two(start, '=', TokenKind::BangEq, TokenKind::Bang),
            '<' => self.lex_two(start, '=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.lex_two(start, '=', TokenKind::GtEq, TokenKind::Gt),
            '&' => self.lex_doubled(start, '&', TokenKind::AndAnd),
            '|' => self.lex_doubled(start, '|', TokenKind::OrOr),
            '"' => self.lex_string(start, reporter),
            c if c.is_ascii_digit() => self.lex_number(start, reporter),
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier(start),
            c => {
                self.cursor.advance();
                self.report(reporter, start, format!("unexpected character '{c}'"));
                Token {
                    kind: TokenKind::Error,
                    lexeme: c.to_string(),
                    position: start,
                }
            }
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek_second() == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.peek() != '\n' {
                        self.cursor.advance();
                    }
                }
                '/' if self.cursor.peek_second() == '*' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    while !self.cursor.is_at_end()
                        && !(self.cursor.peek() == '*' && self.cursor.peek_second() == '/')
                    {
                        self.cursor.advance();
                    }
                    if !self.cursor.is_at_end() {
                        self.cursor.advance();
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn simple(&mut self, start: SourcePosition, kind: TokenKind) -> Token {
        let c = self.cursor.advance();
        Token {
            kind,
            lexeme: c.to_string(),
            position: start,
        }
    }

    /// Scans either a one- or two-character operator: if the second
    /// character matches `second`, the two-character token is produced,
    /// otherwise the one-character fallback.
    fn lex_two(
        &mut self,
        start: SourcePosition,
        second: char,
        two_char: TokenKind,
        one_char: TokenKind,
    ) -> Token {
        let first = self.cursor.advance();
        if self.cursor.eat(second) {
            Token {
                kind: two_char,
                lexeme: format!("{first}{second}"),
                position: start,
            }
        } else {
            Token {
                kind: one_char,
                lexeme: first.to_string(),
                position: start,
            }
        }
    }

    /// Scans `&&` / `||`: doubled operators with no one-character form.
    fn lex_doubled(&mut self, start: SourcePosition, c: char, kind: TokenKind) -> Token {
        let first = self.cursor.advance();
        self.cursor.eat(c);
        Token {
            kind,
            lexeme: format!("{first}{c}"),
            position: start,
        }
    }

    /// `.` alone is `Dot`; there is no multi-character form in this
    /// language, but a leading-dot float like `.5` is not supported (the
    /// grammar always requires digits before the dot), so a bare `.`
    /// always becomes `Dot`.
    fn lex_dot(&mut self, start: SourcePosition) -> Token {
        self.cursor.advance();
        Token {
            kind: TokenKind::Dot,
            lexeme: ".".to_string(),
            position: start,
        }
    }

    fn lex_identifier(&mut self, start: SourcePosition) -> Token {
        let mut lexeme = String::new();
        while self.cursor.peek().is_ascii_alphanumeric() || self.cursor.peek() == '_' {
            lexeme.push(self.cursor.advance());
        }
        let kind = match lexeme.as_str() {
            "func" | "function" => TokenKind::Func,
            "struct" => TokenKind::Struct,
            "var" => TokenKind::Var,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier,
        };
        Token {
            kind,
            lexeme,
            position: start,
        }
    }

    fn lex_number(&mut self, start: SourcePosition, reporter: &mut Reporter) -> Token {
        let mut lexeme = String::new();
        while self.cursor.peek().is_ascii_digit() {
            lexeme.push(self.cursor.advance());
        }

        // A `.` only starts a float if followed by at least one digit;
        // otherwise it's tokenized separately and the integer stands.
        if self.cursor.peek() == '.' && self.cursor.peek_second().is_ascii_digit() {
            lexeme.push(self.cursor.advance()); // '.'
            while self.cursor.peek().is_ascii_digit() {
                lexeme.push(self.cursor.advance());
            }
            return match lexeme.parse::<f64>() {
                Ok(value) => Token {
                    kind: TokenKind::Float(value),
                    lexeme,
                    position: start,
                },
                Err(_) => {
                    self.report(reporter, start, format!("invalid float: {lexeme}"));
                    Token {
                        kind: TokenKind::Error,
                        lexeme,
                        position: start,
                    }
                }
            };
        }

        match lexeme.parse::<i64>() {
            Ok(value) => Token {
                kind: TokenKind::Int(value),
                lexeme,
                position: start,
            },
            Err(_) => {
                self.report(reporter, start, format!("invalid integer: {lexeme}"));
                Token {
                    kind: TokenKind::Error,
                    lexeme,
                    position: start,
                }
            }
        }
    }

    fn lex_string(&mut self, start: SourcePosition, reporter: &mut Reporter) -> Token {
        self.cursor.advance(); // opening quote
        let mut raw = String::from("\"");
        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() {
                self.report(reporter, start, "unterminated string literal");
                return Token {
                    kind: TokenKind::Error,
                    lexeme: raw,
                    position: start,
                };
            }
            let c = self.cursor.advance();
            raw.push(c);
            if c == '"' {
                break;
            }
            if c == '\\' {
                let escaped = self.cursor.advance();
                raw.push(escaped);
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    other => other,
                });
            } else {
                value.push(c);
            }
        }
        Token {
            kind: TokenKind::Str(self.pool.intern(&value)),
            lexeme: raw,
            position: start,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::tests::*;
    use proptest::prelude::*;

    proptest! {
        /// Lexing never panics and always terminates in an `Eof` token,
        /// for arbitrary byte-ish input.
        #[test]
        fn lexing_is_total(source in "\\PC*") {
            let (toks, _reporter) = tokens(&source);
            prop_assert!(toks.last().map(|t| t.is_eof()).unwrap_or(false));
        }

        /// Token ranges never go backwards: each token's start position is
        /// at or after the previous token's start.
        #[test]
        fn token_positions_are_monotonic(source in "[ -~\\n\\t]{0,200}") {
            let (toks, _reporter) = tokens(&source);
            for pair in toks.windows(2) {
                prop_assert!(pair[1].position.offset >= pair[0].position.offset);
            }
        }
    }
}
