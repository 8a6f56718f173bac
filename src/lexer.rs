use std::{iter::Peekable, str::Chars};

use crate::{
    token::{Span, Token, TokenKind, KEYWORDS},
    util::BreakableIteratorExt,
};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 1_024;

/// A convenience function that scans the whole input (up to, and including,
/// the end-of-input token) into a new buffer.
pub fn lex_in_new(src: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    tokens.extend(Lexer::new(src).up_to(Token::is_eof));
    tokens
}

/// The Titan lexer.
///
/// Tokens are pulled one at a time through [`Lexer::next_token`]. Once the
/// input is exhausted, every further call yields an end-of-input token.
pub struct Lexer<'src> {
    src: &'src str,
    iter: Peekable<Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    line: u32,
    current_line: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar(char),
    /// A single `&` or `|`, which are only valid when doubled.
    LoneOperator(char),
}

impl<'src> Lexer<'src> {
    /// Constructs a new lexer with the default state, skipping the byte-order
    /// mark, if any.
    pub fn new(src: &'src str) -> Lexer<'src> {
        let mut lexer = Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            line: 1,
            current_line: 1,
        };
        if lexer.peek() == '\u{feff}' {
            lexer.advance();
        }
        lexer
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Token {
        let kind = self.scan_token_kind();
        self.produce(kind)
    }

    pub fn src(&self) -> &'src str {
        self.src
    }

    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        loop {
            self.skip_whitespace();
            if self.iter.peek().is_none() {
                self.mark();
                return Eof;
            }
            let kind = match self.mark_advance() {
                '/' => match self.peek() {
                    '/' => {
                        self.line_comment();
                        continue;
                    }
                    _ => Slash,
                },
                ':' => match self.peek() {
                    '=' => self.advance_with(VarDecl),
                    _ => Colon,
                },
                '=' => match self.peek() {
                    '=' => self.advance_with(Eq),
                    _ => Assign,
                },
                '+' => match self.peek() {
                    '=' => self.advance_with(PlusAssign),
                    _ => Plus,
                },
                '-' => match self.peek() {
                    '=' => self.advance_with(MinusAssign),
                    _ => Minus,
                },
                '!' => match self.peek() {
                    '=' => self.advance_with(NotEq),
                    _ => Not,
                },
                '<' => match self.peek() {
                    '=' => self.advance_with(LessEq),
                    _ => Less,
                },
                '>' => match self.peek() {
                    '=' => self.advance_with(GreaterEq),
                    _ => Greater,
                },
                '&' => match self.peek() {
                    '&' => self.advance_with(And),
                    _ => Error(self::Error::LoneOperator('&')),
                },
                '|' => match self.peek() {
                    '|' => self.advance_with(Or),
                    _ => Error(self::Error::LoneOperator('|')),
                },
                '.' if self.peek().is_ascii_digit() => self.number(),
                '.' => Dot,
                '*' => Star,
                '%' => Percent,
                '(' => LParen,
                ')' => RParen,
                '{' => LBrace,
                '}' => RBrace,
                '[' => LBracket,
                ']' => RBracket,
                ',' => Comma,
                ';' => Semicolon,
                '"' => self.string(),
                c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
                c if c.is_ascii_digit() => self.number(),
                c => Error(self::Error::UnexpectedChar(c)),
            };
            return kind;
        }
    }

    /// Strings have no escape sequences: the first `"` closes the literal. An
    /// unclosed string extends up to the end of the input.
    fn string(&mut self) -> TokenKind {
        loop {
            if self.iter.peek().is_none() {
                break;
            }
            if self.advance() == '"' {
                break;
            }
        }
        TokenKind::String
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';

        while valid_identifier_suffix(self.peek()) {
            self.advance();
        }
        match KEYWORDS.get(self.substr()).copied() {
            Some(keyword) => keyword,
            None => TokenKind::Identifier,
        }
    }

    /// Numbers are scanned greedily over digits and dots; malformed literals
    /// such as `1.2.3` are rejected when parsed.
    fn number(&mut self) -> TokenKind {
        while matches!(self.peek(), '0'..='9' | '.') {
            self.advance();
        }
        TokenKind::Number
    }

    fn line_comment(&mut self) {
        assert_eq!(self.advance(), '/');
        while !matches!(self.peek(), '\n' | '\0') {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_ascii_whitespace() {
            self.advance();
        }
    }
}

impl<'src> Lexer<'src> {
    /// Starts a new token "mark".
    fn mark(&mut self) {
        self.current_lo = self.cursor;
        self.current_line = self.line;
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.mark();
        self.advance()
    }

    /// Returns the next character and advances the iterator.
    fn advance(&mut self) -> char {
        match self.iter.next() {
            Some(c) => {
                self.cursor += c.len_utf8();
                if c == '\n' {
                    self.line += 1;
                }
                c
            }
            None => '\0',
        }
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the current span.
    fn span(&self) -> Span {
        Span::new_of_bounds(self.current_lo..self.cursor, self.current_line)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &'src str {
        &self.src[self.current_lo..self.cursor]
    }

    /// Produces a token using the marked bounds.
    fn produce(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.span())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        Some(self.next_token())
    }
}

pub mod extract {
    use std::num::ParseFloatError;

    use super::*;

    pub fn number(token: Token, src: &str) -> Result<f64, ParseFloatError> {
        debug_assert_eq!(token.kind, TokenKind::Number);
        token.text(src).parse()
    }

    pub fn ident(token: Token, src: &str) -> &str {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        token.text(src)
    }

    /// Strips the quotes off a string token. The closing quote may be missing
    /// if the string was left unclosed.
    pub fn string(token: Token, src: &str) -> &str {
        debug_assert_eq!(token.kind, TokenKind::String);
        let raw = &token.text(src)[1..];
        raw.strip_suffix('"').unwrap_or(raw)
    }
}
