use std::{fmt, ops::Range};

use crate::lexer;

#[derive(Copy, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
    line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            lo: span.lo,
            len: span.len,
            line: span.line,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            lo: self.lo,
            len: self.len,
            line: self.line,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Returns the source text this token was scanned from.
    pub fn text<'src>(&self, src: &'src str) -> &'src str {
        self.span().substr(src)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span())
    }
}

/// A byte range in the source, along with the (1-based) line where it starts.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub lo: usize,
    pub len: u32,
    pub line: u32,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>, line: u32) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap(), line)
    }

    pub fn new_of_length(lo: usize, len: u32, line: u32) -> Span {
        Span { lo, len, line }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span that starts at `self` and ends at the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new_of_bounds(self.lo..other.hi().max(self.hi()), self.line)
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.hi()]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, line: {})", self.line)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    If,
    Else,
    While,
    For,
    To,
    Func,
    Return,

    True,
    False,
    Null,

    /// `Num`
    NumType,
    /// `Str`
    StrType,
    /// `Array`
    ArrayType,

    /// `:=`
    VarDecl,
    /// `=`
    Assign,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `+=`
    PlusAssign,
    /// `-=`
    MinusAssign,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Colon,

    Identifier,
    Number,
    String,

    Eof,
    Error(lexer::Error),
}

impl TokenKind {
    pub fn is_error(&self) -> bool {
        matches!(self, TokenKind::Error(_))
    }

    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::NumType | TokenKind::StrType | TokenKind::ArrayType
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let lexeme = match self {
            If => "if",
            Else => "else",
            While => "while",
            For => "for",
            To => "to",
            Func => "func",
            Return => "return",
            True => "true",
            False => "false",
            Null => "null",
            NumType => "Num",
            StrType => "Str",
            ArrayType => "Array",
            VarDecl => ":=",
            Assign => "=",
            Eq => "==",
            NotEq => "!=",
            Less => "<",
            Greater => ">",
            LessEq => "<=",
            GreaterEq => ">=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            PlusAssign => "+=",
            MinusAssign => "-=",
            And => "&&",
            Or => "||",
            Not => "!",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Comma => ",",
            Dot => ".",
            Semicolon => ";",
            Colon => ":",
            Identifier => return f.write_str("identifier"),
            Number => return f.write_str("number"),
            String => return f.write_str("string"),
            Eof => return f.write_str("end of input"),
            Error(_) => return f.write_str("invalid token"),
        };
        write!(f, "`{lexeme}`")
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "to" => TokenKind::To,
    "func" => TokenKind::Func,
    "return" => TokenKind::Return,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "null" => TokenKind::Null,
    "Num" => TokenKind::NumType,
    "Str" => TokenKind::StrType,
    "Array" => TokenKind::ArrayType,
};
