use crate::{
    ast::{
        BinaryOperator, Block, Expr, ExprKind, Ident, Path, Program, Stmt, StmtKind, TypeName,
        UnaryOperator,
    },
    lexer::{self, extract, Lexer},
    token::{Spanned, Token, TokenKind},
    util::intern::Interner,
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Parses a whole Titan program. Parsing stops at the first error, lexical
/// errors included.
pub fn parse_program(src: &str, ident_interner: &mut Interner) -> Result<Program> {
    let mut p = Parser::new(src, ident_interner);
    p.parse_program()
}

struct Parser<'src, 'ident> {
    src: &'src str,
    lexer: Lexer<'src>,
    current: Token,
    /// One token of lookahead past `current`, filled on demand.
    lookahead: Option<Token>,
    ident_interner: &'ident mut Interner,
}

impl Parser<'_, '_> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut body = Vec::with_capacity(16);
        while !self.is(TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        Ok(Program { body })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let current = self.peek().kind;
        let next = self.peek_next().kind;

        let stmt = match current {
            // `Str(x)` is a call, not a declaration.
            kind if kind.is_type_keyword() && next != TokenKind::LParen => {
                self.parse_typed_decl()?
            }
            TokenKind::Identifier if next == TokenKind::VarDecl => self.parse_inferred_decl()?,
            TokenKind::Identifier
                if matches!(
                    next,
                    TokenKind::Assign | TokenKind::PlusAssign | TokenKind::MinusAssign
                ) =>
            {
                self.parse_assignment()?
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Func => self.parse_func()?,
            TokenKind::Return => self.parse_return()?,
            _ => {
                let expr = self.parse_expr()?;
                Stmt {
                    span: expr.span,
                    kind: StmtKind::Expr(expr),
                }
            }
        };

        self.take(TokenKind::Semicolon);
        Ok(stmt)
    }

    fn parse_typed_decl(&mut self) -> Result<Stmt> {
        let ty_token = self.advance();
        let ty = match ty_token.kind {
            TokenKind::NumType => TypeName::Num,
            TokenKind::StrType => TypeName::Str,
            TokenKind::ArrayType => TypeName::Array,
            _ => unreachable!("not a type keyword"),
        };
        let name = self.parse_ident()?;
        self.consume_any(&[TokenKind::Assign, TokenKind::VarDecl])?;
        let value = self.parse_expr()?;

        Ok(Stmt {
            span: ty_token.span().to(value.span),
            kind: StmtKind::VarDecl {
                name,
                ty: Some(ty),
                value,
            },
        })
    }

    fn parse_inferred_decl(&mut self) -> Result<Stmt> {
        let name = self.parse_ident()?;
        self.consume(TokenKind::VarDecl)?;
        let value = self.parse_expr()?;

        Ok(Stmt {
            span: name.span.to(value.span),
            kind: StmtKind::VarDecl {
                name,
                ty: None,
                value,
            },
        })
    }

    /// Parses `x = e`, `x += e` and `x -= e`, desugaring the compound forms
    /// into `x = x + e` and `x = x - e`.
    fn parse_assignment(&mut self) -> Result<Stmt> {
        let target = self.parse_ident()?;
        let op = self.consume_any(&[
            TokenKind::Assign,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
        ])?;
        let rhs = self.parse_expr()?;

        let value = match op.kind {
            TokenKind::PlusAssign | TokenKind::MinusAssign => {
                let op = if op.kind == TokenKind::PlusAssign {
                    BinaryOperator::Add
                } else {
                    BinaryOperator::Sub
                };
                let lhs = Expr {
                    kind: ExprKind::Id(Path {
                        segments: vec![target],
                        span: target.span,
                    }),
                    span: target.span,
                };
                Expr {
                    span: target.span.to(rhs.span),
                    kind: ExprKind::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                }
            }
            _ => rhs,
        };

        Ok(Stmt {
            span: target.span.to(value.span),
            kind: StmtKind::Assign { target, value },
        })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let start = self.consume(TokenKind::If)?;
        let predicate = self.parse_parenthesized()?;
        let then_block = self.parse_block()?;
        let else_block = if self.take(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        let end = else_block.as_ref().unwrap_or(&then_block).span;
        Ok(Stmt {
            span: start.span().to(end),
            kind: StmtKind::If {
                predicate,
                then_block,
                else_block,
            },
        })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let start = self.consume(TokenKind::While)?;
        let predicate = self.parse_parenthesized()?;
        let body = self.parse_block()?;

        Ok(Stmt {
            span: start.span().to(body.span),
            kind: StmtKind::While { predicate, body },
        })
    }

    /// Parses `for [i :=] start to end { ... }`. An identifier only names the
    /// counter when it is followed by `:=`.
    fn parse_for(&mut self) -> Result<Stmt> {
        let start_token = self.consume(TokenKind::For)?;
        let counter = if self.is(TokenKind::Identifier)
            && self.peek_next().kind == TokenKind::VarDecl
        {
            let counter = self.parse_ident()?;
            self.consume(TokenKind::VarDecl)?;
            Some(counter)
        } else {
            None
        };
        let start = self.parse_expr()?;
        self.consume(TokenKind::To)?;
        let end = self.parse_expr()?;
        let body = self.parse_block()?;

        Ok(Stmt {
            span: start_token.span().to(body.span),
            kind: StmtKind::ForRange {
                counter,
                start,
                end,
                body,
            },
        })
    }

    fn parse_func(&mut self) -> Result<Stmt> {
        let start = self.consume(TokenKind::Func)?;
        let name = self.parse_ident()?;
        self.consume(TokenKind::LParen)?;
        let params = self.parse_list(TokenKind::RParen, TokenKind::Comma, |p| p.parse_ident())?;
        self.consume(TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(Stmt {
            span: start.span().to(body.span),
            kind: StmtKind::FuncDecl { name, params, body },
        })
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        let start = self.consume(TokenKind::Return)?;
        let value = match self.peek().kind {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
            _ => Some(self.parse_expr()?),
        };

        let span = match &value {
            Some(expr) => start.span().to(expr.span),
            None => start.span(),
        };
        Ok(Stmt {
            span,
            kind: StmtKind::Return(value),
        })
    }

    fn parse_block(&mut self) -> Result<Block> {
        let start = self.consume(TokenKind::LBrace)?;
        let mut body = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => {
                    let c = self.peek();
                    return Err(Self::unexpected(
                        c,
                        Error::Unexpected {
                            actual: c.kind,
                            expected: TokenKind::RBrace,
                        },
                    ));
                }
                _ => body.push(self.parse_stmt()?),
            }
        }
        let end = self.consume(TokenKind::RBrace)?;

        Ok(Block {
            body,
            span: start.span().to(end.span()),
        })
    }

    fn parse_parenthesized(&mut self) -> Result<Expr> {
        self.consume(TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.consume(TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident {
            name: self.ident_interner.intern(extract::ident(token, self.src)),
            span: token.span(),
        })
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let lhs_token = self.advance();
        let mut lhs = self.parse_nud(lhs_token)?;

        loop {
            let op_token = self.peek();
            let Some((lbp, rbp)) = Self::infix_binding_power(op_token.kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.advance();

            let rhs = self.parse_expr_bp(rbp)?;
            lhs = Expr {
                span: lhs.span.to(rhs.span),
                kind: ExprKind::Binary {
                    op: Self::binary_operator(op_token.kind),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
            };
        }

        Ok(lhs)
    }

    /// Parses tokens that start an expression: prefix operators, literals,
    /// grouping, names and calls.
    fn parse_nud(&mut self, token: Token) -> Result<Expr> {
        let (kind, span) = match token.kind {
            TokenKind::Number => {
                let Ok(parsed) = extract::number(token, self.src) else {
                    return Err(token.span().wrap(Error::InvalidNumber));
                };
                (ExprKind::Number(parsed), token.span())
            }
            TokenKind::String => (
                ExprKind::String(extract::string(token, self.src).into()),
                token.span(),
            ),
            TokenKind::True => (ExprKind::Bool(true), token.span()),
            TokenKind::False => (ExprKind::Bool(false), token.span()),
            TokenKind::Null => (ExprKind::Null, token.span()),

            TokenKind::LBracket => {
                let items =
                    self.parse_list(TokenKind::RBracket, TokenKind::Comma, |p| p.parse_expr())?;
                let end = self.consume(TokenKind::RBracket)?;
                (ExprKind::Array(items), token.span().to(end.span()))
            }

            // Parentheses only group; they leave no node behind.
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                return Ok(expr);
            }

            TokenKind::Not | TokenKind::Minus => {
                let Some(((), rbp)) = Self::prefix_binding_power(token.kind) else {
                    unreachable!("not a prefix operator");
                };
                let expr = self.parse_expr_bp(rbp)?;
                let op = if token.kind == TokenKind::Not {
                    UnaryOperator::Not
                } else {
                    UnaryOperator::Neg
                };
                let span = token.span().to(expr.span);
                (
                    ExprKind::Unary {
                        op,
                        expr: Box::new(expr),
                    },
                    span,
                )
            }

            TokenKind::Identifier => {
                let first = Ident {
                    name: self.ident_interner.intern(extract::ident(token, self.src)),
                    span: token.span(),
                };
                let mut segments = vec![first];
                while self.take(TokenKind::Dot) {
                    segments.push(self.parse_ident()?);
                }
                let last = segments.last().map_or(token.span(), |ident| ident.span);
                let path = Path {
                    segments,
                    span: token.span().to(last),
                };
                if self.is(TokenKind::LParen) {
                    return self.parse_call(path);
                }
                let span = path.span;
                (ExprKind::Id(path), span)
            }

            // `Str(x)`, `Num(x)` and `Array()` are calls to built-ins.
            kind if kind.is_type_keyword() && self.is(TokenKind::LParen) => {
                let name = self.ident_interner.intern(token.text(self.src));
                let path = Path {
                    segments: vec![Ident {
                        name,
                        span: token.span(),
                    }],
                    span: token.span(),
                };
                return self.parse_call(path);
            }

            _ => {
                return Err(Self::unexpected(
                    token,
                    Error::UnexpectedTokenInExpr { token: token.kind },
                ));
            }
        };

        Ok(Expr { kind, span })
    }

    fn parse_call(&mut self, callee: Path) -> Result<Expr> {
        self.consume(TokenKind::LParen)?;
        let args = self.parse_list(TokenKind::RParen, TokenKind::Comma, |p| p.parse_expr())?;
        let end = self.consume(TokenKind::RParen)?;

        Ok(Expr {
            span: callee.span.to(end.span()),
            kind: ExprKind::Call { callee, args },
        })
    }

    /// Parses `item (separator item)* [separator]` until `end_delim` is found.
    /// Does **NOT** consume the end delimiter.
    fn parse_list<T>(
        &mut self,
        end_delim: TokenKind,
        separator: TokenKind,
        parse_item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        debug_assert_ne!(end_delim, separator);

        let mut items = Vec::new();
        while !self.is(end_delim) {
            items.push(parse_item(self)?);

            if !self.take(separator) {
                if self.is(end_delim) {
                    break;
                }
                let c = self.peek();
                return Err(Self::unexpected(
                    c,
                    Error::UnexpectedAny {
                        actual: c.kind,
                        expected: Box::from([separator, end_delim]),
                    },
                ));
            }
        }
        Ok(items)
    }

    fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
        let bp = match kind {
            TokenKind::Or => (1, 2),
            TokenKind::And => (3, 4),
            TokenKind::Eq | TokenKind::NotEq => (5, 6),
            TokenKind::Less | TokenKind::Greater | TokenKind::LessEq | TokenKind::GreaterEq => {
                (7, 8)
            }
            TokenKind::Plus | TokenKind::Minus => (9, 10),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => (11, 12),
            _ => return None,
        };
        Some(bp)
    }

    fn prefix_binding_power(kind: TokenKind) -> Option<((), u8)> {
        match kind {
            TokenKind::Not | TokenKind::Minus => Some(((), 13)),
            _ => None,
        }
    }

    fn binary_operator(kind: TokenKind) -> BinaryOperator {
        match kind {
            TokenKind::Or => BinaryOperator::Or,
            TokenKind::And => BinaryOperator::And,
            TokenKind::Eq => BinaryOperator::Eq,
            TokenKind::NotEq => BinaryOperator::NotEq,
            TokenKind::Less => BinaryOperator::Lt,
            TokenKind::Greater => BinaryOperator::Gt,
            TokenKind::LessEq => BinaryOperator::LtEq,
            TokenKind::GreaterEq => BinaryOperator::GtEq,
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Percent => BinaryOperator::Mod,
            _ => unreachable!("not a binary operator"),
        }
    }
}

impl Parser<'_, '_> {
    fn new<'src, 'ident>(
        src: &'src str,
        ident_interner: &'ident mut Interner,
    ) -> Parser<'src, 'ident> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token();
        Parser {
            src,
            lexer,
            current,
            lookahead: None,
            ident_interner,
        }
    }

    /// Builds an error for an unexpected token. Lexical error tokens always
    /// report the lexical error itself.
    fn unexpected(token: Token, error: Error) -> Spanned<Error> {
        let error = match token.kind {
            TokenKind::Error(error) => Error::Lexer(error),
            _ => error,
        };
        token.span().wrap(error)
    }

    /// Returns the current token.
    fn peek(&self) -> Token {
        self.current
    }

    /// Returns the token after the current one, without advancing.
    fn peek_next(&mut self) -> Token {
        *self
            .lookahead
            .get_or_insert_with(|| self.lexer.next_token())
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Token {
        let next = match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
        std::mem::replace(&mut self.current, next)
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not,
    /// returns an error.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if c.kind == expect {
            Ok(self.advance())
        } else {
            Err(Self::unexpected(
                c,
                Error::Unexpected {
                    actual: c.kind,
                    expected: expect,
                },
            ))
        }
    }

    /// Advances if the current token matches any of the provided tokens. If
    /// not, returns an error.
    fn consume_any(&mut self, expect: &'static [TokenKind]) -> Result<Token> {
        let c = self.peek();
        if expect.contains(&c.kind) {
            return Ok(self.advance());
        }
        Err(Self::unexpected(
            c,
            Error::UnexpectedAny {
                actual: c.kind,
                expected: Box::from(expect),
            },
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedTokenInExpr {
        token: TokenKind,
    },
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    /// A number token such as `1.2.3`, which the lexer accepts greedily.
    InvalidNumber,
    Lexer(lexer::Error),
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    pub fn parse_program(src: &str) -> (Interner, Program) {
        let mut i = Interner::with_capacity(32);
        let prog = super::parse_program(src, &mut i).expect("failed to parse");
        (i, prog)
    }
}
