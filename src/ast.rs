// program   ::= stmt*
// stmt      ::= (decl | assign | if | while | for | func | return | expr) [';']
// decl      ::= TYPE ID ('=' | ':=') expr
//             | ID ':=' expr
// assign    ::= ID ('=' | '+=' | '-=') expr
// if        ::= 'if' '(' expr ')' block ['else' block]
// while     ::= 'while' '(' expr ')' block
// for       ::= 'for' [ID ':='] expr 'to' expr block
// func      ::= 'func' ID '(' [ID (',' ID)*] ')' block
// return    ::= 'return' [expr]
// block     ::= '{' stmt* '}'
// expr      ::= ('!' | '-') expr
//             | expr OP expr
//             | NUMBER | STRING | 'true' | 'false' | 'null'
//             | '[' [expr (',' expr)*] ']'
//             | '(' expr ')'
//             | path ['(' [expr (',' expr)*] ')']
//             | TYPE '(' [expr (',' expr)*] ')'
// path      ::= ID ('.' ID)*

// Precedence
//
// ! - (prefix)
// * / %
// + -
// < > <= >=
// == !=
// &&
// ||

use crate::{
    token::Span,
    util::intern::{Interned, Interner},
};

#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum StmtKind {
    /// `x := e`, `Num x = e`.
    VarDecl {
        name: Ident,
        ty: Option<TypeName>,
        value: Expr,
    },
    /// `x = e`. Compound assignments are desugared into this form.
    Assign { target: Ident, value: Expr },
    If {
        predicate: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        predicate: Expr,
        body: Block,
    },
    /// `for i := start to end { ... }`. The range is half-open.
    ForRange {
        counter: Option<Ident>,
        start: Expr,
        end: Expr,
        body: Block,
    },
    FuncDecl {
        name: Ident,
        params: Vec<Ident>,
        body: Block,
    },
    Return(Option<Expr>),
    Expr(Expr),
}

#[derive(Debug, PartialEq)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// The optional type annotation of a declaration. Titan is dynamically
/// typed, so it is only kept for the syntax tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeName {
    Num,
    Str,
    Array,
}

impl TypeName {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeName::Num => "Num",
            TypeName::Str => "Str",
            TypeName::Array => "Array",
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Number(f64),
    String(Box<str>),
    Bool(bool),
    Null,
    Id(Path),
    Array(Vec<Expr>),
    Unary {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: Path,
        args: Vec<Expr>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Eq => "==",
            NotEq => "!=",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            And => "&&",
            Or => "||",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Neg,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Neg => "-",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: Interned,
    pub span: Span,
}

/// A possibly dotted name, such as `x`, `list.push` or `console.typeln`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    pub segments: Vec<Ident>,
    pub span: Span,
}

impl Path {
    /// Returns the only segment of an undotted path.
    pub fn single(&self) -> Option<Ident> {
        match self.segments.as_slice() {
            [ident] => Some(*ident),
            _ => None,
        }
    }

    /// Joins the segments back into their `.`-separated source form.
    pub fn to_dotted_string(&self, idents: &Interner) -> String {
        let mut buf = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                buf.push('.');
            }
            buf.push_str(idents.get(segment.name));
        }
        buf
    }
}
