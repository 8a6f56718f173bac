use std::fmt;

use crate::{codegen, lexer, parser, token::Spanned, util::fmt::Show, Error};

/// With the alternate flag (`{:#}`), errors are prefixed by their line.
fn write_line_prefix<T>(f: &mut fmt::Formatter<'_>, spanned: &Spanned<T>) -> fmt::Result {
    if f.alternate() {
        write!(f, "line {}: ", spanned.span.line)?;
    }
    Ok(())
}

impl fmt::Display for Spanned<lexer::Error> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_line_prefix(f, self)?;
        match self.inner {
            lexer::Error::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
            lexer::Error::LoneOperator(c) => write!(f, "invalid lone operator `{c}`"),
        }
    }
}

impl fmt::Display for Spanned<parser::Error> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use parser::Error::*;
        match &self.inner {
            Lexer(e) => fmt::Display::fmt(&self.span.wrap(*e), f),
            UnexpectedTokenInExpr { token } => {
                write_line_prefix(f, self)?;
                write!(f, "unexpected {token} in expression")
            }
            Unexpected { actual, expected } => {
                write_line_prefix(f, self)?;
                write!(f, "expected {expected}, but got {actual}")
            }
            UnexpectedAny { actual, expected } => {
                write_line_prefix(f, self)?;
                write!(f, "expected one of ")?;
                for (i, kind) in expected.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                write!(f, ", but got {actual}")
            }
            InvalidNumber => {
                write_line_prefix(f, self)?;
                write!(f, "invalid number literal")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lexical(e) => fmt::Display::fmt(e, f),
            Error::Parse(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Show for Spanned<codegen::Warning> {
    fn show(&self, f: &mut fmt::Formatter<'_>, ctx: &super::Context<'_>) -> fmt::Result {
        let i = ctx.ident_interner;
        write_line_prefix(f, self)?;

        use codegen::Warning::*;
        match &self.inner {
            UndeclaredName(name) => {
                let name = i.get(name);
                write!(f, "variable `{name}` might not be declared")
            }
            UndefinedFunction(name) => {
                let name = i.get(name);
                write!(f, "function `{name}` is not declared")
            }
            DuplicateFunction(name) => {
                let name = i.get(name);
                write!(f, "function `{name}` is already declared")
            }
            ArgumentCount {
                callee,
                expected,
                actual,
            } => write!(
                f,
                "wrong number of arguments to `{callee}`: expected {expected}, but got {actual}"
            ),
            UnknownMethod(name) => write!(f, "unknown method `{name}`"),
            DottedValue(name) => write!(f, "dotted name `{name}` is not a value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        codegen::Warning,
        lexer,
        token::Span,
        util::{
            fmt::{Context, Show},
            intern::Interner,
        },
    };

    #[test]
    fn test_warning_display() {
        let mut idents = Interner::default();
        let x = idents.intern("x");
        let ctx = Context {
            ident_interner: &idents,
        };
        let span = Span::new_of_length(0, 1, 7);

        let warning = span.wrap(Warning::UndeclaredName(x));
        assert_eq!(
            format!("{:#}", warning.display(&ctx)),
            "line 7: variable `x` might not be declared"
        );
        assert_eq!(
            warning.display(&ctx).to_string(),
            "variable `x` might not be declared"
        );
    }

    #[test]
    fn test_lexer_error_display() {
        let error = Span::new_of_length(3, 1, 2).wrap(lexer::Error::LoneOperator('|'));
        assert_eq!(format!("{error:#}"), "line 2: invalid lone operator `|`");
    }
}
