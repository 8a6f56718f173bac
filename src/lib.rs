/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The scope tracker records which names are declared at which depth, so the
/// code generator can tell declarations from assignments.
pub mod scope;

/// The code generator maps an AST into a Rust program that uses the Titan
/// runtime library.
pub mod codegen;

pub mod ast;
pub mod token;
pub mod util;

use crate::{
    ast::Program,
    token::{Span, Spanned},
    util::intern::Interner,
};

/// Everything produced by a successful compilation.
#[derive(Debug)]
pub struct Compilation {
    pub ast: Program,
    pub output: codegen::Output,
    pub idents: Interner,
}

/// Runs the whole pipeline over `src`. The first lexical or syntax error
/// aborts the compilation.
pub fn compile(src: &str) -> Result<Compilation, Error> {
    let mut idents = Interner::with_capacity(128);
    let ast = parse(src, &mut idents)?;
    let output = codegen::generate(&ast, &idents);
    Ok(Compilation {
        ast,
        output,
        idents,
    })
}

pub fn parse(src: &str, idents: &mut Interner) -> Result<Program, Error> {
    parser::parse_program(src, idents).map_err(Error::from)
}

/// A fatal compilation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Lexical(Spanned<lexer::Error>),
    Parse(Spanned<parser::Error>),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::Lexical(e) => e.span,
            Error::Parse(e) => e.span,
        }
    }

    pub fn line(&self) -> u32 {
        self.span().line
    }
}

impl From<Spanned<parser::Error>> for Error {
    fn from(Spanned { span, inner }: Spanned<parser::Error>) -> Self {
        match inner {
            parser::Error::Lexer(e) => Error::Lexical(span.wrap(e)),
            e => Error::Parse(span.wrap(e)),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_outputs_both_artifacts() {
        let compilation = compile("x := 1\nconsole.typeln(Str(x))").unwrap();
        let program = &compilation.output.program;
        assert!(program.starts_with("// Generated by the Titan compiler v"));
        assert!(program.contains("mod titan_runtime;"));
        assert!(program.contains("fn main() {"));
        assert_eq!(compilation.output.runtime, codegen::RUNTIME_LIBRARY);
        assert!(compilation.output.warnings.is_empty());
        assert_eq!(compilation.ast.body.len(), 2);
    }

    #[test]
    fn test_showcase_compiles_cleanly() {
        let compilation = compile(include_str!("../demos/showcase.tn")).unwrap();
        assert!(compilation.output.warnings.is_empty());
        assert!(compilation.output.program.contains("fn f_fib(mut n: rt::Value)"));
        assert!(compilation.output.program.contains("fn f_greet(mut who: rt::Value)"));
    }

    #[test]
    fn test_lexical_error() {
        let error = compile("x := 1\n\ny := 2 @ 3").unwrap_err();
        assert!(matches!(
            error,
            Error::Lexical(Spanned {
                inner: lexer::Error::UnexpectedChar('@'),
                ..
            })
        ));
        assert_eq!(error.line(), 3);
        assert_eq!(error.to_string(), "unexpected character '@'");
        assert_eq!(format!("{error:#}"), "line 3: unexpected character '@'");
    }

    #[test]
    fn test_parse_error() {
        let error = compile("if ((x) {\n}").unwrap_err();
        assert!(matches!(error, Error::Parse(_)));
        assert_eq!(error.line(), 1);
        assert_eq!(format!("{error:#}"), "line 1: expected `)`, but got `{`");
    }
}
