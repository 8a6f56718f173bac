use crate::{
    codegen, parser,
    token::Spanned,
    util::{
        self,
        fmt::{tree, Show},
        intern::Interner,
    },
    Error,
};

pub fn format_warnings(i: &Interner, w: &[Spanned<codegen::Warning>]) -> Vec<String> {
    let ctx = util::fmt::Context { ident_interner: i };
    w.iter().map(|w| format!("{:#}", w.display(&ctx))).collect()
}

/// Each variant contains the input.
pub enum Test {
    Parser(&'static str),
    Codegen(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    CodeOk(&'static str),
    ExpectedErrors(&'static [&'static str]),
    ExpectedWarnings(&'static [&'static str]),
}

pub struct Outcome {
    /// The printed tree, or the generated code (without its prelude).
    pub output: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Marks the end of the prelude every generated program starts with.
const PRELUDE_END: &str = "use titan_runtime as rt;\n";

#[track_caller]
pub fn run_pipeline(test: Test) -> Outcome {
    let interner = &mut Interner::with_capacity(128);

    let (src, is_codegen) = match test {
        Test::Parser(src) => (src, false),
        Test::Codegen(src) => (src, true),
    };
    let program = match parser::parse_program(src, interner) {
        Ok(program) => program,
        Err(error) => {
            return Outcome {
                output: String::new(),
                errors: vec![format!("{:#}", Error::from(error))],
                warnings: vec![],
            }
        }
    };

    if !is_codegen {
        return Outcome {
            output: tree::print_program_string(interner, &program),
            errors: vec![],
            warnings: vec![],
        };
    }

    let output = codegen::generate(&program, interner);
    let code = match output.program.split_once(PRELUDE_END) {
        Some((_, rest)) => rest.to_owned(),
        None => output.program,
    };
    Outcome {
        output: code,
        errors: vec![],
        warnings: format_warnings(interner, &output.warnings),
    }
}

#[track_caller]
pub fn run_assertion(assertion: Assertion, actual: &Outcome) {
    match assertion {
        Assertion::TreeOk(expected) | Assertion::CodeOk(expected) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(actual.errors, expected_errors);
            ::pretty_assertions::assert_eq!(actual.output.trim(), expected.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(actual.errors, expected_errors)
        }
        Assertion::ExpectedWarnings(expected_warnings) => {
            ::pretty_assertions::assert_eq!(actual.warnings, expected_warnings)
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let program = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind), $source);
                let outcome = crate::util::test_utils::run_pipeline(test);
                tree_tests!(@@expand_assertions, &outcome, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $outcome:expr, []) => {};
    (@@expand_assertions, $outcome:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $outcome,
        );
        tree_tests!(@@expand_assertions, $outcome, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, code_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::CodeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };
    (@@assertion, expected_warnings, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedWarnings($expected)
    };

    (@@get_test(parser), $source:expr) => {
        crate::util::test_utils::Test::Parser($source)
    };
    (@@get_test(codegen), $source:expr) => {
        crate::util::test_utils::Test::Codegen($source)
    };
}
pub(crate) use tree_tests;
