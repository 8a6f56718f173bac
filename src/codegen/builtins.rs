//! Calls that map directly onto runtime primitives.

/// A built-in call, such as `Str(x)` or `console.typeln(s)`.
#[derive(Copy, Clone, Debug)]
pub struct Builtin {
    /// Name of the runtime function.
    pub runtime_fn: &'static str,
    pub arity: usize,
}

/// An `object.method(...)` array operation.
#[derive(Copy, Clone, Debug)]
pub struct ArrayMethod {
    pub runtime_fn: &'static str,
    /// Number of arguments, not counting the array itself.
    pub arity: usize,
    /// Whether the first argument is an index.
    pub indexed: bool,
}

const fn builtin(runtime_fn: &'static str, arity: usize) -> Builtin {
    Builtin { runtime_fn, arity }
}

const fn method(runtime_fn: &'static str, arity: usize, indexed: bool) -> ArrayMethod {
    ArrayMethod {
        runtime_fn,
        arity,
        indexed,
    }
}

pub static BUILTINS: phf::Map<&'static str, Builtin> = phf::phf_map! {
    "Str" => builtin("stringify", 1),
    "Num" => builtin("to_num", 1),
    "len" => builtin("len", 1),
    "Array" => builtin("new_array", 0),
    "console.typeln" => builtin("println", 1),
    "console.type" => builtin("print", 1),
    "console.askuser" => builtin("input", 1),
    "console.clear" => builtin("clear", 0),
    "console.setTitle" => builtin("set_title", 1),
    "console.color" => builtin("color", 1),
};

pub static ARRAY_METHODS: phf::Map<&'static str, ArrayMethod> = phf::phf_map! {
    "push" => method("arr_push", 1, false),
    "get" => method("arr_get", 1, true),
    "remove" => method("arr_remove", 1, true),
    "insert" => method("arr_insert", 2, true),
    "replace" => method("arr_replace", 2, true),
    "concat" => method("arr_concat", 1, false),
};

/// Words that can't be used as plain identifiers in the generated code.
pub static RUST_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "as", "async", "await", "break", "const", "continue", "dyn", "enum", "extern",
    "fn", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "static", "struct", "trait", "type", "unsafe", "use", "where", "abstract",
    "become", "box", "do", "final", "gen", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield", "else", "false", "for", "if", "return",
    "true", "while",
};

/// Words that can't even be raw identifiers.
pub static NON_RAW_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "self", "Self", "super", "crate", "_",
};

/// Prelude variants. Bindings can't shadow them, raw or not.
pub static PRELUDE_VARIANTS: phf::Set<&'static str> = phf::phf_set! {
    "None", "Some", "Ok", "Err",
};
