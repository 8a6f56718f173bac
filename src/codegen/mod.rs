use std::{
    collections::HashMap,
    fmt::{self, Write},
    format_args as f,
};

use crate::{
    ast::{
        BinaryOperator, Block, Expr, ExprKind, Ident, Path, Program, Stmt, StmtKind,
        UnaryOperator,
    },
    scope::Scope,
    token::{Span, Spanned},
    util::intern::{Interned, Interner},
};

pub mod builtins;

use builtins::{ARRAY_METHODS, BUILTINS, NON_RAW_KEYWORDS, PRELUDE_VARIANTS, RUST_KEYWORDS};

/// Source of the runtime module generated programs are compiled against.
pub const RUNTIME_LIBRARY: &str = include_str!("../../runtime/src/lib.rs");

/// Name under which generated programs expect the runtime module.
pub const RUNTIME_MODULE: &str = "titan_runtime";

const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

const INDENT: &str = "    ";

/// Prefix of every user function, so they never collide with variables.
const FUNCTION_PREFIX: &str = "f_";

/// The artifacts of a code generation run.
#[derive(Debug)]
pub struct Output {
    /// The generated Rust program.
    pub program: String,
    /// The runtime library, identical for every program.
    pub runtime: &'static str,
    pub warnings: Vec<Spanned<Warning>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// A name that is read or assigned without having been declared.
    UndeclaredName(Interned),
    UndefinedFunction(Interned),
    /// A function declared more than once. Only the first definition is kept.
    DuplicateFunction(Interned),
    ArgumentCount {
        callee: Box<str>,
        expected: usize,
        actual: usize,
    },
    /// A dotted call that is neither a built-in nor an array method.
    UnknownMethod(Box<str>),
    /// A dotted name used as a value.
    DottedValue(Box<str>),
}

/// Generates the Rust program for a parsed Titan program. Generation never
/// fails; dubious constructs are reported as warnings.
pub fn generate(program: &Program, idents: &Interner) -> Output {
    Generator::new(idents).generate(program)
}

struct Generator<'ident> {
    idents: &'ident Interner,
    code: String,
    indent: usize,
    scope: Scope,
    /// Arity of every declared function, wherever it is declared.
    functions: HashMap<Interned, usize>,
    warnings: Vec<Spanned<Warning>>,
    in_function: bool,
    hidden_counters: usize,
}

struct FuncDecl<'a> {
    name: Ident,
    params: &'a [Ident],
    body: &'a Block,
}

impl Generator<'_> {
    fn new(idents: &Interner) -> Generator<'_> {
        Generator {
            idents,
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
            indent: 0,
            scope: Scope::new(),
            functions: HashMap::new(),
            warnings: Vec::new(),
            in_function: false,
            hidden_counters: 0,
        }
    }

    fn generate(mut self, program: &Program) -> Output {
        let mut funcs = Vec::new();
        collect_functions(&program.body, &mut funcs);

        self.g_prelude();
        // Rust functions can't capture locals, so every function, nested or
        // not, becomes a module-level item.
        for func in &funcs {
            if self.functions.contains_key(&func.name.name) {
                self.warn(func.name.span, Warning::DuplicateFunction(func.name.name));
                continue;
            }
            self.functions.insert(func.name.name, func.params.len());
        }
        let mut emitted = Vec::with_capacity(funcs.len());
        for func in &funcs {
            if emitted.contains(&func.name.name) {
                continue;
            }
            emitted.push(func.name.name);
            self.g_function(func);
        }
        self.g_main(program);

        Output {
            program: self.code,
            runtime: RUNTIME_LIBRARY,
            warnings: self.warnings,
        }
    }

    fn g_prelude(&mut self) {
        let version = env!("CARGO_PKG_VERSION");
        self.out(f!("// Generated by the Titan compiler v{version}."));
        self.out(f!(
            "#![allow(dead_code, non_snake_case, unreachable_code, unused_assignments, \
            unused_mut, unused_variables)]"
        ));
        self.out_line();
        self.out(f!("mod {RUNTIME_MODULE};"));
        self.out(f!("use {RUNTIME_MODULE} as rt;"));
        self.out_line();
    }

    fn g_function(&mut self, func: &FuncDecl<'_>) {
        self.scope.reset();
        self.scope.enter();
        self.in_function = true;

        let idents = self.idents;
        self.start_line();
        self.emit(f!("fn {FUNCTION_PREFIX}{}(", idents.get(func.name.name)));
        for (i, param) in func.params.iter().enumerate() {
            if i > 0 {
                self.emit(f!(", "));
            }
            self.emit(f!("mut {}: rt::Value", self.ident(param.name)));
            self.scope.declare(param.name);
        }
        self.emit(f!(") -> rt::Value {{\n"));
        self.indented(|this| {
            this.g_stmts(&func.body.body);
            this.out(f!("return rt::NULL;"));
        });
        self.out(f!("}}"));
        self.out_line();

        self.scope.leave();
        self.in_function = false;
    }

    fn g_main(&mut self, program: &Program) {
        self.scope.reset();
        self.scope.enter();

        self.out(f!("// MAIN"));
        self.out(f!("fn main() {{"));
        self.indented(|this| {
            this.g_stmts(&program.body);
            this.out(f!("rt::pause();"));
        });
        self.out(f!("}}"));

        self.scope.leave();
    }

    fn g_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.g_stmt(stmt);
        }
    }

    /// Generates a block in its own scope.
    fn g_block(&mut self, block: &Block) {
        self.scope.enter();
        self.indented(|this| this.g_stmts(&block.body));
        self.scope.leave();
    }

    fn g_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl { name, value, .. } => {
                // The initializer is generated before the name is declared,
                // so `x := x` refers to an outer `x`, if any.
                let keyword = if self.scope.is_known(name.name) {
                    ""
                } else {
                    "let mut "
                };
                self.start_line();
                self.emit(f!("{keyword}{} = ", self.ident(name.name)));
                self.g_expr(value);
                self.emit(f!(";\n"));
                self.scope.declare(name.name);
            }
            StmtKind::Assign { target, value } => {
                if !self.scope.is_known(target.name) {
                    self.warn(target.span, Warning::UndeclaredName(target.name));
                }
                self.start_line();
                self.emit(f!("{} = ", self.ident(target.name)));
                self.g_expr(value);
                self.emit(f!(";\n"));
            }
            StmtKind::If {
                predicate,
                then_block,
                else_block,
            } => {
                self.start_line();
                self.emit(f!("if rt::truthy("));
                self.g_expr(predicate);
                self.emit(f!(") {{\n"));
                self.g_block(then_block);
                if let Some(else_block) = else_block {
                    self.out(f!("}} else {{"));
                    self.g_block(else_block);
                }
                self.out(f!("}}"));
            }
            StmtKind::While { predicate, body } => {
                self.start_line();
                self.emit(f!("while rt::truthy("));
                self.g_expr(predicate);
                self.emit(f!(") {{\n"));
                self.g_block(body);
                self.out(f!("}}"));
            }
            StmtKind::ForRange {
                counter,
                start,
                end,
                body,
            } => self.g_for(counter.as_ref(), start, end, body),
            // Already generated as a module-level item.
            StmtKind::FuncDecl { .. } => {}
            StmtKind::Return(value) => self.g_return(value.as_ref()),
            StmtKind::Expr(expr) => {
                self.start_line();
                self.g_expr(expr);
                self.emit(f!(";\n"));
            }
        }
    }

    /// `for i := a to b { ... }` counts up from `a` while `i < b`, by one.
    fn g_for(&mut self, counter: Option<&Ident>, start: &Expr, end: &Expr, body: &Block) {
        let counter_name = match counter {
            Some(counter) => self.ident(counter.name).to_string(),
            // Skips any name the program itself uses.
            None => loop {
                self.hidden_counters += 1;
                let name = format!("__counter{}", self.hidden_counters);
                if self.idents.lookup(&name).is_none() {
                    break name;
                }
            },
        };

        self.out(f!("{{"));
        self.scope.enter();
        self.indented(|this| {
            this.start_line();
            this.emit(f!("let mut {counter_name} = "));
            this.g_expr(start);
            this.emit(f!(";\n"));
            if let Some(counter) = counter {
                this.scope.declare(counter.name);
            }

            this.start_line();
            this.emit(f!("while rt::truthy(rt::lt({counter_name}.clone(), "));
            this.g_expr(end);
            this.emit(f!(")) {{\n"));
            this.indented(|this| {
                this.g_stmts(&body.body);
                this.out(f!(
                    "{counter_name} = rt::add({counter_name}.clone(), rt::num(1.0));"
                ));
            });
            this.out(f!("}}"));
        });
        self.scope.leave();
        self.out(f!("}}"));
    }

    fn g_return(&mut self, value: Option<&Expr>) {
        match (self.in_function, value) {
            (true, Some(value)) => {
                self.start_line();
                self.emit(f!("return "));
                self.g_expr(value);
                self.emit(f!(";\n"));
            }
            (true, None) => self.out(f!("return rt::NULL;")),
            // A program-level return ends `main`, skipping the final pause.
            (false, value) => {
                if let Some(value) = value {
                    self.start_line();
                    self.emit(f!("let _ = "));
                    self.g_expr(value);
                    self.emit(f!(";\n"));
                }
                self.out(f!("return;"));
            }
        }
    }

    fn g_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Number(n) if n.is_infinite() => {
                self.emit(f!("rt::num(f64::INFINITY)"));
            }
            ExprKind::Number(n) => self.emit(f!("rt::num({n:?})")),
            ExprKind::String(s) => self.emit(f!("rt::string({s:?})")),
            ExprKind::Bool(true) => self.emit(f!("rt::num(1.0)")),
            ExprKind::Bool(false) => self.emit(f!("rt::num(0.0)")),
            ExprKind::Null => self.emit(f!("rt::NULL")),
            ExprKind::Id(path) => self.g_id(path),
            ExprKind::Array(items) => {
                // [a, b] => push_result(push_result(new_array(), a), b)
                for _ in items {
                    self.emit(f!("rt::arr_push_result("));
                }
                self.emit(f!("rt::new_array()"));
                for item in items {
                    self.emit(f!(", "));
                    self.g_expr(item);
                    self.emit(f!(")"));
                }
            }
            ExprKind::Unary { op, expr } => {
                let primitive = match op {
                    UnaryOperator::Not => "not",
                    UnaryOperator::Neg => "neg",
                };
                self.emit(f!("rt::{primitive}("));
                self.g_expr(expr);
                self.emit(f!(")"));
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.emit(f!("rt::{}(", binary_primitive(*op)));
                self.g_expr(lhs);
                self.emit(f!(", "));
                self.g_expr(rhs);
                self.emit(f!(")"));
            }
            ExprKind::Call { callee, args } => self.g_call(callee, args, expr.span),
        }
    }

    fn g_id(&mut self, path: &Path) {
        match path.single() {
            Some(ident) => {
                if !self.scope.is_known(ident.name) {
                    self.warn(ident.span, Warning::UndeclaredName(ident.name));
                }
                self.emit(f!("{}.clone()", self.ident(ident.name)));
            }
            None => {
                let dotted = path.to_dotted_string(self.idents);
                self.warn(path.span, Warning::DottedValue(dotted.into()));
                self.emit(f!("rt::NULL"));
            }
        }
    }

    /// Calls resolve, in order, to a built-in, an array method (for
    /// `object.method`) or a user function.
    fn g_call(&mut self, callee: &Path, args: &[Expr], span: Span) {
        let dotted = path_name(callee, self.idents);

        if let Some(builtin) = BUILTINS.get(&*dotted) {
            self.emit(f!("rt::{}(", builtin.runtime_fn));
            self.g_args(&dotted, args, builtin.arity, false, span);
            self.emit(f!(")"));
            return;
        }

        match callee.segments.as_slice() {
            [function] => self.g_user_call(*function, args, span),
            [object, method] => {
                let idents = self.idents;
                let Some(array_method) = ARRAY_METHODS.get(idents.get(method.name)) else {
                    self.warn(span, Warning::UnknownMethod(dotted.into()));
                    self.emit(f!("rt::NULL"));
                    return;
                };
                if !self.scope.is_known(object.name) {
                    self.warn(object.span, Warning::UndeclaredName(object.name));
                }
                self.emit(f!(
                    "rt::{}({}.clone()",
                    array_method.runtime_fn,
                    self.ident(object.name)
                ));
                if array_method.arity > 0 {
                    self.emit(f!(", "));
                }
                self.g_args(
                    &dotted,
                    args,
                    array_method.arity,
                    array_method.indexed,
                    span,
                );
                self.emit(f!(")"));
            }
            _ => {
                self.warn(span, Warning::UnknownMethod(dotted.into()));
                self.emit(f!("rt::NULL"));
            }
        }
    }

    fn g_user_call(&mut self, function: Ident, args: &[Expr], span: Span) {
        let idents = self.idents;
        let name = idents.get(function.name);
        self.emit(f!("{FUNCTION_PREFIX}{name}("));
        match self.functions.get(&function.name).copied() {
            Some(arity) => self.g_args(name, args, arity, false, span),
            None => {
                self.warn(function.span, Warning::UndefinedFunction(function.name));
                self.g_args(name, args, args.len(), false, span);
            }
        }
        self.emit(f!(")"));
    }

    /// Generates exactly `arity` arguments, padding with nulls or dropping
    /// the extra ones.
    fn g_args(&mut self, callee: &str, args: &[Expr], arity: usize, indexed: bool, span: Span) {
        if args.len() != arity {
            self.warn(
                span,
                Warning::ArgumentCount {
                    callee: callee.into(),
                    expected: arity,
                    actual: args.len(),
                },
            );
        }
        for i in 0..arity {
            if i > 0 {
                self.emit(f!(", "));
            }
            let as_index = indexed && i == 0;
            if as_index {
                self.emit(f!("rt::index("));
            }
            match args.get(i) {
                Some(arg) => self.g_expr(arg),
                None => self.emit(f!("rt::NULL")),
            }
            if as_index {
                self.emit(f!(")"));
            }
        }
    }
}

/// Utility functions.
impl<'ident> Generator<'ident> {
    /// Writes a whole line at the current indentation.
    fn out(&mut self, f: impl fmt::Display) {
        self.start_line();
        self.emit(f!("{f}\n"));
    }

    /// Writes an empty line.
    fn out_line(&mut self) {
        self.code.push('\n');
    }

    /// Writes the indentation of a new line.
    fn start_line(&mut self) {
        for _ in 0..self.indent {
            self.code.push_str(INDENT);
        }
    }

    fn emit(&mut self, f: fmt::Arguments<'_>) {
        self.code
            .write_fmt(f)
            .expect("code emit should be infallible");
    }

    /// Writes with one more level of indentation.
    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.indent += 1;
        let res = f(self);
        self.indent -= 1;
        res
    }

    /// Resolves an identifier, returning a displayable Rust identifier.
    fn ident(&self, handle: impl Into<Interned>) -> RustIdent<'ident> {
        RustIdent(self.idents.get(handle))
    }

    fn warn(&mut self, span: Span, warning: Warning) {
        self.warnings.push(span.wrap(warning));
    }
}

fn collect_functions<'a>(stmts: &'a [Stmt], funcs: &mut Vec<FuncDecl<'a>>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::FuncDecl { name, params, body } => {
                funcs.push(FuncDecl {
                    name: *name,
                    params,
                    body,
                });
                collect_functions(&body.body, funcs);
            }
            StmtKind::If {
                then_block,
                else_block,
                ..
            } => {
                collect_functions(&then_block.body, funcs);
                if let Some(else_block) = else_block {
                    collect_functions(&else_block.body, funcs);
                }
            }
            StmtKind::While { body, .. } | StmtKind::ForRange { body, .. } => {
                collect_functions(&body.body, funcs);
            }
            _ => {}
        }
    }
}

fn path_name(path: &Path, idents: &Interner) -> String {
    match path.single() {
        Some(ident) => idents.get(ident.name).to_owned(),
        None => path.to_dotted_string(idents),
    }
}

fn binary_primitive(op: BinaryOperator) -> &'static str {
    use BinaryOperator::*;
    match op {
        Add => "add",
        Sub => "sub",
        Mul => "mul",
        Div => "div",
        Mod => "rem",
        Eq => "eq",
        NotEq => "neq",
        Lt => "lt",
        Gt => "gt",
        LtEq => "lte",
        GtEq => "gte",
        And => "and",
        Or => "or",
    }
}

/// A Titan identifier as written in the generated code. Rust keywords become
/// raw identifiers; the names that can't be raw get a trailing underscore.
#[derive(Copy, Clone)]
struct RustIdent<'i>(&'i str);

impl fmt::Display for RustIdent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0;
        if NON_RAW_KEYWORDS.contains(name) || PRELUDE_VARIANTS.contains(name) {
            write!(f, "{name}_")
        } else if RUST_KEYWORDS.contains(name) {
            write!(f, "r#{name}")
        } else {
            f.write_str(name)
        }
    }
}
