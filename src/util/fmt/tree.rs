use std::io::Write;

use crate::{ast::*, util::intern::Interner};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(idents: &Interner, program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, idents, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(
    w: &mut impl Write,
    idents: &Interner,
    program: &Program,
) -> std::io::Result<()> {
    for stmt in &program.body {
        print_stmt(w, idents, 0, stmt)?;
    }
    Ok(())
}

fn print_stmt(w: &mut impl Write, idents: &Interner, i: usize, stmt: &Stmt) -> std::io::Result<()> {
    sp(w, i)?;
    let span = stmt.span;
    match &stmt.kind {
        StmtKind::VarDecl { name, ty, value } => {
            write!(w, "vardecl {}", idents.get(name.name))?;
            if let Some(ty) = ty {
                write!(w, ": {}", ty.as_str())?;
            }
            writeln!(w, " ({span})")?;
            print_expr(w, idents, i + 1, value)?;
        }
        StmtKind::Assign { target, value } => {
            writeln!(w, "assign {} ({span})", idents.get(target.name))?;
            print_expr(w, idents, i + 1, value)?;
        }
        StmtKind::If {
            predicate,
            then_block,
            else_block,
        } => {
            writeln!(w, "if ({span})")?;
            print_header(w, i + 1, "predicate")?;
            print_expr(w, idents, i + 2, predicate)?;
            print_header(w, i + 1, "then")?;
            print_block(w, idents, i + 2, then_block)?;
            if let Some(else_block) = else_block {
                print_header(w, i + 1, "else")?;
                print_block(w, idents, i + 2, else_block)?;
            }
        }
        StmtKind::While { predicate, body } => {
            writeln!(w, "while ({span})")?;
            print_header(w, i + 1, "predicate")?;
            print_expr(w, idents, i + 2, predicate)?;
            print_header(w, i + 1, "body")?;
            print_block(w, idents, i + 2, body)?;
        }
        StmtKind::ForRange {
            counter,
            start,
            end,
            body,
        } => {
            let counter = counter.map_or("_", |c| idents.get(c.name));
            writeln!(w, "for {counter} ({span})")?;
            print_header(w, i + 1, "start")?;
            print_expr(w, idents, i + 2, start)?;
            print_header(w, i + 1, "end")?;
            print_expr(w, idents, i + 2, end)?;
            print_header(w, i + 1, "body")?;
            print_block(w, idents, i + 2, body)?;
        }
        StmtKind::FuncDecl { name, params, body } => {
            write!(w, "func {}(", idents.get(name.name))?;
            for (idx, param) in params.iter().enumerate() {
                if idx > 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{}", idents.get(param.name))?;
            }
            writeln!(w, ") ({span})")?;
            print_block(w, idents, i + 1, body)?;
        }
        StmtKind::Return(value) => {
            writeln!(w, "return ({span})")?;
            if let Some(value) = value {
                print_expr(w, idents, i + 1, value)?;
            }
        }
        StmtKind::Expr(expr) => print_expr_line(w, idents, i, expr)?,
    }
    Ok(())
}

fn print_block(w: &mut impl Write, idents: &Interner, i: usize, block: &Block) -> std::io::Result<()> {
    for stmt in &block.body {
        print_stmt(w, idents, i, stmt)?;
    }
    Ok(())
}

fn print_header(w: &mut impl Write, i: usize, header: &str) -> std::io::Result<()> {
    sp(w, i)?;
    writeln!(w, "{header}")
}

pub fn print_expr(w: &mut impl Write, idents: &Interner, i: usize, expr: &Expr) -> std::io::Result<()> {
    sp(w, i)?;
    print_expr_line(w, idents, i, expr)
}

/// Prints an expression whose indentation was already written.
fn print_expr_line(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    expr: &Expr,
) -> std::io::Result<()> {
    let span = expr.span;
    match &expr.kind {
        ExprKind::Number(n) => writeln!(w, "number {n} ({span})")?,
        ExprKind::String(s) => writeln!(w, "string {s:?} ({span})")?,
        ExprKind::Bool(b) => writeln!(w, "bool {b} ({span})")?,
        ExprKind::Null => writeln!(w, "null ({span})")?,
        ExprKind::Id(path) => writeln!(w, "id {} ({span})", path.to_dotted_string(idents))?,
        ExprKind::Array(items) => {
            writeln!(w, "array ({span})")?;
            for item in items {
                print_expr(w, idents, i + 1, item)?;
            }
        }
        ExprKind::Unary { op, expr: inner } => {
            writeln!(w, "unary {} ({span})", op.as_str())?;
            print_expr(w, idents, i + 1, inner)?;
        }
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {} ({span})", op.as_str())?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call {} ({span})", callee.to_dotted_string(idents))?;
            for arg in args {
                print_expr(w, idents, i + 1, arg)?;
            }
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
