use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use titan::{codegen, parser, util::intern::Interner};

static INPUT: &str = include_str!("../../demos/showcase.tn");

fn criterion_benchmark(c: &mut Criterion) {
    let mut idents = Interner::with_capacity(128);
    let Ok(program) = parser::parse_program(INPUT, &mut idents) else {
        panic!("showcase should parse");
    };
    c.bench_function("generate", |b| {
        b.iter(|| black_box(codegen::generate(black_box(&program), &idents).program.len()))
    });
    c.bench_function("compile", |b| {
        b.iter(|| black_box(titan::compile(black_box(INPUT)).is_ok()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
