use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use titan::{parser, util::intern::Interner};

static INPUT: &str = include_str!("../../demos/showcase.tn");

fn parse(input: &str) {
    let mut idents = Interner::with_capacity(128);
    let program = parser::parse_program(input, &mut idents);
    black_box(program.is_ok());
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse", |b| b.iter(|| parse(black_box(INPUT))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
