//! Benchmarks for markdown layout.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use notedeck::document::{MarkdownRenderer, parse_with_layout, render_enhanced};

fn bench_parse_simple(c: &mut Criterion) {
    let md = "# Hello\n\nWorld";
    c.bench_function("parse_simple", |b| {
        b.iter(|| parse_with_layout(black_box(md), black_box(80)))
    });
}

fn bench_parse_medium(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/simple.md");
    c.bench_function("parse_medium", |b| {
        b.iter(|| parse_with_layout(black_box(md), black_box(80)))
    });
}

fn bench_render_enhanced(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/simple.md");
    c.bench_function("render_enhanced", |b| {
        b.iter(|| render_enhanced(&MarkdownRenderer, black_box(md), black_box(60)))
    });
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_medium,
    bench_render_enhanced
);
criterion_main!(benches);
