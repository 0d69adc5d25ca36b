//! Benchmark for parsing and path expansion
//!
//! Target: a typical nested submission should analyze in well under 100µs

use conditional_parser_core::expression::{get_or_parse, normalize, parse, remove_literals};
use conditional_parser_core::Analyzer;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const TUTORIAL: &str =
    r#"if ( A || ( B && C("true && false") && ( D(this.isOpen() && this.isFree) || E )) || F ) {"#;

/// A chain of `n` XOR operands, the worst case for path generation
fn xor_chain(n: usize) -> String {
    (0..n)
        .map(|i| format!("c{}", i))
        .collect::<Vec<_>>()
        .join(" ^ ")
}

/// `depth` levels of alternating OR/AND nesting
fn nested(depth: usize) -> String {
    let mut text = "leaf".to_string();
    for level in 0..depth {
        let op = if level % 2 == 0 { "||" } else { "&&" };
        text = format!("x{} {} ({}) {} y{}", level, op, text, op, level);
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let normalized = normalize(TUTORIAL);

    c.bench_function("normalize_tutorial", |b| {
        b.iter(|| normalize(black_box(TUTORIAL)))
    });

    c.bench_function("remove_literals_tutorial", |b| {
        b.iter(|| remove_literals(black_box(&normalized)))
    });

    c.bench_function("parse_tutorial", |b| b.iter(|| parse(black_box(&normalized))));

    c.bench_function("parse_tutorial_cached", |b| {
        b.iter(|| get_or_parse(black_box(&normalized)))
    });

    let mut group = c.benchmark_group("parse_nested");
    for depth in [2usize, 8, 16] {
        let text = nested(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &text, |b, text| {
            b.iter(|| parse(black_box(text)))
        });
    }
    group.finish();
}

fn bench_expand(c: &mut Criterion) {
    let tree = parse(&normalize(TUTORIAL));
    c.bench_function("expand_tutorial", |b| {
        b.iter(|| {
            let t = black_box(&tree);
            (t.expand_true_paths().len(), t.expand_false_paths().len())
        })
    });

    let mut group = c.benchmark_group("expand_nested");
    for depth in [8usize, 16, 32] {
        let tree = parse(&nested(depth));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &tree, |b, tree| {
            b.iter(|| black_box(tree).expand_true_paths().len())
        });
    }
    group.finish();

    let mut group = c.benchmark_group("xor_paths");
    for n in [4usize, 8, 12] {
        let text = xor_chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| parse(black_box(text)).true_paths().len())
        });
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = Analyzer::default();
    c.bench_function("analyze_tutorial", |b| {
        b.iter(|| analyzer.analyze(black_box(TUTORIAL)))
    });
}

criterion_group!(benches, bench_parse, bench_expand, bench_analyze);
criterion_main!(benches);
