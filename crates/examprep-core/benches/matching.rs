use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examprep_core::matcher::matches;
use examprep_core::remediation::badge_name;

fn bench_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("matches");

    group.bench_function("numeric_equal", |b| {
        b.iter(|| matches(black_box(" = 42 "), black_box(Some("42"))))
    });

    group.bench_function("numeric_decimal", |b| {
        b.iter(|| matches(black_box("0.50"), black_box(Some("0.5"))))
    });

    group.bench_function("text_mismatch", |b| {
        b.iter(|| matches(black_box("forty-two"), black_box(Some("42"))))
    });

    group.bench_function("long_text", |b| {
        let answer = "Photosynthesis converts light energy into chemical energy ".repeat(8);
        b.iter(|| matches(black_box(&answer), black_box(Some(answer.as_str()))))
    });

    group.finish();
}

fn bench_badge_name(c: &mut Criterion) {
    c.bench_function("badge_name", |b| {
        b.iter(|| badge_name(black_box("number_theory")))
    });
}

criterion_group!(benches, bench_matches, bench_badge_name);
criterion_main!(benches);
