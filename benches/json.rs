//! Benchmarks for the JSON dialects
//!
//! Compares the standard and JSON5 presets on the same documents, and the
//! packrat cache against plain backtracking.
//!
//! Run with: cargo bench --bench json

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pegjson::json::{Dialect, ParseFlags};
use pegjson::peg::ParserConfig;

// ============================================================================
// Inputs
// ============================================================================

fn small_document() -> String {
    r#"{"name": "widget", "id": 42, "tags": ["a", "b", "c"], "price": 12.5, "active": true}"#
        .to_string()
}

fn wide_array(count: usize) -> String {
    let items: Vec<String> = (0..count).map(|i| format!("{}.{}", i, i % 7)).collect();
    format!("[{}]", items.join(", "))
}

fn nested_records(count: usize) -> String {
    let records: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"id": {}, "label": "item \"{}\"\n", "meta": {{"flags": [true, false, null], "ratio": -{}e-3}}}}"#,
                i, i, i
            )
        })
        .collect();
    format!(r#"{{"records": [{}]}}"#, records.join(",\n"))
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_presets(c: &mut Criterion) {
    let standard = Dialect::new(ParseFlags::standard()).unwrap();
    let json5 = Dialect::new(ParseFlags::json5()).unwrap();

    let mut group = c.benchmark_group("presets");
    for (name, text) in [
        ("small", small_document()),
        ("array_1000", wide_array(1000)),
        ("records_200", nested_records(200)),
    ] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("standard", name), &text, |b, text| {
            b.iter(|| standard.parse(black_box(text)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("json5", name), &text, |b, text| {
            b.iter(|| json5.parse(black_box(text)).unwrap())
        });
    }
    group.finish();
}

fn bench_memoization(c: &mut Criterion) {
    let json5 = Dialect::new(ParseFlags::json5()).unwrap();
    let text = nested_records(100);

    let mut group = c.benchmark_group("memoization");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("on", |b| {
        b.iter(|| {
            json5
                .parse_with_config(black_box(&text), ParserConfig::default())
                .unwrap()
        })
    });
    group.bench_function("off", |b| {
        b.iter(|| {
            json5
                .parse_with_config(
                    black_box(&text),
                    ParserConfig::default().with_memoization(false),
                )
                .unwrap()
        })
    });
    group.finish();
}

fn bench_grammar_construction(c: &mut Criterion) {
    c.bench_function("build_json5_grammar", |b| {
        b.iter(|| Dialect::new(black_box(ParseFlags::json5())).unwrap())
    });
}

criterion_group!(
    benches,
    bench_presets,
    bench_memoization,
    bench_grammar_construction
);
criterion_main!(benches);
