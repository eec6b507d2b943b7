//! Benchmarks for the snippet engine.
//!
//! Run with: cargo bench

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use snippet_sandbox::prelude::*;
use tokio::runtime::Runtime;

fn bench_engine() -> SnippetEngine {
    let config = SecurityConfig::builder()
        .max_execution_time(Duration::from_secs(5))
        .build();
    SnippetEngine::new(Arc::new(config))
}

/// Benchmark validation across input sizes.
fn bench_validate(c: &mut Criterion) {
    let engine = bench_engine();

    let mut group = c.benchmark_group("validate");
    for size in [100usize, 1_000, 9_000] {
        let code = "console.log('x');\n".repeat(size / 18 + 1);
        let code = &code[..size.min(code.len())];
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), code, |b, code| {
            b.iter(|| black_box(engine.validate(code, Language::JavaScript)));
        });
    }
    group.finish();
}

/// Benchmark sanitization on code with and without blocked constructs.
fn bench_sanitize(c: &mut Criterion) {
    let engine = bench_engine();

    let benign = "const x = 1 + 1;\nconsole.log(x);\n".repeat(50);
    let hostile = "eval('x'); fetch('u'); el.onclick = run;\n".repeat(50);

    let mut group = c.benchmark_group("sanitize");
    group.bench_function("benign", |b| {
        b.iter(|| black_box(engine.sanitize(&benign, Language::JavaScript)));
    });
    group.bench_function("hostile", |b| {
        b.iter(|| black_box(engine.sanitize(&hostile, Language::JavaScript)));
    });
    group.finish();
}

/// Benchmark full execution, including isolate construction.
fn bench_execute(c: &mut Criterion) {
    let engine = bench_engine();
    let rt = Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("execute");
    group.sample_size(20); // isolate construction dominates

    group.bench_function("arithmetic", |b| {
        b.iter(|| {
            let result = rt.block_on(engine.execute("console.log(6 * 7);", Language::JavaScript));
            black_box(result)
        });
    });

    group.bench_function("loop_10k", |b| {
        b.iter(|| {
            let result = rt.block_on(engine.execute(
                "let t = 0; for (let i = 0; i < 10000; i++) { t += i; } console.log(t);",
                Language::JavaScript,
            ));
            black_box(result)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_validate, bench_sanitize, bench_execute);
criterion_main!(benches);
