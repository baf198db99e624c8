//! Criterion benchmarks for block dispatch.
//!
//! Run with: `cargo bench`
//!
//! Measures registry construction, single-block dispatch through the
//! executor, and sequences of increasing length.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use macro_agent::core::metrics::ExecutionStats;
use macro_agent::core::ManifestSet;
use macro_agent::{BlockInvocation, BlockRegistry, CommandExecutor, HandlerContext, ParameterBag, SequenceExecutor};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn executor() -> CommandExecutor {
    let registry = Arc::new(BlockRegistry::with_builtin_modules(&ManifestSet::embedded()));
    CommandExecutor::new(registry, HandlerContext::simulated(), Arc::new(ExecutionStats::new()))
}

fn arithmetic() -> ParameterBag {
    ParameterBag::new()
        .with("value1", 6.0)
        .with("operator", "*")
        .with("value2", 7.0)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn bench_registry_build(c: &mut Criterion) {
    let manifests = ManifestSet::embedded();
    c.bench_function("registry_build", |b| {
        b.iter(|| black_box(BlockRegistry::with_builtin_modules(&manifests).len()))
    });
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn bench_execute(c: &mut Criterion) {
    let executor = executor();
    let mut group = c.benchmark_group("execute");

    let params = arithmetic();
    group.bench_function("value", |b| {
        b.iter(|| black_box(executor.execute("value", &params).success))
    });

    let params = ParameterBag::new().with("text1", "hello ").with("text2", "world");
    group.bench_function("join", |b| {
        b.iter(|| black_box(executor.execute("join", &params).success))
    });

    let params = ParameterBag::new();
    group.bench_function("unknown", |b| {
        b.iter(|| black_box(executor.execute("no_such_block", &params).success))
    });

    group.finish();
}

fn bench_sequence(c: &mut Criterion) {
    let executor = executor();
    let mut group = c.benchmark_group("sequence");

    for len in [10, 100, 1_000] {
        let blocks: Vec<BlockInvocation> = (0..len)
            .map(|i| BlockInvocation::new("value", arithmetic()).with_id(format!("b{}", i)))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &blocks, |b, blocks| {
            b.iter(|| black_box(SequenceExecutor::new(&executor).run(blocks).len()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_registry_build, bench_execute, bench_sequence);
criterion_main!(benches);
