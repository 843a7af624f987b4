//! Criterion micro-benchmarks for source aggregation and dispatch.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use fvopt_bench::{source_profile, temperature};

/// Benchmark: Aggregate 8 sources over 10K cells.
fn bench_source_8x10k(c: &mut Criterion) {
    let (_mesh, mut options) = source_profile(10_000, 8);
    let t = temperature(10_000, 300.0);

    c.bench_function("source_8x10k", |b| {
        b.iter(|| {
            let eqn = options.source(&t).unwrap();
            black_box(&eqn);
        });
    });
}

/// Benchmark: Dispatch to 64 sources on a small mesh, where per-option
/// overhead dominates.
fn bench_source_64x100(c: &mut Criterion) {
    let (_mesh, mut options) = source_profile(100, 64);
    let t = temperature(100, 300.0);

    c.bench_function("source_64x100", |b| {
        b.iter(|| {
            let eqn = options.source(&t).unwrap();
            black_box(&eqn);
        });
    });
}

/// Benchmark: A full step cycle including the bookkeeping check at the
/// time-index transition.
fn bench_step_cycle(c: &mut Criterion) {
    let (mesh, mut options) = source_profile(1_000, 8);
    let t = temperature(1_000, 300.0);

    c.bench_function("step_cycle_8x1k", |b| {
        b.iter(|| {
            mesh.advance();
            let eqn = options.source(&t).unwrap();
            black_box(&eqn);
        });
    });
}

criterion_group!(
    benches,
    bench_source_8x10k,
    bench_source_64x100,
    bench_step_cycle
);
criterion_main!(benches);
