//! Criterion benchmarks for quickgen_arbitrary.
//!
//! Benchmarks cover:
//! - Registry resolution, cold and cached
//! - Running a synthesised recursive generator at increasing sizes
//! - Calling a generated function

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quickgen_arbitrary::{function, reflect_sum, Arbitrary, TypeInstanceRegistry};
use quickgen_core::Seed;

#[allow(dead_code)]
enum Expr {
    Lit(i64),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
}

reflect_sum!(Expr {
    Lit(value: i64),
    Neg(inner: Box<Expr>),
    Add(left: Box<Expr>, right: Box<Expr>),
});

/// Benchmark resolution against a fresh registry and a warm one.
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    group.bench_function("cold_expr", |b| {
        b.iter(|| {
            let registry = TypeInstanceRegistry::with_builtins();
            black_box(registry.resolve::<Expr>().is_ok())
        })
    });

    let warm = TypeInstanceRegistry::with_builtins();
    let _ = warm.resolve::<Vec<Option<(u32, String)>>>();
    group.bench_function("cached_nested", |b| {
        b.iter(|| black_box(warm.resolve::<Vec<Option<(u32, String)>>>().is_ok()))
    });

    group.finish();
}

/// Benchmark a synthesised recursive generator.
fn bench_synthesised_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesised_expr");
    let registry = TypeInstanceRegistry::with_builtins();
    let Ok(spec) = registry.resolve::<Expr>() else {
        return;
    };

    for size in [10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut state = 0_u64;
            b.iter(|| {
                state += 1;
                black_box(spec.generator().run(size, Seed::from_u64(state)))
            })
        });
    }

    group.finish();
}

/// Benchmark calling a generated function on list arguments.
fn bench_function_call(c: &mut Criterion) {
    let f = function::<Vec<u32>, u64>(u64::arbitrary()).run(50, Seed::from_u64(1));
    let argument: Vec<u32> = (0..64).collect();

    c.bench_function("function_call_vec64", |b| {
        b.iter(|| black_box(f.call(black_box(&argument))))
    });
}

criterion_group!(
    benches,
    bench_resolve,
    bench_synthesised_run,
    bench_function_call
);
criterion_main!(benches);
