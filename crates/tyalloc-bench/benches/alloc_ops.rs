//! Criterion micro-benchmarks for typed allocate/deallocate cycles.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tyalloc_bench::{churn, tracked, MIXED_COUNTS};
use tyalloc_test_utils::BoundedAlloc;
use tyalloc_typed::{Instrumented, SystemAlloc, TypedAllocator};

/// Benchmark: single allocate + deallocate of 64 u64 through the system primitive.
fn bench_single_cycle(c: &mut Criterion) {
    let alloc = TypedAllocator::<u64>::new();
    c.bench_function("single_cycle_64", |b| {
        b.iter(|| {
            let h = alloc.allocate(black_box(64)).unwrap();
            black_box(h.address());
            unsafe { alloc.deallocate(h, 64).unwrap() };
        });
    });
}

/// Benchmark: mixed-size batch churn, trusted release.
fn bench_churn_trusted(c: &mut Criterion) {
    let alloc = TypedAllocator::<u64, _>::with_primitive(SystemAlloc);
    c.bench_function("churn_trusted", |b| {
        b.iter(|| black_box(churn(&alloc, MIXED_COUNTS).unwrap()));
    });
}

/// Benchmark: mixed-size batch churn, tracked release (ledger cost).
fn bench_churn_tracked(c: &mut Criterion) {
    let alloc = tracked::<u64>();
    c.bench_function("churn_tracked", |b| {
        b.iter(|| black_box(churn(&alloc, MIXED_COUNTS).unwrap()));
    });
}

/// Benchmark: mixed-size batch churn through the instrumented wrapper.
fn bench_churn_instrumented(c: &mut Criterion) {
    let primitive = Instrumented::new(BoundedAlloc::unbounded());
    let alloc = TypedAllocator::<u64, _>::with_primitive(&primitive);
    c.bench_function("churn_instrumented", |b| {
        b.iter(|| black_box(churn(&alloc, MIXED_COUNTS).unwrap()));
    });
}

/// Benchmark: rejected oversize request (no primitive call).
fn bench_too_large(c: &mut Criterion) {
    let alloc = TypedAllocator::<u8>::new();
    c.bench_function("reject_too_large", |b| {
        b.iter(|| black_box(alloc.allocate(black_box(usize::MAX)).is_err()));
    });
}

criterion_group!(
    benches,
    bench_single_cycle,
    bench_churn_trusted,
    bench_churn_tracked,
    bench_churn_instrumented,
    bench_too_large
);
criterion_main!(benches);
