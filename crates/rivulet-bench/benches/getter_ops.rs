//! Criterion micro-benchmarks for the per-node getter.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use rivulet_bench::reference_profile;
use rivulet_core::{ApplicationOrder, CapacityPolicy};
use rivulet_kernel::{get_node, FlowKernel};
use rivulet_test_utils::fixtures::receiver_sum_kernel;

/// Benchmark: load all 10K nodes into one view, dynamic capacity.
fn bench_getter_dynamic_10k(c: &mut Criterion) {
    let profile = reference_profile();
    let kernel = receiver_sum_kernel(ApplicationOrder::Any, CapacityPolicy::Dynamic);
    let store = kernel.store(Arc::clone(&profile.graph));
    let mut view = kernel.create();

    c.bench_function("getter_dynamic_10k", |b| {
        b.iter(|| {
            for i in 0..store.size() {
                black_box(get_node(i, &store, &mut view));
            }
        });
    });
}

/// Benchmark: same walk with buffers preallocated to the graph maximum.
fn bench_getter_fixed_10k(c: &mut Criterion) {
    let profile = reference_profile();
    let max = profile.graph.max_receivers() as i64;
    let kernel = receiver_sum_kernel(
        ApplicationOrder::Any,
        CapacityPolicy::from_max_receivers(max),
    );
    let store = kernel.store(Arc::clone(&profile.graph));
    let mut view = kernel.create();

    c.bench_function("getter_fixed_10k", |b| {
        b.iter(|| {
            for i in 0..store.size() {
                black_box(get_node(i, &store, &mut view));
            }
        });
    });
}

/// Benchmark: a fresh view per iteration, so the dynamic buffers regrow.
fn bench_getter_cold_view_10k(c: &mut Criterion) {
    let profile = reference_profile();
    let kernel = receiver_sum_kernel(ApplicationOrder::Any, CapacityPolicy::Dynamic);
    let store = kernel.store(Arc::clone(&profile.graph));

    c.bench_function("getter_cold_view_10k", |b| {
        b.iter(|| {
            let mut view = kernel.create();
            for i in 0..store.size() {
                black_box(get_node(i, &store, &mut view));
            }
            kernel.free(view);
        });
    });
}

criterion_group!(
    benches,
    bench_getter_dynamic_10k,
    bench_getter_fixed_10k,
    bench_getter_cold_view_10k
);
criterion_main!(benches);
