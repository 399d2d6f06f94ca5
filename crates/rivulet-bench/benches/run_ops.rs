//! Criterion benchmarks for whole runs of the sequential runner.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rivulet_bench::{reference_profile, stream_power_engine, stress_profile};
use rivulet_core::{ApplicationOrder, CapacityPolicy};
use rivulet_engine::KernelEngine;
use rivulet_test_utils::fixtures::receiver_sum_kernel;

/// Benchmark: one stream-power run over the 10K-node raster.
fn bench_stream_power_10k(c: &mut Criterion) {
    let profile = reference_profile();
    let mut engine = stream_power_engine(&profile);

    c.bench_function("stream_power_10k", |b| {
        b.iter(|| {
            black_box(engine.run().unwrap());
        });
    });
}

/// Benchmark: one stream-power run over the ~100K-node raster.
fn bench_stream_power_100k(c: &mut Criterion) {
    let profile = stress_profile();
    let mut engine = stream_power_engine(&profile);

    let mut group = c.benchmark_group("stress");
    group.sample_size(20);
    group.bench_function("stream_power_100k", |b| {
        b.iter(|| {
            black_box(engine.run().unwrap());
        });
    });
    group.finish();
}

/// Benchmark: index order versus breadth-first upstream order.
fn bench_order_overhead_10k(c: &mut Criterion) {
    let profile = reference_profile();
    let mut group = c.benchmark_group("order");
    for order in [ApplicationOrder::Any, ApplicationOrder::BreadthUpstream] {
        let mut engine = KernelEngine::new(
            profile.graph.clone(),
            receiver_sum_kernel(order, CapacityPolicy::Dynamic),
        );
        engine.bind("value", vec![0.0; profile.graph.size()]).unwrap();
        group.bench_function(order.to_string(), |b| {
            b.iter(|| {
                black_box(engine.run().unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_stream_power_10k,
    bench_stream_power_100k,
    bench_order_overhead_10k
);
criterion_main!(benches);
