//! Criterion benchmarks for feature building.
//!
//! Benchmarks:
//! 1. Full FeatureBuilder::build over synthetic histories of growing size
//! 2. Trailing-mean kernel on a single long entity

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pointcast_core::rolling::{previous, trailing_mean};
use pointcast_core::{synthetic_history, FeatureBuilder, FeatureConfig, SyntheticConfig};

fn bench_build(c: &mut Criterion) {
    let config = FeatureConfig::default();
    let builder = FeatureBuilder::new(config.clone()).unwrap();
    let mut group = c.benchmark_group("feature_build");

    for entities in [50usize, 200, 600] {
        let history = synthetic_history(
            &SyntheticConfig {
                entities,
                periods: 38,
                seed: 1,
            },
            &config,
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(entities), &history, |b, h| {
            b.iter(|| builder.build(black_box(h)).unwrap())
        });
    }
    group.finish();
}

fn bench_windows(c: &mut Criterion) {
    let values: Vec<Option<f64>> = (0..10_000).map(|i| Some((i % 7) as f64)).collect();
    c.bench_function("trailing_mean_5", |b| {
        b.iter(|| trailing_mean(black_box(&values), 5, 1))
    });
    c.bench_function("previous", |b| b.iter(|| previous(black_box(&values))));
}

criterion_group!(benches, bench_build, bench_windows);
criterion_main!(benches);
