//! Criterion benchmarks for the tour optimizer.
//!
//! Uses random stops scattered over a city-sized box to measure the
//! generation loop, 2-opt, and distance-matrix construction.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_tour::distance::{DistanceMatrix, Location};
use u_tour::ga::local_search::{LocalSearch, TwoOpt};
use u_tour::ga::{Tour, TourConfig, TourRunner};
use u_tour::random::create_rng;

// ===========================================================================
// Instances
// ===========================================================================

fn random_stops(n: usize, seed: u64) -> Vec<Location> {
    let mut rng = create_rng(seed);
    (0..n)
        .map(|i| {
            Location::new(
                format!("stop-{i}"),
                37.45 + rng.random_range(0.0..0.2),
                126.85 + rng.random_range(0.0..0.3),
            )
        })
        .collect()
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_runner(c: &mut Criterion) {
    let mut group = c.benchmark_group("tour_runner");
    group.sample_size(10);

    for n in [50usize, 100] {
        let stops = random_stops(n, 42);
        for parallel in [false, true] {
            let config = TourConfig::default()
                .with_population_size(100)
                .with_max_generations(50)
                .with_convergence(1_000, 0.0)
                .with_parallel(parallel)
                .with_seed(42);
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(
                BenchmarkId::new(label, n),
                &(stops.clone(), config),
                |b, (s, c)| {
                    b.iter(|| {
                        let result = TourRunner::run(black_box(s), black_box(c));
                        black_box(result)
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_two_opt(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_opt");
    group.sample_size(20);

    for n in [50usize, 100, 200] {
        let stops = random_stops(n, 7);
        let model = DistanceMatrix::haversine(&stops);
        let tour = Tour::identity(&model);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(model, tour), |b, (m, t)| {
            b.iter(|| black_box(TwoOpt::default().improve(black_box(t), m)))
        });
    }
    group.finish();
}

fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("haversine_matrix");

    for n in [100usize, 500] {
        let stops = random_stops(n, 3);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stops, |b, s| {
            b.iter(|| black_box(DistanceMatrix::haversine(black_box(s))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_runner, bench_two_opt, bench_matrix);
criterion_main!(benches);
