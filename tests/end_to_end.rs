//! End-to-end runs through the public API.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use u_tour::distance::{haversine_m, DistanceMatrix, DistanceModel, DistanceMetric, Location};
use u_tour::ga::{is_permutation, StopReason, TourConfig, TourRunner};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn unit_square() -> Vec<Location> {
    vec![
        Location::new("sw", 0.0, 0.0),
        Location::new("ne", 1.0, 1.0),
        Location::new("nw", 0.0, 1.0),
        Location::new("se", 1.0, 0.0),
    ]
}

/// A 5 x 5 grid of stops 0.01° apart, listed in a scrambled order.
fn city_grid() -> Vec<Location> {
    let mut stops = Vec::new();
    for k in 0..25usize {
        let cell = (k * 7) % 25;
        let (row, col) = (cell / 5, cell % 5);
        stops.push(Location::new(
            format!("r{row}c{col}"),
            37.50 + row as f64 * 0.01,
            127.00 + col as f64 * 0.01,
        ));
    }
    stops
}

fn small_run() -> TourConfig {
    TourConfig::default()
        .with_population_size(20)
        .with_max_generations(50)
        .with_parallel(false)
        .with_seed(42)
}

#[test]
fn empty_and_single_inputs_are_returned_unchanged() {
    init_tracing();
    let empty: Vec<Location> = Vec::new();
    let result = TourRunner::run(&empty, &TourConfig::default());
    assert!(result.locations.is_empty());
    assert_eq!(result.metrics.generations_run, 0);
    assert_eq!(result.metrics.final_distance, 0.0);

    let single = vec![Location::new("home", 37.5, 127.0)];
    let result = TourRunner::run(&single, &TourConfig::default());
    assert_eq!(result.locations, single);
    assert_eq!(result.metrics.generations_run, 0);
    assert_eq!(result.metrics.final_distance, 0.0);
}

#[test]
fn two_locations_cost_a_round_trip() {
    init_tracing();
    let pair = vec![Location::new("a", 37.5, 127.0), Location::new("b", 35.1, 129.0)];
    let result = TourRunner::run(&pair, &TourConfig::default());
    let leg = haversine_m(37.5, 127.0, 35.1, 129.0);
    assert!((result.metrics.final_distance - 2.0 * leg).abs() < 1e-6);
    assert_eq!(result.metrics.generations_run, 0);
    assert_eq!(result.metrics.stop_reason, StopReason::TrivialInput);
}

#[test]
fn unit_square_euclidean_finds_perimeter() {
    init_tracing();
    let config = small_run().with_metric(DistanceMetric::Euclidean);
    let result = TourRunner::run(&unit_square(), &config);
    assert!((result.metrics.final_distance - 4.0).abs() < 1e-9);
    // The input order crosses the square, so the optimizer must improve it.
    assert!(result.metrics.improvement_percent > 0.0);
}

#[test]
fn unit_square_haversine_finds_perimeter() {
    init_tracing();
    let square = unit_square();
    let result = TourRunner::run(&square, &small_run());

    let model = DistanceMatrix::haversine(&square);
    // sw -> nw -> ne -> se -> sw
    let perimeter = model.tour_distance(&[0, 2, 1, 3]);
    assert!((result.metrics.final_distance - perimeter).abs() < 1e-6);
    assert!(result.metrics.improvement_percent >= 0.0);
}

#[test]
fn grid_tour_is_near_optimal() {
    init_tracing();
    let grid = city_grid();
    let config = TourConfig::default()
        .with_parallel(false)
        .with_max_generations(300)
        .with_seed(7);
    let result = TourRunner::run(&grid, &config);

    assert!(is_permutation(&result.order, 25));
    // An odd grid's optimum is under 26 steps; bound by the longer
    // (north-south) step with a loose margin.
    let step = haversine_m(37.50, 127.00, 37.51, 127.00);
    assert!(
        result.metrics.final_distance < 26.0 * step * 1.3,
        "distance {} too far from optimum",
        result.metrics.final_distance
    );
    assert!(result.metrics.improvement_percent > 0.0);
}

#[test]
fn parallel_and_sequential_both_produce_valid_tours() {
    init_tracing();
    let grid = city_grid();
    let base = TourConfig::default()
        .with_population_size(80)
        .with_parallel_threshold(50)
        .with_workers(4)
        .with_max_generations(60)
        .with_seed(11);

    let sequential = TourRunner::run(&grid, &base.clone().with_parallel(false));
    let parallel = TourRunner::run(&grid, &base.with_parallel(true));

    assert!(!sequential.metrics.used_parallel);
    assert_eq!(parallel.metrics.used_parallel, cfg!(feature = "parallel"));
    for result in [&sequential, &parallel] {
        assert!(is_permutation(&result.order, 25));
        assert!(result.metrics.final_distance <= result.metrics.initial_distance);
    }
}

#[test]
fn preset_runs_within_its_time_limit() {
    init_tracing();
    let grid = city_grid();
    let config = TourConfig::auto_select(grid.len()).with_seed(3);
    assert_eq!(config.population_size, 50);
    let result = TourRunner::run(&grid, &config);
    assert!(result.metrics.total_time.as_millis() < 5_000 + 1_000);
    assert!(is_permutation(&result.order, 25));
}

#[test]
fn cancelled_run_still_returns_a_tour() {
    init_tracing();
    let grid = city_grid();
    let cancel = Arc::new(AtomicBool::new(true));
    let result = TourRunner::run_with_cancel(&grid, &small_run(), Some(cancel));
    assert_eq!(result.metrics.stop_reason, StopReason::Cancelled);
    assert_eq!(result.metrics.generations_run, 0);
    assert!(is_permutation(&result.order, 25));
}

#[test]
fn time_limit_bounds_the_run() {
    init_tracing();
    let grid = city_grid();
    let config = small_run()
        .with_max_generations(10_000_000)
        .with_convergence(10_000_000, 0.0)
        .with_time_limit_ms(30);
    let result = TourRunner::run(&grid, &config);
    assert_eq!(result.metrics.stop_reason, StopReason::TimeLimit);
}

#[test]
fn references_can_be_optimized_without_cloning_stops() {
    let grid = city_grid();
    let refs: Vec<&Location> = grid.iter().collect();
    let result = TourRunner::run(&refs, &small_run());
    assert_eq!(result.locations.len(), 25);
    for (loc, &i) in result.locations.iter().zip(&result.order) {
        assert!(std::ptr::eq(*loc, &grid[i]));
    }
}

#[cfg(feature = "serde")]
#[test]
fn metrics_and_config_serialize() {
    let result = TourRunner::run(&unit_square(), &small_run());
    let json = serde_json::to_string(&result.metrics).unwrap();
    let back: u_tour::ga::TourMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(back.generations_run, result.metrics.generations_run);
    assert_eq!(back.stop_reason, result.metrics.stop_reason);
    assert!((back.final_distance - result.metrics.final_distance).abs() < 1e-6);

    let config = TourConfig::quality().with_seed(9);
    let json = serde_json::to_string(&config).unwrap();
    let back: TourConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let locs: Vec<Location> = serde_json::from_str(&serde_json::to_string(&result.locations).unwrap()).unwrap();
    assert_eq!(locs, result.locations);
}
