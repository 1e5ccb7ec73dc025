//! Optimizer configuration.
//!
//! [`TourConfig`] holds every parameter that controls the generation loop.
//! Out-of-range values are never rejected: [`TourConfig::normalized`]
//! clamps them into their documented ranges and logs what it changed, and
//! the runner always works on the normalized copy.

use crate::distance::DistanceMetric;
use tracing::warn;

/// Upper bound on resolved worker threads when `workers == 0`.
const AUTO_WORKER_CAP: usize = 8;

/// Configuration for the tour optimizer.
///
/// # Defaults
///
/// ```
/// use u_tour::ga::TourConfig;
///
/// let config = TourConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 500);
/// assert_eq!(config.elite_size, 5);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_tour::ga::TourConfig;
///
/// let config = TourConfig::default()
///     .with_population_size(200)
///     .with_tournament_size(5)
///     .with_mutation_rate(0.05)
///     .with_seed(7);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TourConfig {
    /// Number of tours in the population. Range: 2–100 000.
    pub population_size: usize,

    /// Maximum number of generations. Range: at least 1.
    pub max_generations: usize,

    /// Baseline probability of mutating an offspring (0.0–1.0).
    ///
    /// The adaptive controller moves the live rate away from this value
    /// when diversity collapses and back toward it when diversity recovers.
    pub mutation_rate: f64,

    /// Initial probability of applying crossover to a parent pair (0.0–1.0).
    pub crossover_rate: f64,

    /// Number of best tours copied unchanged into the next generation.
    /// Range: 1 to `population_size - 1`.
    pub elite_size: usize,

    /// Tournament size for parent selection. Range: 1 to `population_size`.
    pub tournament_size: usize,

    /// Number of trailing generations inspected for stagnation. At least 2.
    pub convergence_window: usize,

    /// Relative best-distance spread over the window below which the run
    /// is considered converged (0.0–1.0).
    pub convergence_threshold: f64,

    /// Generations that must complete before convergence may stop the run.
    /// Range: 0 to `convergence_window`.
    pub min_generations: usize,

    /// Whether 2-opt refinement is applied to top tours.
    pub local_search: bool,

    /// Probability of refining each of the top tours in a generation (0.0–1.0).
    pub local_search_probability: f64,

    /// Number of best tours eligible for refinement each generation.
    pub local_search_top_k: usize,

    /// Whether offspring may be bred on a worker pool.
    pub parallel: bool,

    /// Worker thread count. `0` resolves to the available parallelism,
    /// capped at 8.
    pub workers: usize,

    /// The parallel path is used only when `population_size` exceeds this.
    pub parallel_threshold: usize,

    /// Whether mutation and crossover rates adapt during the run.
    pub adaptive: bool,

    /// Lower bound for the live mutation rate.
    pub min_mutation_rate: f64,

    /// Upper bound for the live mutation rate.
    pub max_mutation_rate: f64,

    /// Lower bound for the live crossover rate.
    pub min_crossover_rate: f64,

    /// Upper bound for the live crossover rate.
    pub max_crossover_rate: f64,

    /// Fraction of `crossover_rate` removed by the final generation (0.0–1.0).
    pub crossover_decay: f64,

    /// Diversity below this raises the mutation rate (0.0–1.0).
    pub low_diversity: f64,

    /// Diversity above this relaxes the mutation rate toward its baseline.
    pub high_diversity: f64,

    /// Number of recent diversity samples averaged by the controller.
    pub diversity_history: usize,

    /// Maximum number of nearest-neighbour tours seeded into the initial
    /// population.
    pub greedy_seeds: usize,

    /// Distance metric used to build the default distance model.
    pub metric: DistanceMetric,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock limit in milliseconds.
    ///
    /// Checked between generations only, so the run may overshoot by up to
    /// one generation's work.
    pub time_limit_ms: Option<u64>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            mutation_rate: 0.1,
            crossover_rate: 0.9,
            elite_size: 5,
            tournament_size: 3,
            convergence_window: 30,
            convergence_threshold: 0.001,
            min_generations: 20,
            local_search: true,
            local_search_probability: 0.3,
            local_search_top_k: 3,
            parallel: true,
            workers: 0,
            parallel_threshold: 50,
            adaptive: true,
            min_mutation_rate: 0.01,
            max_mutation_rate: 0.5,
            min_crossover_rate: 0.5,
            max_crossover_rate: 0.95,
            crossover_decay: 0.3,
            low_diversity: 0.05,
            high_diversity: 0.25,
            diversity_history: 10,
            greedy_seeds: 10,
            metric: DistanceMetric::Haversine,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl TourConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the baseline mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the initial crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite count.
    pub fn with_elite_size(mut self, n: usize) -> Self {
        self.elite_size = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the convergence window and threshold.
    pub fn with_convergence(mut self, window: usize, threshold: f64) -> Self {
        self.convergence_window = window;
        self.convergence_threshold = threshold.max(0.0);
        self
    }

    /// Sets the generation floor before convergence may stop the run.
    pub fn with_min_generations(mut self, n: usize) -> Self {
        self.min_generations = n;
        self
    }

    /// Enables or disables 2-opt refinement.
    pub fn with_local_search(mut self, enabled: bool) -> Self {
        self.local_search = enabled;
        self
    }

    /// Sets the refinement probability and the number of eligible tours.
    pub fn with_local_search_params(mut self, probability: f64, top_k: usize) -> Self {
        self.local_search_probability = probability.clamp(0.0, 1.0);
        self.local_search_top_k = top_k;
        self
    }

    /// Enables or disables parallel breeding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the worker count (`0` = automatic).
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Sets the population size above which the parallel path is used.
    pub fn with_parallel_threshold(mut self, n: usize) -> Self {
        self.parallel_threshold = n;
        self
    }

    /// Enables or disables adaptive rate control.
    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Sets the distance metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Preset for quick answers: small population, short run.
    ///
    /// - Population: 50, Generations: 200, Time limit: 5s
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            convergence_window: 20,
            time_limit_ms: Some(5_000),
            ..Self::default()
        }
    }

    /// Preset balancing quality and time.
    ///
    /// - Population: 100, Generations: 500, Time limit: 30s
    pub fn balanced() -> Self {
        Self {
            time_limit_ms: Some(30_000),
            ..Self::default()
        }
    }

    /// Preset for best quality on large inputs.
    ///
    /// - Population: 200, Generations: 1000, Time limit: 120s
    pub fn quality() -> Self {
        Self {
            population_size: 200,
            max_generations: 1000,
            elite_size: 10,
            convergence_window: 60,
            convergence_threshold: 0.0005,
            local_search_top_k: 5,
            time_limit_ms: Some(120_000),
            ..Self::default()
        }
    }

    /// Selects a preset from the number of locations.
    ///
    /// - `location_count < 50` → [`fast()`](Self::fast)
    /// - `50 ≤ location_count < 200` → [`balanced()`](Self::balanced)
    /// - `location_count ≥ 200` → [`quality()`](Self::quality)
    pub fn auto_select(location_count: usize) -> Self {
        if location_count < 50 {
            Self::fast()
        } else if location_count < 200 {
            Self::balanced()
        } else {
            Self::quality()
        }
    }

    /// Worker threads to use, resolving `0` to the machine's parallelism.
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(AUTO_WORKER_CAP)
    }

    /// Returns a copy with every field clamped into its documented range.
    ///
    /// Each corrected field is reported with `tracing::warn!`.
    pub fn normalized(&self) -> Self {
        let d = Self::default();
        let mut c = self.clone();

        c.population_size = clamp_count("population_size", c.population_size, 2, 100_000);
        c.max_generations = clamp_count("max_generations", c.max_generations, 1, usize::MAX);
        c.elite_size = clamp_count("elite_size", c.elite_size, 1, c.population_size - 1);
        c.tournament_size = clamp_count("tournament_size", c.tournament_size, 1, c.population_size);
        c.convergence_window = clamp_count("convergence_window", c.convergence_window, 2, usize::MAX);
        // A flat best must stop the run within one window.
        c.min_generations =
            clamp_count("min_generations", c.min_generations, 0, c.convergence_window);
        c.local_search_top_k =
            clamp_count("local_search_top_k", c.local_search_top_k, 0, c.population_size);
        c.workers = clamp_count("workers", c.workers, 0, 256);
        c.diversity_history = clamp_count("diversity_history", c.diversity_history, 1, 1_000);

        c.mutation_rate = clamp_rate("mutation_rate", c.mutation_rate, d.mutation_rate);
        c.crossover_rate = clamp_rate("crossover_rate", c.crossover_rate, d.crossover_rate);
        c.convergence_threshold = clamp_rate(
            "convergence_threshold",
            c.convergence_threshold,
            d.convergence_threshold,
        );
        c.local_search_probability = clamp_rate(
            "local_search_probability",
            c.local_search_probability,
            d.local_search_probability,
        );
        c.crossover_decay = clamp_rate("crossover_decay", c.crossover_decay, d.crossover_decay);

        c.min_mutation_rate = clamp_rate("min_mutation_rate", c.min_mutation_rate, d.min_mutation_rate);
        c.max_mutation_rate = clamp_rate("max_mutation_rate", c.max_mutation_rate, d.max_mutation_rate);
        (c.min_mutation_rate, c.max_mutation_rate) = widen_to_include(
            "mutation_rate bounds",
            c.min_mutation_rate,
            c.max_mutation_rate,
            c.mutation_rate,
        );

        c.min_crossover_rate =
            clamp_rate("min_crossover_rate", c.min_crossover_rate, d.min_crossover_rate);
        c.max_crossover_rate =
            clamp_rate("max_crossover_rate", c.max_crossover_rate, d.max_crossover_rate);
        (c.min_crossover_rate, c.max_crossover_rate) = widen_to_include(
            "crossover_rate bounds",
            c.min_crossover_rate,
            c.max_crossover_rate,
            c.crossover_rate,
        );

        c.low_diversity = clamp_rate("low_diversity", c.low_diversity, d.low_diversity);
        c.high_diversity = clamp_rate("high_diversity", c.high_diversity, d.high_diversity);
        if c.low_diversity > c.high_diversity {
            warn!(
                low = c.low_diversity,
                high = c.high_diversity,
                "diversity thresholds inverted, swapping"
            );
            std::mem::swap(&mut c.low_diversity, &mut c.high_diversity);
        }

        c
    }
}

fn clamp_count(field: &str, value: usize, lo: usize, hi: usize) -> usize {
    let clamped = value.clamp(lo, hi.max(lo));
    if clamped != value {
        warn!(field, value, clamped, "config value out of range, clamped");
    }
    clamped
}

fn clamp_rate(field: &str, value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        warn!(field, fallback, "config value is NaN, using default");
        return fallback;
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        warn!(field, value, clamped, "config value out of range, clamped");
    }
    clamped
}

/// Orders `(lo, hi)` and widens it so that `baseline` lies inside.
fn widen_to_include(field: &str, lo: f64, hi: f64, baseline: f64) -> (f64, f64) {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let widened = (lo.min(baseline), hi.max(baseline));
    if widened != (lo, hi) {
        warn!(field, baseline, lo = widened.0, hi = widened.1, "bounds widened to include baseline");
    }
    widened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TourConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, 500);
        assert!((config.mutation_rate - 0.1).abs() < 1e-10);
        assert!((config.crossover_rate - 0.9).abs() < 1e-10);
        assert_eq!(config.elite_size, 5);
        assert_eq!(config.tournament_size, 3);
        assert_eq!(config.convergence_window, 30);
        assert!(config.parallel);
        assert!(config.local_search);
        assert!(config.adaptive);
        assert_eq!(config.metric, DistanceMetric::Haversine);
        assert!(config.seed.is_none());
        assert!(config.time_limit_ms.is_none());
    }

    #[test]
    fn test_default_is_already_normalized() {
        let config = TourConfig::default();
        assert_eq!(config.normalized(), config);
    }

    #[test]
    fn test_builder_pattern() {
        let config = TourConfig::default()
            .with_population_size(200)
            .with_max_generations(1000)
            .with_elite_size(8)
            .with_tournament_size(5)
            .with_crossover_rate(0.8)
            .with_mutation_rate(0.05)
            .with_convergence(40, 0.002)
            .with_min_generations(10)
            .with_local_search_params(0.5, 4)
            .with_parallel(false)
            .with_workers(3)
            .with_parallel_threshold(10)
            .with_adaptive(false)
            .with_metric(DistanceMetric::Euclidean)
            .with_seed(42)
            .with_time_limit_ms(5000);

        assert_eq!(config.population_size, 200);
        assert_eq!(config.max_generations, 1000);
        assert_eq!(config.elite_size, 8);
        assert_eq!(config.tournament_size, 5);
        assert!((config.crossover_rate - 0.8).abs() < 1e-10);
        assert!((config.mutation_rate - 0.05).abs() < 1e-10);
        assert_eq!(config.convergence_window, 40);
        assert!((config.convergence_threshold - 0.002).abs() < 1e-15);
        assert_eq!(config.min_generations, 10);
        assert!((config.local_search_probability - 0.5).abs() < 1e-10);
        assert_eq!(config.local_search_top_k, 4);
        assert!(!config.parallel);
        assert_eq!(config.workers, 3);
        assert_eq!(config.parallel_threshold, 10);
        assert!(!config.adaptive);
        assert_eq!(config.metric, DistanceMetric::Euclidean);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.time_limit_ms, Some(5000));
    }

    #[test]
    fn test_builder_clamps_rates() {
        let config = TourConfig::default()
            .with_crossover_rate(-0.5)
            .with_mutation_rate(2.0)
            .with_local_search_params(3.0, 2);
        assert_eq!(config.crossover_rate, 0.0);
        assert_eq!(config.mutation_rate, 1.0);
        assert_eq!(config.local_search_probability, 1.0);
    }

    #[test]
    fn test_normalized_clamps_counts() {
        let config = TourConfig {
            population_size: 1,
            max_generations: 0,
            elite_size: 50,
            tournament_size: 0,
            convergence_window: 0,
            local_search_top_k: 99,
            ..TourConfig::default()
        }
        .normalized();

        assert_eq!(config.population_size, 2);
        assert_eq!(config.max_generations, 1);
        assert_eq!(config.elite_size, 1);
        assert_eq!(config.tournament_size, 1);
        assert_eq!(config.convergence_window, 2);
        assert_eq!(config.local_search_top_k, 2);
    }

    #[test]
    fn test_normalized_floor_never_exceeds_window() {
        let config = TourConfig::default().with_convergence(5, 0.001).normalized();
        assert_eq!(config.min_generations, 5);

        let config = TourConfig::default().with_convergence(40, 0.001).normalized();
        assert_eq!(config.min_generations, 20);
    }

    #[test]
    fn test_normalized_elite_zero_becomes_one() {
        let config = TourConfig::default().with_elite_size(0).normalized();
        assert_eq!(config.elite_size, 1);
    }

    #[test]
    fn test_normalized_rates() {
        let config = TourConfig {
            mutation_rate: f64::NAN,
            crossover_rate: 4.0,
            convergence_threshold: -1.0,
            ..TourConfig::default()
        }
        .normalized();
        assert!((config.mutation_rate - 0.1).abs() < 1e-12);
        assert_eq!(config.crossover_rate, 1.0);
        assert_eq!(config.convergence_threshold, 0.0);
    }

    #[test]
    fn test_normalized_bounds_contain_baseline() {
        let config = TourConfig {
            mutation_rate: 0.8,
            min_mutation_rate: 0.4,
            max_mutation_rate: 0.2,
            crossover_rate: 0.3,
            ..TourConfig::default()
        }
        .normalized();
        assert!((config.min_mutation_rate - 0.2).abs() < 1e-12);
        assert!((config.max_mutation_rate - 0.8).abs() < 1e-12);
        assert!(config.min_crossover_rate <= 0.3);
    }

    #[test]
    fn test_normalized_swaps_diversity_thresholds() {
        let config = TourConfig {
            low_diversity: 0.6,
            high_diversity: 0.1,
            ..TourConfig::default()
        }
        .normalized();
        assert!(config.low_diversity < config.high_diversity);
    }

    #[test]
    fn test_resolved_workers() {
        assert_eq!(TourConfig::default().with_workers(3).resolved_workers(), 3);
        let auto = TourConfig::default().resolved_workers();
        assert!((1..=AUTO_WORKER_CAP).contains(&auto));
    }

    #[test]
    fn test_presets_normalized() {
        for config in [TourConfig::fast(), TourConfig::balanced(), TourConfig::quality()] {
            assert_eq!(config.normalized(), config);
            assert!(config.time_limit_ms.is_some());
        }
    }

    #[test]
    fn test_auto_select_boundaries() {
        assert_eq!(TourConfig::auto_select(10).population_size, 50);
        assert_eq!(TourConfig::auto_select(49).population_size, 50);
        assert_eq!(TourConfig::auto_select(50).population_size, 100);
        assert_eq!(TourConfig::auto_select(199).population_size, 100);
        assert_eq!(TourConfig::auto_select(200).population_size, 200);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_override_uses_defaults() {
        let config: TourConfig =
            serde_json::from_str(r#"{"population_size": 40, "metric": "euclidean"}"#).unwrap();
        assert_eq!(config.population_size, 40);
        assert_eq!(config.metric, DistanceMetric::Euclidean);
        assert_eq!(config.max_generations, 500);
    }
}
