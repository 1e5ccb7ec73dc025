//! Generation loop execution.
//!
//! [`TourRunner`] wires the components together:
//! distance model → initial population → per generation
//! (adapt rates → breed → refine → track best → record → convergence check)
//! → map the best order back onto the caller's locations.

use super::adaptive::{diversity, AdaptiveController, Rates};
use super::config::TourConfig;
use super::convergence::ConvergenceMonitor;
use super::local_search::{LocalSearch, TwoOpt};
#[cfg(feature = "parallel")]
use super::errors::BatchError;
#[cfg(feature = "parallel")]
use super::parallel::{breed_batch, merge_batches, BatchTask, ParallelEvaluator};
use super::population::initial_population;
use super::reproduction::{assemble, breed};
use super::types::{is_permutation, sort_by_fitness, Tour};
use crate::distance::{DistanceMatrix, DistanceModel, GeoPoint};
use crate::random::create_rng;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Why the generation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopReason {
    /// Fewer than three locations; no search was needed.
    TrivialInput,
    /// `max_generations` completed.
    MaxGenerations,
    /// The convergence monitor detected stagnation.
    Converged,
    /// The wall-clock limit was reached.
    TimeLimit,
    /// The cancellation flag was set.
    Cancelled,
}

/// Snapshot of one completed generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationRecord {
    /// 1-based generation number.
    pub generation: usize,
    /// Best distance seen so far in the run.
    pub best_distance: f64,
    /// Mean distance of this generation's population.
    pub mean_distance: f64,
    /// Time since the run started.
    pub elapsed: Duration,
    /// Mutation rate in effect for this generation.
    pub mutation_rate: f64,
    /// Crossover rate in effect for this generation.
    pub crossover_rate: f64,
    /// Population diversity the rates were derived from.
    pub diversity: f64,
}

/// Summary of an optimization run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourMetrics {
    /// Number of generations executed.
    pub generations_run: usize,
    /// Wall-clock time of the whole call.
    pub total_time: Duration,
    /// Distance of the input order.
    pub initial_distance: f64,
    /// Distance of the returned order.
    pub final_distance: f64,
    /// `(initial - final) / initial * 100`, or 0 when `initial` is 0.
    pub improvement_percent: f64,
    /// Population size actually used (0 for trivial input).
    pub population_size: usize,
    /// Whether at least one generation was bred on the worker pool.
    pub used_parallel: bool,
    /// Whether local search was attempted at least once.
    pub used_local_search: bool,
    /// Generation at which convergence stopped the run, if it did.
    pub convergence_generations: Option<usize>,
    /// Why the run ended.
    pub stop_reason: StopReason,
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct TourResult<L> {
    /// The caller's locations in optimized visiting order.
    pub locations: Vec<L>,
    /// Input indices in optimized visiting order.
    pub order: Vec<usize>,
    /// Run summary.
    pub metrics: TourMetrics,
    /// One record per completed generation.
    pub history: Vec<GenerationRecord>,
}

/// Executes the tour optimization.
///
/// # Usage
///
/// ```
/// use u_tour::distance::Location;
/// use u_tour::ga::{TourConfig, TourRunner};
///
/// let stops = vec![
///     Location::new("a", 37.55, 126.97),
///     Location::new("b", 37.51, 127.06),
///     Location::new("c", 37.57, 127.00),
///     Location::new("d", 37.49, 126.92),
///     Location::new("e", 37.60, 127.03),
/// ];
/// let config = TourConfig::fast().with_seed(42).with_max_generations(30);
/// let result = TourRunner::run(&stops, &config);
///
/// assert_eq!(result.locations.len(), 5);
/// assert!(result.metrics.final_distance <= result.metrics.initial_distance);
/// ```
pub struct TourRunner;

impl TourRunner {
    /// Optimizes the visiting order of `locations`.
    ///
    /// Builds a [`DistanceMatrix`] with `config.metric` and refines with
    /// [`TwoOpt`].
    pub fn run<L: GeoPoint + Clone>(locations: &[L], config: &TourConfig) -> TourResult<L> {
        Self::run_with_cancel(locations, config, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// before the next generation and returns the best order found so far.
    pub fn run_with_cancel<L: GeoPoint + Clone>(
        locations: &[L],
        config: &TourConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> TourResult<L> {
        if locations.len() < 2 {
            return trivial_result(locations, 0.0, Instant::now());
        }
        let model = DistanceMatrix::build(locations, config.metric);
        Self::run_with_backend(locations, &model, &TwoOpt::default(), config, cancel)
    }

    /// Runs with caller-supplied distance and local search backends.
    ///
    /// # Panics
    /// Panics if `model.len()` differs from `locations.len()` for two or
    /// more locations.
    pub fn run_with_backend<L, D, S>(
        locations: &[L],
        model: &D,
        local_search: &S,
        config: &TourConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> TourResult<L>
    where
        L: GeoPoint + Clone,
        D: DistanceModel + ?Sized,
        S: LocalSearch,
    {
        let start = Instant::now();
        let n = locations.len();
        if n < 2 {
            return trivial_result(locations, 0.0, start);
        }
        assert_eq!(
            model.len(),
            n,
            "distance model covers {} stops but {} locations were given",
            model.len(),
            n
        );
        if n == 2 {
            return trivial_result(locations, model.tour_distance(&[0, 1]), start);
        }

        let config = config.normalized();
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        info!(
            stops = n,
            population = config.population_size,
            max_generations = config.max_generations,
            local_search = local_search.name(),
            "starting tour optimization"
        );

        // 1. Initial population
        let initial_distance = model.tour_distance(&(0..n).collect::<Vec<_>>());
        let mut population =
            initial_population(model, config.population_size, config.greedy_seeds, &mut rng);
        let mut best = population[0].clone();

        // 2. Collaborators
        let mut rates = Rates::from_config(&config);
        let mut controller = AdaptiveController::new(&config);
        let mut monitor = ConvergenceMonitor::new(
            config.convergence_window,
            config.convergence_threshold,
            config.min_generations,
        );
        #[cfg(feature = "parallel")]
        let pool = build_pool(&config);

        let elite_count = config.elite_size;
        let offspring_count = config.population_size - elite_count;
        let deadline = config.time_limit_ms.map(Duration::from_millis);

        let mut history = Vec::with_capacity(config.max_generations.min(4096));
        let mut stop_reason = StopReason::MaxGenerations;
        let mut convergence_generations = None;
        let mut used_parallel = false;
        let mut used_local_search = false;

        // 3. Generation loop
        for generation in 0..config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    stop_reason = StopReason::Cancelled;
                    break;
                }
            }
            if deadline.is_some_and(|limit| start.elapsed() >= limit) {
                stop_reason = StopReason::TimeLimit;
                break;
            }

            // (a) Adapt rates
            let diversity = if config.adaptive {
                controller.update(&mut rates, &population, generation, config.max_generations)
            } else {
                diversity(&population)
            };

            // (b) Breed
            #[cfg(feature = "parallel")]
            let pooled = pool.as_ref().and_then(|pool| {
                breed_on_pool(
                    pool,
                    offspring_count,
                    rates,
                    config.tournament_size,
                    &mut rng,
                    generation,
                    |task| breed_batch(task, &population, model),
                )
            });
            #[cfg(not(feature = "parallel"))]
            let pooled: Option<Vec<Tour>> = None;

            let (offspring, from_pool) = top_up_offspring(
                pooled,
                &population,
                model,
                offspring_count,
                rates,
                config.tournament_size,
                &mut rng,
            );
            used_parallel |= from_pool;
            population = assemble(&population[..elite_count], offspring, config.population_size);

            // (c) Refine
            if config.local_search {
                used_local_search |= refine_top(
                    &mut population,
                    model,
                    local_search,
                    config.local_search_top_k,
                    config.local_search_probability,
                    &mut rng,
                );
            }

            // (d) Track best
            if population[0].distance() < best.distance() {
                best = population[0].clone();
            }

            // (e) Record
            let mean_distance =
                population.iter().map(Tour::distance).sum::<f64>() / population.len() as f64;
            let record = GenerationRecord {
                generation: generation + 1,
                best_distance: best.distance(),
                mean_distance,
                elapsed: start.elapsed(),
                mutation_rate: rates.mutation_rate,
                crossover_rate: rates.crossover_rate,
                diversity,
            };
            debug!(
                generation = record.generation,
                best = record.best_distance,
                mean = record.mean_distance,
                mutation_rate = record.mutation_rate,
                crossover_rate = record.crossover_rate,
                diversity = record.diversity,
                "generation complete"
            );
            history.push(record);

            // (f) Convergence
            if monitor.observe(best.distance()) {
                stop_reason = StopReason::Converged;
                convergence_generations = Some(generation + 1);
                break;
            }
        }

        let final_distance = best.distance();
        let order = best.into_order();
        let metrics = TourMetrics {
            generations_run: history.len(),
            total_time: start.elapsed(),
            initial_distance,
            final_distance,
            improvement_percent: improvement_percent(initial_distance, final_distance),
            population_size: config.population_size,
            used_parallel,
            used_local_search,
            convergence_generations,
            stop_reason,
        };

        info!(
            generations = metrics.generations_run,
            initial = metrics.initial_distance,
            final_distance = metrics.final_distance,
            improvement_percent = metrics.improvement_percent,
            stop_reason = ?metrics.stop_reason,
            elapsed_ms = metrics.total_time.as_millis() as u64,
            "tour optimization finished"
        );

        TourResult {
            locations: order.iter().map(|&i| locations[i].clone()).collect(),
            order,
            metrics,
            history,
        }
    }
}

/// Result for inputs that need no search: the input order, unchanged.
fn trivial_result<L: Clone>(locations: &[L], distance: f64, start: Instant) -> TourResult<L> {
    TourResult {
        locations: locations.to_vec(),
        order: (0..locations.len()).collect(),
        metrics: TourMetrics {
            generations_run: 0,
            total_time: start.elapsed(),
            initial_distance: distance,
            final_distance: distance,
            improvement_percent: 0.0,
            population_size: 0,
            used_parallel: false,
            used_local_search: false,
            convergence_generations: None,
            stop_reason: StopReason::TrivialInput,
        },
        history: Vec::new(),
    }
}

fn improvement_percent(initial: f64, final_distance: f64) -> f64 {
    if initial > 0.0 {
        (initial - final_distance) / initial * 100.0
    } else {
        0.0
    }
}

/// Creates the worker pool when the configuration calls for one.
#[cfg(feature = "parallel")]
fn build_pool(config: &TourConfig) -> Option<ParallelEvaluator> {
    if !config.parallel || config.population_size <= config.parallel_threshold {
        return None;
    }
    match ParallelEvaluator::new(config.resolved_workers()) {
        Ok(pool) => {
            debug!(workers = pool.workers(), "parallel breeding enabled");
            Some(pool)
        }
        Err(err) => {
            warn!(error = %err, "worker pool unavailable, breeding sequentially");
            None
        }
    }
}

/// Breeds `count` offspring on the pool with `work` run once per batch.
///
/// Returns the surviving batches in index order, or `None` if every batch
/// failed.
#[cfg(feature = "parallel")]
pub(crate) fn breed_on_pool<R, F>(
    pool: &ParallelEvaluator,
    count: usize,
    rates: Rates,
    tournament_size: usize,
    rng: &mut R,
    generation: usize,
    work: F,
) -> Option<Vec<Tour>>
where
    R: Rng,
    F: Fn(&BatchTask) -> Result<Vec<Tour>, BatchError> + Sync,
{
    let tasks = pool.plan(count, rng.random::<u64>(), rates, tournament_size);
    let kids = merge_batches(pool.run(&tasks, work));
    if kids.is_none() {
        warn!(generation, "all offspring batches failed, breeding sequentially");
    }
    kids
}

/// Completes `pooled` to exactly `count` offspring with sequential
/// breeding. The flag reports whether any offspring came from the pool.
pub(crate) fn top_up_offspring<D, R>(
    pooled: Option<Vec<Tour>>,
    population: &[Tour],
    model: &D,
    count: usize,
    rates: Rates,
    tournament_size: usize,
    rng: &mut R,
) -> (Vec<Tour>, bool)
where
    D: DistanceModel + ?Sized,
    R: Rng,
{
    let (mut offspring, from_pool) = match pooled {
        Some(kids) => (kids, true),
        None => (Vec::with_capacity(count), false),
    };
    offspring.truncate(count);
    if offspring.len() < count {
        let missing = count - offspring.len();
        offspring.extend(breed(population, model, missing, rates, tournament_size, rng));
    }
    (offspring, from_pool)
}

/// Applies local search to each of the top `top_k` tours with
/// probability `probability`. Returns whether any attempt was made.
fn refine_top<D, S, R>(
    population: &mut [Tour],
    model: &D,
    local_search: &S,
    top_k: usize,
    probability: f64,
    rng: &mut R,
) -> bool
where
    D: DistanceModel + ?Sized,
    S: LocalSearch,
    R: Rng,
{
    let stops = model.len();
    let mut attempted = false;
    let mut improved = false;

    for tour in population.iter_mut().take(top_k) {
        if rng.random_range(0.0..1.0) >= probability {
            continue;
        }
        attempted = true;
        let refined = local_search.improve(tour, model);
        if !is_permutation(refined.order(), stops) {
            warn!(backend = local_search.name(), "local search returned an invalid tour, ignored");
            continue;
        }
        if refined.distance() < tour.distance() {
            *tour = refined;
            improved = true;
        }
    }

    if improved {
        sort_by_fitness(population);
    }
    attempted
}

// ============================================================================
// Tests
// ============================================================================
