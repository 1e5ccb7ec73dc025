//! Parallel offspring breeding on a fixed-size worker pool.
//!
//! Each generation the runner splits the offspring it needs into
//! [`BatchTask`]s, one per worker. Every task carries its own seed and a
//! copy of the generation's [`Rates`]; workers read the population snapshot
//! and the distance model but write nothing shared. Results come back over
//! a bounded channel and are merged in batch-index order, so the merged
//! population does not depend on which worker finished first.
//!
//! A batch that panics or returns malformed tours is dropped with a
//! warning. If every batch fails, [`merge_batches`] returns `None` and the
//! runner breeds that generation sequentially.

use super::adaptive::Rates;
use super::errors::{BatchError, PoolError};
use super::reproduction::breed;
use super::types::{is_permutation, Tour};
use crate::distance::DistanceModel;
use crate::random::{create_rng, derive_seed};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use tracing::{debug, warn};

/// One unit of offspring work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchTask {
    /// Position in the generation's batch list.
    pub index: usize,
    /// Number of offspring to produce.
    pub size: usize,
    /// Seed for this batch's private RNG.
    pub seed: u64,
    /// Rates frozen at the start of the generation.
    pub rates: Rates,
    /// Tournament size for parent selection.
    pub tournament_size: usize,
}

/// Outcome of one batch, tagged with its index.
pub type BatchOutcome = (usize, Result<Vec<Tour>, BatchError>);

/// Fixed-size worker pool for offspring batches.
pub struct ParallelEvaluator {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for ParallelEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelEvaluator")
            .field("workers", &self.workers)
            .finish()
    }
}

impl ParallelEvaluator {
    /// Builds a pool with `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("u-tour-worker-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Splits `offspring` into at most one batch per worker.
    ///
    /// Batch sizes differ by at most one. Batch `i` is seeded with
    /// `derive_seed(base_seed, i)`.
    pub fn plan(
        &self,
        offspring: usize,
        base_seed: u64,
        rates: Rates,
        tournament_size: usize,
    ) -> Vec<BatchTask> {
        let batches = self.workers.min(offspring);
        if batches == 0 {
            return Vec::new();
        }
        let base = offspring / batches;
        let extra = offspring % batches;
        (0..batches)
            .map(|index| BatchTask {
                index,
                size: base + usize::from(index < extra),
                seed: derive_seed(base_seed, index as u64),
                rates,
                tournament_size,
            })
            .collect()
    }

    /// Runs `work` for every task on the pool and waits for all of them.
    ///
    /// Panics inside `work` are caught and reported as
    /// [`BatchError::Panicked`]. Outcomes are returned sorted by batch index.
    pub fn run<F>(&self, tasks: &[BatchTask], work: F) -> Vec<BatchOutcome>
    where
        F: Fn(&BatchTask) -> Result<Vec<Tour>, BatchError> + Sync,
    {
        let (tx, rx) = mpsc::sync_channel::<BatchOutcome>(tasks.len().max(1));
        let work = &work;

        self.pool.scope(|scope| {
            for task in tasks {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(task)))
                        .unwrap_or_else(|payload| {
                            Err(BatchError::Panicked {
                                batch: task.index,
                                message: panic_message(payload.as_ref()),
                            })
                        });
                    // The receiver lives until after the scope joins.
                    let _ = tx.send((task.index, outcome));
                });
            }
        });
        drop(tx);

        let mut outcomes: Vec<BatchOutcome> = rx.into_iter().collect();
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes
    }

    /// Breeds one generation's offspring across the pool.
    ///
    /// Returns the successful batches concatenated in index order, or
    /// `None` if every batch failed.
    pub fn breed_generation<D>(
        &self,
        snapshot: &[Tour],
        model: &D,
        tasks: &[BatchTask],
    ) -> Option<Vec<Tour>>
    where
        D: DistanceModel + ?Sized,
    {
        let outcomes = self.run(tasks, |task| breed_batch(task, snapshot, model));
        merge_batches(outcomes)
    }
}

/// Breeds and validates one batch with its own seeded RNG.
pub fn breed_batch<D>(task: &BatchTask, snapshot: &[Tour], model: &D) -> Result<Vec<Tour>, BatchError>
where
    D: DistanceModel + ?Sized,
{
    let mut rng = create_rng(task.seed);
    let tours = breed(
        snapshot,
        model,
        task.size,
        task.rates,
        task.tournament_size,
        &mut rng,
    );

    if tours.len() != task.size {
        return Err(BatchError::WrongSize {
            batch: task.index,
            got: tours.len(),
            expected: task.size,
        });
    }
    let stops = model.len();
    if tours.iter().any(|t| !is_permutation(t.order(), stops)) {
        return Err(BatchError::InvalidTour {
            batch: task.index,
            stops,
        });
    }
    Ok(tours)
}

/// Concatenates successful batches, logging and dropping failed ones.
///
/// Returns `None` when no batch succeeded (including an empty outcome
/// list).
pub fn merge_batches(outcomes: Vec<BatchOutcome>) -> Option<Vec<Tour>> {
    let total = outcomes.len();
    let mut merged = Vec::new();
    let mut succeeded = 0usize;

    for (index, outcome) in outcomes {
        match outcome {
            Ok(tours) => {
                succeeded += 1;
                merged.extend(tours);
            }
            Err(err) => warn!(batch = index, error = %err, "dropping failed offspring batch"),
        }
    }

    if succeeded == 0 {
        return None;
    }
    if succeeded < total {
        debug!(succeeded, total, "generation continues with partial batches");
    }
    Some(merged)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
