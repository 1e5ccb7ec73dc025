//! Recoverable faults inside the parallel breeding phase.
//!
//! None of these reach the caller of [`TourRunner`](crate::ga::TourRunner):
//! failed batches are logged and dropped, and a pool that cannot be built
//! degrades the run to sequential breeding.

/// A worker batch that produced no usable offspring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BatchError {
    #[error("batch {batch} panicked: {message}")]
    Panicked { batch: usize, message: String },
    #[error("batch {batch} produced {got} tours, expected {expected}")]
    WrongSize {
        batch: usize,
        got: usize,
        expected: usize,
    },
    #[error("batch {batch} produced a tour that is not a permutation of {stops} stops")]
    InvalidTour { batch: usize, stops: usize },
}

/// The worker pool could not be created.
#[cfg(feature = "parallel")]
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("failed to build worker pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
}
