//! Visiting-order optimization for geographic locations.
//!
//! Given a list of locations, finds a short closed tour through all of
//! them with a genetic algorithm refined by 2-opt local search:
//!
//! - **Distance**: Haversine or planar distance matrices behind the
//!   [`DistanceModel`](distance::DistanceModel) trait.
//! - **Genetic Algorithm**: Permutation population with tournament
//!   selection, order crossover, three mutation operators, elitism, and
//!   adaptive rates.
//! - **Local Search**: 2-opt refinement of the best tours, pluggable via
//!   [`LocalSearch`](ga::LocalSearch).
//! - **Parallel Breeding**: Offspring batches on a rayon worker pool with
//!   per-batch seeds and panic isolation (feature `parallel`).
//!
//! # Quick Start
//!
//! ```
//! use u_tour::distance::Location;
//! use u_tour::ga::{TourConfig, TourRunner};
//!
//! let stops = vec![
//!     Location::new("depot", 0.0, 0.0),
//!     Location::new("north", 0.0, 1.0),
//!     Location::new("east", 1.0, 1.0),
//!     Location::new("south", 1.0, 0.0),
//! ];
//! let result = TourRunner::run(&stops, &TourConfig::fast().with_seed(1));
//! assert_eq!(result.locations.len(), 4);
//! ```
//!
//! # Architecture
//!
//! The optimizer owns no I/O. Callers supply locations and a
//! [`TourConfig`](ga::TourConfig) and receive the reordered locations with
//! run metrics. Logging goes through `tracing`; install a subscriber to
//! see it.

pub mod distance;
pub mod ga;
pub mod random;
