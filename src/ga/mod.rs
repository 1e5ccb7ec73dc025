//! Genetic algorithm for visiting-order optimization.
//!
//! Finds a short closed tour through a set of locations: a permutation of
//! the input indices whose round-trip distance (returning to the first
//! stop) is as small as the search can make it.
//!
//! # Key Types
//!
//! - [`TourConfig`]: Algorithm parameters (population, rates, presets)
//! - [`TourRunner`]: Executes the generation loop
//! - [`TourResult`]: Reordered locations, metrics, and per-generation history
//! - [`Tour`]: An immutable candidate with its cached distance and fitness
//!
//! # Submodules
//!
//! - [`operators`]: Order crossover (OX) and swap/reverse/relocate mutation
//! - [`local_search`]: The [`LocalSearch`] backend seam and [`TwoOpt`]
//! - [`adaptive`]: Diversity-driven mutation and crossover rate control
//! - [`convergence`]: Sliding-window stagnation detection
//! - `parallel`: Worker-pool offspring breeding (feature `parallel`)
//!
//! # References
//!
//! - Davis (1985), *Applying Adaptive Algorithms to Epistatic Domains* (OX)
//! - Croes (1958), *A Method for Solving Traveling-Salesman Problems* (2-opt)
//! - Srinivas & Patnaik (1994), *Adaptive Probabilities of Crossover and
//!   Mutation in Genetic Algorithms*

pub mod adaptive;
mod config;
pub mod convergence;
mod errors;
pub mod local_search;
pub mod operators;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod population;
pub mod reproduction;
mod runner;
pub mod selection;
mod types;

pub use adaptive::Rates;
pub use config::TourConfig;
pub use errors::BatchError;
#[cfg(feature = "parallel")]
pub use errors::PoolError;
pub use local_search::{LocalSearch, TwoOpt};
pub use operators::Mutation;
pub use runner::{GenerationRecord, StopReason, TourMetrics, TourResult, TourRunner};
pub use types::{fitness_of, is_permutation, sort_by_fitness, Tour};
