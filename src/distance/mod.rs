//! Distance model for geographic locations.
//!
//! The optimizer never looks at coordinates directly. It works on location
//! indices `0..n` and asks a [`DistanceModel`] for pairwise and whole-tour
//! distances. [`DistanceMatrix`] is the default model: a dense, symmetric,
//! zero-diagonal table built once per run and shared read-only by every
//! worker.
//!
//! # Key Types
//!
//! - [`Location`]: Caller-owned record (identifier + latitude/longitude)
//! - [`GeoPoint`]: Coordinate access, so callers can keep their own record type
//! - [`DistanceModel`]: Backend interface used by the GA and local search
//! - [`DistanceMatrix`]: Precomputed haversine or Euclidean table
//!
//! # References
//!
//! - Sinnott (1984), "Virtues of the Haversine", *Sky and Telescope* 68(2)

mod matrix;
mod types;

pub use matrix::{haversine_m, DistanceMatrix, DistanceMetric, EARTH_RADIUS_M};
pub use types::{DistanceModel, GeoPoint, Location};
