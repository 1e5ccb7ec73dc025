//! Parent selection.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::Tour;
use rand::Rng;

/// Tournament selection: draw `k` tours uniformly at random (with
/// replacement) and return the index of the shortest.
///
/// Higher `k` = stronger selection pressure.
/// - k=2: light pressure (good for diversity)
/// - k=3-5: moderate pressure (typical default)
/// - k>5: strong pressure (risk of premature convergence)
///
/// `k` of zero is treated as one.
///
/// # Complexity
/// O(k) per selection
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament<R: Rng>(population: &[Tour], k: usize, rng: &mut R) -> usize {
    assert!(
        !population.is_empty(),
        "cannot select from empty population"
    );

    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].distance() < population[best_idx].distance() {
            best_idx = idx;
        }
    }
    best_idx
}
