//! Local search refinement of individual tours.
//!
//! The GA applies a [`LocalSearch`] backend to a few of the best tours each
//! generation. [`TwoOpt`] is the built-in backend; callers can plug in a
//! faster one through [`TourRunner::run_with_backend`](crate::ga::TourRunner::run_with_backend).
//!
//! # References
//!
//! - Croes (1958), "A Method for Solving Traveling-Salesman Problems"

use super::types::Tour;
use crate::distance::DistanceModel;

/// Improvement below this fraction of the tour length is treated as
/// floating-point noise, so the cutoff follows the distance unit.
const MIN_RELATIVE_GAIN: f64 = 1e-12;

/// A tour-improvement backend.
///
/// # Contract
///
/// `improve` must return a permutation of the same stops whose distance is
/// no greater than the input's. When no improving move exists it returns
/// the input unchanged. It must not panic on tours with fewer than four
/// stops.
pub trait LocalSearch: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn name(&self) -> &str;

    /// Returns an improved copy of `tour`, or an equal copy if none exists.
    fn improve<D: DistanceModel + ?Sized>(&self, tour: &Tour, model: &D) -> Tour;
}

/// Best-improvement 2-opt.
///
/// One pass scans every pair of non-adjacent edges `(i, i+1)` and
/// `(j, j+1)`, evaluates the gain of reversing `i+1..=j` in O(1) from the
/// four edge lengths, and applies the single best strictly improving
/// reversal. With `max_passes > 1` the scan repeats until no improving move
/// remains or the pass budget is spent.
///
/// # Complexity
/// O(n²) per pass
///
/// # Examples
///
/// ```
/// use u_tour::distance::{DistanceMatrix, Location};
/// use u_tour::ga::local_search::{LocalSearch, TwoOpt};
/// use u_tour::ga::Tour;
///
/// let square = vec![
///     Location::new("a", 0.0, 0.0),
///     Location::new("b", 0.0, 1.0),
///     Location::new("c", 1.0, 1.0),
///     Location::new("d", 1.0, 0.0),
/// ];
/// let m = DistanceMatrix::euclidean(&square);
/// let crossed = Tour::new(vec![0, 2, 1, 3], &m);
/// let fixed = TwoOpt::default().improve(&crossed, &m);
/// assert!((fixed.distance() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoOpt {
    /// Maximum number of improving moves applied per call (at least 1).
    pub max_passes: usize,
}

impl Default for TwoOpt {
    fn default() -> Self {
        Self { max_passes: 1 }
    }
}

impl TwoOpt {
    /// 2-opt that keeps applying best moves until a local optimum.
    pub fn until_local_optimum() -> Self {
        Self {
            max_passes: usize::MAX,
        }
    }

    /// Finds the best strictly improving reversal of `order[i + 1..=j]`.
    ///
    /// A move must shorten the tour by more than `MIN_RELATIVE_GAIN` times
    /// `length`.
    fn best_move<D: DistanceModel + ?Sized>(
        order: &[usize],
        model: &D,
        length: f64,
    ) -> Option<(usize, usize)> {
        let n = order.len();
        if n < 4 {
            return None;
        }

        let mut best: Option<(usize, usize)> = None;
        let mut best_delta = -(MIN_RELATIVE_GAIN * length);

        for i in 0..n - 2 {
            let a = order[i];
            let b = order[i + 1];
            let d_ab = model.distance(a, b);
            for j in (i + 2)..n {
                // Edges (0,1) and (n-1,0) share a stop; reversing between
                // them only flips the direction of travel.
                if i == 0 && j == n - 1 {
                    continue;
                }
                let c = order[j];
                let d = order[(j + 1) % n];
                let delta = model.distance(a, c) + model.distance(b, d) - d_ab - model.distance(c, d);
                if delta < best_delta {
                    best_delta = delta;
                    best = Some((i, j));
                }
            }
        }

        best
    }
}

impl LocalSearch for TwoOpt {
    fn name(&self) -> &str {
        "2-opt"
    }

    fn improve<D: DistanceModel + ?Sized>(&self, tour: &Tour, model: &D) -> Tour {
        let mut order = tour.order().to_vec();
        let mut applied = false;
        let mut length = tour.distance();

        for _ in 0..self.max_passes.max(1) {
            match Self::best_move(&order, model, length) {
                Some((i, j)) => {
                    order[i + 1..=j].reverse();
                    length = model.tour_distance(&order);
                    applied = true;
                }
                None => break,
            }
        }

        if !applied {
            return tour.clone();
        }

        // Accept only on a strict decrease of the recomputed total.
        let candidate = Tour::new(order, model);
        if candidate.distance() < tour.distance() {
            candidate
        } else {
            tour.clone()
        }
    }
}
