//! Candidate tour representation and fitness evaluation.

use crate::distance::DistanceModel;

/// Fitness score for a tour of the given total distance.
///
/// `1 / (distance + 1)`: always positive, strictly decreasing in distance,
/// and defined for a zero-length tour.
#[inline]
pub fn fitness_of(distance: f64) -> f64 {
    1.0 / (distance + 1.0)
}

/// A candidate visiting order.
///
/// Holds a permutation of location indices `0..n` together with its cached
/// closed-tour distance and fitness. A `Tour` is immutable once built:
/// crossover, mutation and local search all produce a new `Tour` from a new
/// order, so the cached values can never drift from the sequence.
///
/// # Examples
///
/// ```
/// use u_tour::distance::{DistanceMatrix, DistanceModel, Location};
/// use u_tour::ga::Tour;
///
/// let stops = vec![
///     Location::new("a", 0.0, 0.0),
///     Location::new("b", 0.0, 3.0),
///     Location::new("c", 4.0, 0.0),
/// ];
/// let matrix = DistanceMatrix::euclidean(&stops);
/// let tour = Tour::new(vec![0, 1, 2], &matrix);
/// assert!((tour.distance() - 12.0).abs() < 1e-12);
/// assert!((tour.fitness() - 1.0 / 13.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    order: Vec<usize>,
    distance: f64,
    fitness: f64,
}

impl Tour {
    /// Evaluates `order` against `model` and wraps it.
    ///
    /// `order` must be a permutation of `0..model.len()`; every operator in
    /// this crate guarantees that, and [`is_permutation`] checks it.
    pub fn new<D: DistanceModel + ?Sized>(order: Vec<usize>, model: &D) -> Self {
        let distance = model.tour_distance(&order);
        Self {
            order,
            distance,
            fitness: fitness_of(distance),
        }
    }

    /// The identity order `0, 1, …, n-1`.
    pub fn identity<D: DistanceModel + ?Sized>(model: &D) -> Self {
        Self::new((0..model.len()).collect(), model)
    }

    /// Location indices in visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Consumes the tour and returns its order.
    pub fn into_order(self) -> Vec<usize> {
        self.order
    }

    /// Closed-tour distance.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// `1 / (distance + 1)`. Higher is better.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` for an empty tour.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Returns `true` if `order` contains every index in `0..n` exactly once.
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &v in order {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

/// Sorts tours best-first (ascending distance).
///
/// Uses a stable sort so equal-distance tours keep their relative order,
/// which keeps merged parallel batches deterministic.
pub fn sort_by_fitness(tours: &mut [Tour]) {
    tours.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
