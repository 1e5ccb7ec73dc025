//! Permutation-preserving recombination and mutation.
//!
//! Every operator takes location-index orders by reference and returns a
//! new order. None of them creates or destroys an index, only moves it, so
//! a permutation of `0..n` in always yields a permutation of `0..n` out.
//!
//! # Crossover
//!
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//!
//! # Mutation
//!
//! - [`Mutation::Swap`]: Exchange two positions, O(n) copy + O(1) move
//! - [`Mutation::Reverse`]: Reverse a segment (a random 2-opt move)
//! - [`Mutation::Relocate`]: Remove one stop and reinsert it elsewhere
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// Order Crossover (OX).
///
/// 1. Select a random segment `[start, end]`
/// 2. Copy the segment from the first parent into the child at the same
///    positions
/// 3. Fill the remaining positions left to right, starting just after the
///    segment and wrapping, with the second parent's stops in the second
///    parent's order (read from the same wrap point), skipping stops already
///    placed
///
/// Returns both children: `(p1 segment + p2 order, p2 segment + p1 order)`.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths.
pub fn order_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");

    if n < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = random_segment(n, rng);
    (
        ox_child(parent1, parent2, start, end),
        ox_child(parent2, parent1, start, end),
    )
}

/// Copy `template[start..=end]`, fill the rest from `donor`.
pub(crate) fn ox_child(template: &[usize], donor: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = template.len();
    let mut child = vec![usize::MAX; n];
    let mut placed = vec![false; n];

    for i in start..=end {
        child[i] = template[i];
        placed[template[i]] = true;
    }

    let mut pos = (end + 1) % n;
    for offset in 0..n {
        let stop = donor[(end + 1 + offset) % n];
        if !placed[stop] {
            child[pos] = stop;
            placed[stop] = true;
            pos = (pos + 1) % n;
        }
    }

    child
}

// ============================================================================
// Mutation
// ============================================================================

/// Mutation operator.
///
/// A closed set: [`apply`](Mutation::apply) dispatches through one
/// exhaustive `match`, and each arm only repositions existing stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Exchange the stops at two distinct positions.
    Swap,
    /// Reverse the stops between two distinct positions (inclusive).
    Reverse,
    /// Move one stop to a different position, shifting the others.
    Relocate,
}

impl Mutation {
    /// All operators, in the order used by [`Mutation::random`].
    pub const ALL: [Mutation; 3] = [Mutation::Swap, Mutation::Reverse, Mutation::Relocate];

    /// Picks an operator uniformly at random.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Returns a mutated copy of `order`.
    ///
    /// Orders with fewer than two stops are returned unchanged.
    pub fn apply<R: Rng>(self, order: &[usize], rng: &mut R) -> Vec<usize> {
        let mut out = order.to_vec();
        let n = out.len();
        if n < 2 {
            return out;
        }

        match self {
            Mutation::Swap => {
                let (i, j) = distinct_pair(n, rng);
                out.swap(i, j);
            }
            Mutation::Reverse => {
                let (i, j) = distinct_pair(n, rng);
                out[i..=j].reverse();
            }
            Mutation::Relocate => {
                let from = rng.random_range(0..n);
                let stop = out.remove(from);
                // `n - 1` remaining stops give `n` insertion points; skip the
                // one that would put the stop back where it was.
                let mut to = rng.random_range(0..n - 1);
                if to >= from {
                    to += 1;
                }
                out.insert(to, stop);
            }
        }

        out
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Two distinct positions `i < j` within `0..n`. Requires `n >= 2`.
fn distinct_pair<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    if i < j {
        (i, j)
    } else {
        (j, i)
    }
}
