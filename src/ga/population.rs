//! Initial population construction.
//!
//! A mix of one identity tour, a handful of greedy nearest-neighbour tours
//! and uniformly random permutations. The greedy tours give the search a
//! good starting foothold; the random ones supply diversity.

use super::types::{sort_by_fitness, Tour};
use crate::distance::DistanceModel;
use rand::seq::{index, SliceRandom};
use rand::Rng;

/// Builds `size` tours over `model`, sorted best-first.
///
/// Composition, in order of priority while room remains:
/// 1. the identity order `0..n`
/// 2. up to `greedy_count` nearest-neighbour tours, each from a different
///    start index while distinct starts remain, then from random starts
/// 3. uniformly random permutations for the rest
pub fn initial_population<D, R>(model: &D, size: usize, greedy_count: usize, rng: &mut R) -> Vec<Tour>
where
    D: DistanceModel + ?Sized,
    R: Rng,
{
    let n = model.len();
    let mut population = Vec::with_capacity(size);
    if size == 0 {
        return population;
    }

    population.push(Tour::identity(model));

    let greedy = greedy_count.min(size - 1);
    if n > 0 && greedy > 0 {
        let distinct = greedy.min(n);
        let mut starts = index::sample(rng, n, distinct).into_vec();
        while starts.len() < greedy {
            starts.push(rng.random_range(0..n));
        }
        for start in starts {
            population.push(Tour::new(nearest_neighbor(model, start), model));
        }
    }

    while population.len() < size {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);
        population.push(Tour::new(order, model));
    }

    sort_by_fitness(&mut population);
    population
}

/// Greedy nearest-neighbour order starting at `start`.
///
/// Repeatedly moves to the closest unvisited stop; ties go to the lower
/// index.
///
/// # Complexity
/// O(n²)
pub fn nearest_neighbor<D: DistanceModel + ?Sized>(model: &D, start: usize) -> Vec<usize> {
    let n = model.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    let mut current = start;
    visited[current] = true;
    order.push(current);

    while order.len() < n {
        let mut next = usize::MAX;
        let mut next_dist = f64::INFINITY;
        for (candidate, &seen) in visited.iter().enumerate() {
            if seen {
                continue;
            }
            let d = model.distance(current, candidate);
            if next == usize::MAX || d < next_dist {
                next = candidate;
                next_dist = d;
            }
        }
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}
