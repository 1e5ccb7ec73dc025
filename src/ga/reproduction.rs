//! Offspring production: selection → crossover → mutation → evaluation.
//!
//! [`breed`] is the single code path that creates new tours. The
//! sequential runner calls it with the master RNG; each parallel batch
//! calls it with its own RNG on a read-only snapshot of the population.

use super::adaptive::Rates;
use super::operators::{order_crossover, Mutation};
use super::selection::tournament;
use super::types::{sort_by_fitness, Tour};
use crate::distance::DistanceModel;
use rand::Rng;

/// Breeds exactly `count` offspring from `population`.
///
/// Parents are picked by tournament. With probability
/// `rates.crossover_rate` the pair is recombined with OX into two children,
/// otherwise the children are copies of the parents. Each child is then
/// mutated with probability `rates.mutation_rate` by a uniformly chosen
/// [`Mutation`]. Surplus children from the last pair are discarded.
///
/// # Panics
/// Panics if `population` is empty and `count > 0`.
pub fn breed<D, R>(
    population: &[Tour],
    model: &D,
    count: usize,
    rates: Rates,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<Tour>
where
    D: DistanceModel + ?Sized,
    R: Rng,
{
    let mut offspring = Vec::with_capacity(count);

    while offspring.len() < count {
        let p1 = &population[tournament(population, tournament_size, rng)];
        let p2 = &population[tournament(population, tournament_size, rng)];

        let (c1, c2) = if rng.random_range(0.0..1.0) < rates.crossover_rate {
            order_crossover(p1.order(), p2.order(), rng)
        } else {
            (p1.order().to_vec(), p2.order().to_vec())
        };

        for child in [c1, c2] {
            if offspring.len() >= count {
                break;
            }
            let child = if rng.random_range(0.0..1.0) < rates.mutation_rate {
                Mutation::random(rng).apply(&child, rng)
            } else {
                child
            };
            offspring.push(Tour::new(child, model));
        }
    }

    offspring
}

/// Concatenates `elites` and `offspring`, trims to `size` and sorts
/// best-first.
pub fn assemble(elites: &[Tour], offspring: Vec<Tour>, size: usize) -> Vec<Tour> {
    let mut next = Vec::with_capacity(elites.len() + offspring.len());
    next.extend_from_slice(elites);
    next.extend(offspring);
    next.truncate(size);
    sort_by_fitness(&mut next);
    next
}
