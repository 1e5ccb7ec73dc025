//! Adaptive control of mutation and crossover rates.
//!
//! Two signals drive the live rates:
//!
//! - **Diversity** (spread of tour distances, averaged over a short rolling
//!   window). When it collapses, mutation is boosted toward its ceiling to
//!   restore exploration; once it recovers, mutation relaxes back toward
//!   its configured baseline.
//! - **Progress** (`generation / max_generations`). Crossover decays
//!   linearly with progress, shifting late generations toward exploitation.
//!
//! The controller only ever writes the [`Rates`] it is handed; it never
//! touches the population.
//!
//! # References
//!
//! - Eiben, Hinterding & Michalewicz (1999), "Parameter Control in
//!   Evolutionary Algorithms"
//! - Srinivas & Patnaik (1994), "Adaptive Probabilities of Crossover and
//!   Mutation in Genetic Algorithms"

use super::config::TourConfig;
use super::types::Tour;
use std::collections::VecDeque;

/// Multiplier applied to the mutation rate when diversity is low.
const MUTATION_BOOST: f64 = 1.25;

/// Smallest absolute step of a boost, so a zero rate can still rise.
const MIN_BOOST_STEP: f64 = 0.01;

/// Fraction of the gap to the baseline closed per generation when
/// diversity is high.
const RELAX_FACTOR: f64 = 0.2;

/// Live operator rates for one generation.
///
/// Copied by value into each breeding task, so a generation always runs
/// with one consistent pair of rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    /// Probability of mutating an offspring.
    pub mutation_rate: f64,
    /// Probability of recombining a parent pair.
    pub crossover_rate: f64,
}

impl Rates {
    /// The configured baseline rates.
    pub fn from_config(config: &TourConfig) -> Self {
        Self {
            mutation_rate: config.mutation_rate,
            crossover_rate: config.crossover_rate,
        }
    }
}

/// Population diversity in `[0, 1]`.
///
/// Coefficient of variation of tour distances (standard deviation over
/// mean), clamped to 1. Zero for empty populations, single tours, or a
/// zero mean distance.
pub fn diversity(population: &[Tour]) -> f64 {
    let n = population.len();
    if n < 2 {
        return 0.0;
    }
    let mean = population.iter().map(Tour::distance).sum::<f64>() / n as f64;
    if mean <= 0.0 || !mean.is_finite() {
        return 0.0;
    }
    let variance = population
        .iter()
        .map(|t| (t.distance() - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    (variance.sqrt() / mean).clamp(0.0, 1.0)
}

/// Tunes [`Rates`] from diversity and progress.
#[derive(Debug, Clone)]
pub struct AdaptiveController {
    base: Rates,
    min_mutation: f64,
    max_mutation: f64,
    min_crossover: f64,
    max_crossover: f64,
    crossover_decay: f64,
    low_diversity: f64,
    high_diversity: f64,
    capacity: usize,
    history: VecDeque<f64>,
}

impl AdaptiveController {
    /// Creates a controller from a normalized configuration.
    pub fn new(config: &TourConfig) -> Self {
        let capacity = config.diversity_history.max(1);
        Self {
            base: Rates::from_config(config),
            min_mutation: config.min_mutation_rate,
            max_mutation: config.max_mutation_rate,
            min_crossover: config.min_crossover_rate,
            max_crossover: config.max_crossover_rate,
            crossover_decay: config.crossover_decay,
            low_diversity: config.low_diversity,
            high_diversity: config.high_diversity,
            capacity,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Recent diversity samples, oldest first.
    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    /// Mean of the recorded diversity samples.
    pub fn smoothed_diversity(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }

    /// Records the population's diversity and updates `rates`.
    ///
    /// Returns the smoothed diversity the decision was based on.
    pub fn update(
        &mut self,
        rates: &mut Rates,
        population: &[Tour],
        generation: usize,
        max_generations: usize,
    ) -> f64 {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(diversity(population));
        let smoothed = self.smoothed_diversity();

        let m = rates.mutation_rate;
        let m = if smoothed < self.low_diversity {
            (m * MUTATION_BOOST).max(m + MIN_BOOST_STEP)
        } else if smoothed > self.high_diversity {
            m - (m - self.base.mutation_rate) * RELAX_FACTOR
        } else {
            m
        };
        rates.mutation_rate = m.clamp(self.min_mutation, self.max_mutation);

        let progress = if max_generations == 0 {
            1.0
        } else {
            (generation as f64 / max_generations as f64).clamp(0.0, 1.0)
        };
        rates.crossover_rate = (self.base.crossover_rate * (1.0 - self.crossover_decay * progress))
            .clamp(self.min_crossover, self.max_crossover);

        smoothed
    }
}
