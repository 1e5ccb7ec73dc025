//! Stagnation detection over a sliding window of best distances.

use std::collections::VecDeque;

/// Signals convergence once the best distance stops moving.
///
/// Keeps the last `window` best-distance observations. When the window is
/// full and at least `min_generations` observations have been made, the
/// relative spread `(max - min) / max` is compared against `threshold`.
/// A spread below the threshold, or exactly zero, means stagnation.
///
/// The monitor is advisory: it only tells the runner to stop.
///
/// # Examples
///
/// ```
/// use u_tour::ga::convergence::ConvergenceMonitor;
///
/// let mut monitor = ConvergenceMonitor::new(3, 0.01, 0);
/// assert!(!monitor.observe(100.0));
/// assert!(!monitor.observe(100.0));
/// assert!(monitor.observe(100.0));
/// ```
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    window: usize,
    threshold: f64,
    min_generations: usize,
    observed: usize,
    recent: VecDeque<f64>,
}

impl ConvergenceMonitor {
    /// Creates a monitor. A `window` below 1 is treated as 1.
    pub fn new(window: usize, threshold: f64, min_generations: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            threshold,
            min_generations,
            observed: 0,
            recent: VecDeque::with_capacity(window.min(1024)),
        }
    }

    /// Number of observations made so far.
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Relative spread of the current window, or `None` until it is full.
    pub fn spread(&self) -> Option<f64> {
        if self.recent.len() < self.window {
            return None;
        }
        let max = self.recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = self.recent.iter().copied().fold(f64::INFINITY, f64::min);
        if max <= 0.0 {
            return Some(0.0);
        }
        Some((max - min) / max)
    }

    /// Records this generation's best distance and reports whether the
    /// search has stagnated.
    pub fn observe(&mut self, best_distance: f64) -> bool {
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(best_distance);
        self.observed += 1;

        if self.observed < self.min_generations {
            return false;
        }
        match self.spread() {
            Some(spread) => spread == 0.0 || spread < self.threshold,
            None => false,
        }
    }
}
