//! Difficulty progression: correct-pad fraction and tick interval per round index

use std::time::Duration;

/// Round difficulty tuning
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyProfile {
    /// Fraction of pads showing the target on the first tick
    pub start_fraction: f64,
    /// Fraction removed on every subsequent tick
    pub fraction_decrease_per_round: f64,
    /// Lower bound for the fraction
    pub min_fraction: f64,
    /// Wait before the first elimination check of a round
    pub initial_interval: Duration,
    /// Lower bound for the wait
    pub min_interval: Duration,
    /// Amount the wait shrinks after every tick
    pub interval_decrease: Duration,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self {
            start_fraction: 0.3,
            fraction_decrease_per_round: 0.05,
            min_fraction: 0.1,
            initial_interval: Duration::from_secs(5),
            min_interval: Duration::from_secs(2),
            interval_decrease: Duration::from_millis(500),
        }
    }
}

impl DifficultyProfile {
    /// Correct-pad fraction for a 1-based round index
    pub fn fraction(&self, round_index: u32) -> f64 {
        let steps = round_index.saturating_sub(1) as f64;
        (self.start_fraction - steps * self.fraction_decrease_per_round).max(self.min_fraction)
    }

    /// Number of pads that show the target color.
    ///
    /// Zero only when there are no pads at all.
    pub fn num_correct(&self, total_pads: usize, fraction: f64) -> usize {
        if total_pads == 0 {
            return 0;
        }
        let scaled = (total_pads as f64 * fraction).floor() as usize;
        scaled.clamp(1, total_pads)
    }

    /// Wait for the tick after one that waited `previous`
    pub fn interval(&self, previous: Duration) -> Duration {
        previous
            .saturating_sub(self.interval_decrease)
            .max(self.min_interval)
    }
}
