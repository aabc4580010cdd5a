//! Compensated summation for probability mass.
//!
//! Queries routinely add millions of probabilities spanning many orders of
//! magnitude. A plain running `f64` total drifts far enough to flip the
//! coverage decision, so every probability sum in the engine goes through
//! [`Summator`], a Neumaier variant of Kahan summation.

use serde::{Deserialize, Serialize};

/// Relative slack applied when comparing a covered total to its target.
pub const COVERAGE_SLACK: f64 = 1e-12;

/// Running sum with a carry term holding the low-order bits lost so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summator {
    sum: f64,
    compensation: f64,
}

impl Summator {
    /// Creates an accumulator at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, folding the rounding error into the carry.
    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    /// Current corrected total.
    pub fn get(&self) -> f64 {
        self.sum + self.compensation
    }

    /// Returns true once the total satisfies `target` (see [`covers`]).
    pub fn covers(&self, target: f64) -> bool {
        covers(self.get(), target)
    }
}

impl Extend<f64> for Summator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<f64> for Summator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Summator::new();
        acc.extend(iter);
        acc
    }
}

/// Decides whether `total` meets a coverage `target`.
///
/// A target of 1 or more can never be certified under rounding and is treated
/// as a request for the whole space, so it is never reported as covered.
pub fn covers(total: f64, target: f64) -> bool {
    if target >= 1.0 {
        return false;
    }
    total >= target - target.abs() * COVERAGE_SLACK
}
