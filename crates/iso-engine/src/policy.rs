//! Threshold rules for the layered frontier engine.
//!
//! Each round the engine hands its policy a scratch copy of the fringe
//! log-probabilities and accepts every fringe member at or above the returned
//! value. A policy must return a value no greater than the fringe maximum so
//! that every round makes progress.

use std::fmt::Debug;

/// Chooses the acceptance threshold of the next frontier round.
pub trait ThresholdPolicy: Debug {
    /// Returns the next log-probability threshold.
    ///
    /// `fringe` is non-empty scratch space and may be reordered freely.
    fn next_threshold(&mut self, fringe: &mut [f64], covered: f64, target: f64) -> f64;

    /// Records the coverage reached after accepting everything at `threshold`.
    fn observe(&mut self, threshold: f64, covered: f64);
}

/// Value at ascending position `floor(share * len)` of `values`.
fn ascending_quantile(values: &mut [f64], share: f64) -> f64 {
    let last = values.len() - 1;
    let rank = ((share * values.len() as f64).floor() as usize).min(last);
    let (_, value, _) = values.select_nth_unstable_by(rank, f64::total_cmp);
    *value
}

/// Fringe quantile rule: accepts everything above the value below which a
/// fixed share of the fringe falls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantilePolicy {
    step: f64,
}

impl QuantilePolicy {
    /// Rule leaving roughly `step` of the fringe below the threshold.
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    /// Configured share.
    pub fn step(&self) -> f64 {
        self.step
    }
}

impl Default for QuantilePolicy {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl ThresholdPolicy for QuantilePolicy {
    fn next_threshold(&mut self, fringe: &mut [f64], _covered: f64, _target: f64) -> f64 {
        ascending_quantile(fringe, self.step)
    }

    fn observe(&mut self, _threshold: f64, _covered: f64) {}
}

/// Piecewise-linear estimate of covered probability as a function of the
/// threshold, extrapolated to the target.
///
/// Until two knots exist, or when the last segment is flat or inverted, the
/// quantile rule is used instead. Estimates are clamped between the fringe
/// minimum and the quantile rule's value, so a round never accepts less than
/// the quantile rule would.
#[derive(Debug, Clone, PartialEq)]
pub struct SplinePolicy {
    fallback: QuantilePolicy,
    knots: Vec<(f64, f64)>,
}

impl SplinePolicy {
    /// Estimator whose fallback and minimum progress use `step`.
    pub fn new(step: f64) -> Self {
        Self {
            fallback: QuantilePolicy::new(step),
            knots: Vec::new(),
        }
    }

    /// Recorded `(threshold, covered)` pairs, oldest first.
    pub fn knots(&self) -> &[(f64, f64)] {
        &self.knots
    }

    fn extrapolate(&self, target: f64) -> Option<f64> {
        let [.., (t1, c1), (t2, c2)] = self.knots.as_slice() else {
            return None;
        };
        let slope = (c2 - c1) / (t2 - t1);
        if !slope.is_finite() || slope >= 0.0 {
            return None;
        }
        let estimate = t2 + (target.min(1.0) - c2) / slope;
        estimate.is_finite().then_some(estimate)
    }
}

impl Default for SplinePolicy {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl ThresholdPolicy for SplinePolicy {
    fn next_threshold(&mut self, fringe: &mut [f64], covered: f64, target: f64) -> f64 {
        let Some(estimate) = self.extrapolate(target) else {
            return self.fallback.next_threshold(fringe, covered, target);
        };
        let upper = self.fallback.next_threshold(fringe, covered, target);
        let lower = fringe.iter().copied().fold(f64::INFINITY, f64::min);
        estimate.clamp(lower, upper)
    }

    fn observe(&mut self, threshold: f64, covered: f64) {
        self.knots.push((threshold, covered));
    }
}
