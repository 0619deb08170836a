//! One-pole exponential smoothing for control values
//!
//! `alpha` is calibrated against the tick rate, not wall-clock time. At a
//! cadence of `f` ticks per second a step settles to ~95% in about
//! `ln(0.05) / ln(1 - alpha) / f` seconds.

use crate::mapping::clamp;

/// Exponential moving average with hard bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Smoother {
    value: f64,
    alpha: f64,
    lo: f64,
    hi: f64,
}

impl Smoother {
    /// Create a smoother resting at `initial` (clamped to `[lo, hi]`).
    pub fn new(initial: f64, alpha: f64, lo: f64, hi: f64) -> Self {
        Self {
            value: clamp(initial, lo, hi),
            alpha,
            lo,
            hi,
        }
    }

    /// Move one tick toward `target` and return the new value.
    /// A non-finite target holds the current value.
    pub fn step(&mut self, target: f64) -> f64 {
        if !target.is_finite() {
            return self.value;
        }
        let next = self.value + self.alpha * (target - self.value);
        self.value = clamp(next, self.lo, self.hi);
        self.value
    }

    /// Jump straight to `value`, with no glide.
    pub fn set(&mut self, value: f64) {
        if value.is_finite() {
            self.value = clamp(value, self.lo, self.hi);
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Approximate ticks needed to cover 95% of a step.
    pub fn settle_ticks(&self) -> f64 {
        if self.alpha >= 1.0 {
            return 1.0;
        }
        0.05f64.ln() / (1.0 - self.alpha).ln()
    }
}
