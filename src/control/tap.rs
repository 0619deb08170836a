//! Tap tempo estimation
//!
//! Keeps a short history of tap timestamps and accepted gaps between them.
//! The estimate is the median accepted gap, which shrugs off a single
//! rushed or missed tap without a separate outlier pass.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::mapping::clamp;

/// Result of registering one tap
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// Only one tap so far
    AwaitingFirst,
    /// One gap accepted, need another
    AwaitingSecond,
    /// Gap was outside the valid band, accepted gaps were cleared
    Reset,
    /// New interval estimate in seconds
    Estimate(f64),
}

/// Tuning for a [`TapTempo`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapSettings {
    /// Shortest accepted gap between taps, seconds
    pub interval_min: f64,
    /// Longest accepted gap between taps, seconds
    pub interval_max: f64,
    /// Timestamps kept
    pub history: usize,
    /// Accepted gaps kept
    pub intervals: usize,
}

impl Default for TapSettings {
    fn default() -> Self {
        Self {
            interval_min: 0.08,
            interval_max: 2.5,
            history: 8,
            intervals: 6,
        }
    }
}

/// Tap tempo estimator
#[derive(Debug, Clone)]
pub struct TapTempo {
    settings: TapSettings,
    time_min: f64,
    time_max: f64,
    taps: VecDeque<f64>,
    intervals: VecDeque<f64>,
}

impl TapTempo {
    /// Create an estimator whose estimates are clamped to `[time_min, time_max]`.
    pub fn new(settings: TapSettings, time_min: f64, time_max: f64) -> Self {
        Self {
            taps: VecDeque::with_capacity(settings.history),
            intervals: VecDeque::with_capacity(settings.intervals),
            settings,
            time_min,
            time_max,
        }
    }

    /// Record a tap at `now` (seconds on any monotonic clock).
    pub fn register_tap(&mut self, now: f64) -> TapOutcome {
        push_bounded(&mut self.taps, now, self.settings.history);

        let n = self.taps.len();
        if n < 2 {
            return TapOutcome::AwaitingFirst;
        }

        let dt = self.taps[n - 1] - self.taps[n - 2];
        if dt < self.settings.interval_min || dt > self.settings.interval_max {
            self.intervals.clear();
            return TapOutcome::Reset;
        }

        push_bounded(&mut self.intervals, dt, self.settings.intervals);
        if self.intervals.len() < 2 {
            return TapOutcome::AwaitingSecond;
        }

        TapOutcome::Estimate(clamp(self.median(), self.time_min, self.time_max))
    }

    /// Forget all taps
    pub fn reset(&mut self) {
        self.taps.clear();
        self.intervals.clear();
    }

    /// Accepted gaps, oldest first
    pub fn intervals(&self) -> impl Iterator<Item = f64> + '_ {
        self.intervals.iter().copied()
    }

    fn median(&self) -> f64 {
        let mut sorted: Vec<f64> = self.intervals.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            0.5 * (sorted[mid - 1] + sorted[mid])
        }
    }
}

fn push_bounded(queue: &mut VecDeque<f64>, value: f64, capacity: usize) {
    while queue.len() >= capacity {
        queue.pop_front();
    }
    queue.push_back(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> TapTempo {
        TapTempo::new(TapSettings::default(), 0.03, 2.0)
    }

    fn assert_estimate(outcome: TapOutcome, expected: f64) {
        match outcome {
            TapOutcome::Estimate(value) => {
                assert!((value - expected).abs() < 1e-9, "Expected {}, got {}", expected, value)
            }
            other => panic!("expected estimate, got {:?}", other),
        }
    }

    #[test]
    fn test_steady_taps_estimate_from_third_tap() {
        let mut tap = estimator();

        assert_eq!(tap.register_tap(10.0), TapOutcome::AwaitingFirst);
        assert_eq!(tap.register_tap(10.5), TapOutcome::AwaitingSecond);
        assert_estimate(tap.register_tap(11.0), 0.5);
        assert_estimate(tap.register_tap(11.5), 0.5);
        assert_estimate(tap.register_tap(12.0), 0.5);
    }

    #[test]
    fn test_long_gap_resets_and_restarts() {
        let mut tap = estimator();
        for t in [0.0, 0.5, 1.0, 1.5] {
            tap.register_tap(t);
        }
        assert_eq!(tap.intervals().count(), 3);

        assert_eq!(tap.register_tap(4.5), TapOutcome::Reset);
        assert_eq!(tap.intervals().count(), 0);

        // the stale timestamp is still the reference for the next gap
        assert_eq!(tap.register_tap(5.0), TapOutcome::AwaitingSecond);
        assert_estimate(tap.register_tap(5.5), 0.5);
    }

    #[test]
    fn test_double_click_resets() {
        let mut tap = estimator();
        tap.register_tap(1.0);
        tap.register_tap(1.4);
        assert_eq!(tap.register_tap(1.45), TapOutcome::Reset);
    }

    #[test]
    fn test_band_edges_are_accepted() {
        let mut tap = estimator();
        tap.register_tap(0.0);
        assert_eq!(tap.register_tap(2.5), TapOutcome::AwaitingSecond);
        // 2.0 clamps to time_max
        assert_estimate(tap.register_tap(5.0), 2.0);
    }

    #[test]
    fn test_median_ignores_single_outlier() {
        let mut tap = estimator();
        let mut t = 0.0;
        tap.register_tap(t);
        for gap in [0.5, 0.5, 1.4] {
            t += gap;
            tap.register_tap(t);
        }
        // gaps [0.5, 0.5, 1.4] -> median 0.5
        t += 0.5;
        // gaps [0.5, 0.5, 1.4, 0.5] -> (0.5 + 0.5) / 2
        assert_estimate(tap.register_tap(t), 0.5);
    }

    #[test]
    fn test_even_count_averages_middle_pair() {
        let mut tap = estimator();
        tap.register_tap(0.0);
        tap.register_tap(0.4);
        assert_estimate(tap.register_tap(1.0), 0.5);
    }

    #[test]
    fn test_histories_are_bounded() {
        let mut tap = estimator();
        for i in 0..20 {
            tap.register_tap(i as f64 * 0.25);
        }
        assert_eq!(tap.taps.len(), 8);
        assert_eq!(tap.intervals().count(), 6);
    }

    #[test]
    fn test_oldest_intervals_slide_out() {
        let mut tap = estimator();
        let mut t = 0.0;
        tap.register_tap(t);
        for _ in 0..6 {
            t += 1.0;
            tap.register_tap(t);
        }
        let mut last = TapOutcome::AwaitingFirst;
        for _ in 0..6 {
            t += 0.3;
            last = tap.register_tap(t);
        }
        assert_estimate(last, 0.3);
    }

    #[test]
    fn test_estimate_clamped_to_time_min() {
        let mut tap = TapTempo::new(TapSettings::default(), 0.2, 2.0);
        tap.register_tap(0.0);
        tap.register_tap(0.1);
        assert_estimate(tap.register_tap(0.2), 0.2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut tap = estimator();
        tap.register_tap(0.0);
        tap.register_tap(0.5);
        tap.reset();
        assert_eq!(tap.taps.len(), 0);
        assert_eq!(tap.register_tap(1.0), TapOutcome::AwaitingFirst);
    }
}
