//! Edge-triggered ×2 / ÷2 of the delay time

use crate::mapping::clamp;

/// Doubles or halves a target on OFF→ON / ON→OFF transitions only.
///
/// Repeating the current state leaves the target alone, so a checkbox and a
/// key both reporting "on" cannot double twice.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoDoubler {
    last_active: bool,
    time_min: f64,
    time_max: f64,
}

impl TempoDoubler {
    pub fn new(time_min: f64, time_max: f64) -> Self {
        Self {
            last_active: false,
            time_min,
            time_max,
        }
    }

    /// Apply a new doubling state to `current_target`.
    ///
    /// Near the range edges the clamp absorbs the excess, so the result is
    /// not always exactly double or half.
    pub fn apply(&mut self, new_active: bool, current_target: f64) -> f64 {
        if new_active == self.last_active {
            return current_target;
        }

        let factor = if new_active { 2.0 } else { 0.5 };
        self.last_active = new_active;
        clamp(current_target * factor, self.time_min, self.time_max)
    }

    /// Flip the current state and apply it.
    pub fn toggle(&mut self, current_target: f64) -> f64 {
        self.apply(!self.last_active, current_target)
    }

    pub fn is_active(&self) -> bool {
        self.last_active
    }
}
