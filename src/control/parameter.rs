//! Continuous control parameters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Smoother;
use crate::error::CommandError;
use crate::mapping::clamp;

/// Identifier of a continuous control
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    /// Delay time in seconds
    DelayTime,
    /// Delay feedback amount
    Feedback,
    /// Master volume
    Volume,
    /// Shared 0..1 pitch for all sirens
    Pitch,
    /// Shared 0..1 modulation rate for all sirens
    Rate,
    SirenDepth,
    AirDepth,
    BensTone,
    BensDrive,
}

impl ParamId {
    pub const ALL: [ParamId; 9] = [
        ParamId::DelayTime,
        ParamId::Feedback,
        ParamId::Volume,
        ParamId::Pitch,
        ParamId::Rate,
        ParamId::SirenDepth,
        ParamId::AirDepth,
        ParamId::BensTone,
        ParamId::BensDrive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamId::DelayTime => "delay_time",
            ParamId::Feedback => "feedback",
            ParamId::Volume => "volume",
            ParamId::Pitch => "pitch",
            ParamId::Rate => "rate",
            ParamId::SirenDepth => "siren_depth",
            ParamId::AirDepth => "air_depth",
            ParamId::BensTone => "bens_tone",
            ParamId::BensDrive => "bens_drive",
        }
    }

    /// Human-readable label for the control surface
    pub fn label(&self) -> &'static str {
        match self {
            ParamId::DelayTime => "Delay time",
            ParamId::Feedback => "Feedback",
            ParamId::Volume => "Master vol",
            ParamId::Pitch => "Pitch (all)",
            ParamId::Rate => "Rate (all)",
            ParamId::SirenDepth => "Dub depth",
            ParamId::AirDepth => "Air depth",
            ParamId::BensTone => "Ben tone",
            ParamId::BensDrive => "Ben drive",
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamId {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CommandError::UnknownParameter(s.to_string()))
    }
}

/// A named continuous control.
///
/// `target` is written by input handlers, `smoothed` only by the tick. Both
/// always lie within `[min, max]`.
#[derive(Debug, Clone)]
pub struct Parameter {
    id: ParamId,
    target: f64,
    smoother: Smoother,
    min: f64,
    max: f64,
    step: f64,
    instant: bool,
}

impl Parameter {
    /// Create a parameter resting at `default`.
    ///
    /// An `instant` parameter skips smoothing: each tick copies the target
    /// straight into the smoothed value.
    pub fn new(id: ParamId, default: f64, min: f64, max: f64, alpha: f64, step: f64, instant: bool) -> Self {
        let target = if default.is_finite() { clamp(default, min, max) } else { min };
        Self {
            id,
            target,
            smoother: Smoother::new(target, alpha, min, max),
            min,
            max,
            step,
            instant,
        }
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn smoothed(&self) -> f64 {
        self.smoother.value()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_instant(&self) -> bool {
        self.instant
    }

    pub fn alpha(&self) -> f64 {
        self.smoother.alpha()
    }

    /// Ticks the glide needs to cover most of a step
    pub fn settle_ticks(&self) -> f64 {
        if self.instant {
            1.0
        } else {
            self.smoother.settle_ticks()
        }
    }

    /// Replace the target, saturating at the bounds. Returns the stored value.
    ///
    /// A non-finite value leaves the target unchanged.
    pub fn set_target(&mut self, value: f64) -> f64 {
        if value.is_finite() {
            self.target = clamp(value, self.min, self.max);
        }
        self.target
    }

    /// Move the target by `steps` increments.
    pub fn nudge(&mut self, steps: i32) -> f64 {
        self.set_target(self.target + steps as f64 * self.step)
    }

    /// Advance the smoothed value by one tick.
    pub(crate) fn tick(&mut self) -> f64 {
        if self.instant {
            self.smoother.set(self.target);
            self.smoother.value()
        } else {
            self.smoother.step(self.target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay_time() -> Parameter {
        Parameter::new(ParamId::DelayTime, 0.33, 0.03, 2.0, 0.06, 0.02, false)
    }

    #[test]
    fn test_param_id_round_trips_through_str() {
        for id in ParamId::ALL {
            assert_eq!(id.as_str().parse::<ParamId>(), Ok(id));
        }
        assert_eq!(
            "tempo".parse::<ParamId>(),
            Err(CommandError::UnknownParameter("tempo".to_string()))
        );
    }

    #[test]
    fn test_param_id_serde_names() {
        let id: ParamId = serde_yaml::from_str("bens_drive").unwrap();
        assert_eq!(id, ParamId::BensDrive);
        assert_eq!(serde_yaml::to_string(&ParamId::DelayTime).unwrap().trim(), "delay_time");
    }

    #[test]
    fn test_set_target_saturates() {
        let mut param = delay_time();
        assert_eq!(param.set_target(5.0), 2.0);
        assert_eq!(param.set_target(-1.0), 0.03);
        assert_eq!(param.set_target(0.5), 0.5);
    }

    #[test]
    fn test_target_does_not_move_smoothed() {
        let mut param = delay_time();
        param.set_target(1.0);
        assert_eq!(param.smoothed(), 0.33);
        assert!(param.tick() > 0.33);
    }

    #[test]
    fn test_nudge_uses_step_and_clamps() {
        let mut param = delay_time();
        let up = param.nudge(1);
        assert!((up - 0.35).abs() < 1e-12);
        assert_eq!(param.nudge(-1000), 0.03);
    }

    #[test]
    fn test_instant_parameter_tracks_target_exactly() {
        let mut volume = Parameter::new(ParamId::Volume, 0.25, 0.0, 1.0, 1.0, 0.05, true);
        volume.set_target(0.8);
        assert_eq!(volume.tick(), 0.8);
        assert_eq!(volume.smoothed(), 0.8);
    }

    #[test]
    fn test_default_outside_bounds_is_clamped() {
        let param = Parameter::new(ParamId::Feedback, 1.5, 0.0, 0.92, 0.06, 0.03, false);
        assert_eq!(param.target(), 0.92);
        assert_eq!(param.smoothed(), 0.92);
    }

    #[test]
    fn test_non_finite_target_is_ignored() {
        let mut param = delay_time();
        param.set_target(0.5);
        assert_eq!(param.set_target(f64::NAN), 0.5);
        assert_eq!(param.set_target(f64::INFINITY), 0.5);
        assert_eq!(param.set_target(f64::NEG_INFINITY), 0.5);

        for _ in 0..500 {
            param.tick();
        }
        assert!((param.smoothed() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_default_rests_at_min() {
        let param = Parameter::new(ParamId::Pitch, f64::NAN, 0.0, 1.0, 0.1, 0.01, false);
        assert_eq!(param.target(), 0.0);
        assert_eq!(param.smoothed(), 0.0);
    }

    #[test]
    fn test_settle_ticks() {
        let mut volume = Parameter::new(ParamId::Volume, 0.25, 0.0, 1.0, 1.0, 0.05, true);
        assert_eq!(volume.settle_ticks(), 1.0);
        assert!(volume.is_instant());
        volume.set_target(0.5);
        assert_eq!(volume.tick(), 0.5);

        let ticks = delay_time().settle_ticks();
        assert!(ticks > 40.0 && ticks < 55.0, "ticks {}", ticks);
    }
}
