//! Exponential mapper implementation
//!
//! Maps a normalized 0..1 control onto a positive range so that equal
//! slider travel gives equal frequency or rate *ratios*, the way pitch and
//! tempo are heard.
//!
//! Use cases:
//! - Siren frequency from the shared pitch control
//! - LFO rate from the shared rate control

use super::{clamp, Mapper};

/// Map `x01` into `[vmin, vmax]` along a geometric curve.
///
/// `x01` is clamped to `[0, 1]` first, then the result is
/// `vmin * (vmax / vmin) ^ x01`. The endpoints are returned exactly.
///
/// Both bounds must be positive. That is checked when the configuration is
/// validated, never here.
pub fn exp_map(x01: f64, vmin: f64, vmax: f64) -> f64 {
    let x01 = clamp(x01, 0.0, 1.0);
    if x01 <= 0.0 {
        return vmin;
    }
    if x01 >= 1.0 {
        return vmax;
    }

    let ratio = vmax / vmin;
    let value = vmin * ratio.powf(x01);

    // powf rounding can land an ulp past an endpoint
    clamp(value, vmin.min(vmax), vmin.max(vmax))
}

/// Exponential mapper for a device-specific range
///
/// Holds the `(min, max)` pair of one sound generator, so a single shared
/// control can drive several devices with different ranges.
pub struct ExponentialMapper {
    name: String,
    min: f64,
    max: f64,
}

impl ExponentialMapper {
    /// Create a new exponential mapper
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Lower end of the output range
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper end of the output range
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Mapper for ExponentialMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        exp_map(input, self.min, self.max)
    }
}
