//! Clamping and the pass-through mapper

use super::Mapper;

/// Saturate `x` into `[lo, hi]`.
///
/// Total: returns `lo` below the range, `hi` above it, `x` otherwise.
/// Unlike `f64::clamp` this never panics, which matters because bounds come
/// from user configuration.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Passes a value through unchanged apart from clamping to its range
pub struct DirectMapper {
    name: String,
    min: f64,
    max: f64,
}

impl DirectMapper {
    /// Create a new direct mapper
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }
}

impl Mapper for DirectMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        clamp(input, self.min, self.max)
    }
}
