//! Tempo readout for the display adapter

use std::fmt;

use super::TapOutcome;

/// Below this delay time there is no meaningful tempo
const MIN_TEMPO_TIME: f64 = 1e-9;

/// Feedback about the last tap
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TapHint {
    /// One tap recorded
    FirstTap,
    /// One accepted gap, need another
    Collecting,
    /// The last gap was out of band
    Reset,
    /// Showing the current delay time
    #[default]
    Locked,
}

impl From<TapOutcome> for TapHint {
    fn from(outcome: TapOutcome) -> Self {
        match outcome {
            TapOutcome::AwaitingFirst => TapHint::FirstTap,
            TapOutcome::AwaitingSecond => TapHint::Collecting,
            TapOutcome::Reset => TapHint::Reset,
            TapOutcome::Estimate(_) => TapHint::Locked,
        }
    }
}

/// Derived tempo values, recomputed whenever the delay-time target changes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TempoDisplay {
    /// Delay time target in seconds
    pub delay_time: f64,
    /// Whether ×2 is engaged
    pub doubled: bool,
    pub hint: TapHint,
}

impl TempoDisplay {
    pub fn new(delay_time: f64, doubled: bool, hint: TapHint) -> Self {
        Self {
            delay_time,
            doubled,
            hint,
        }
    }

    /// Beats per minute, or `None` when the delay time is effectively zero
    pub fn bpm(&self) -> Option<f64> {
        if self.delay_time > MIN_TEMPO_TIME {
            Some(60.0 / self.delay_time)
        } else {
            None
        }
    }

    /// Text for the tap indicator
    pub fn hint_text(&self) -> String {
        match self.hint {
            TapHint::FirstTap => "tap…".to_string(),
            TapHint::Collecting => "…".to_string(),
            TapHint::Reset => "reset".to_string(),
            TapHint::Locked => {
                let suffix = if self.doubled { " x2" } else { "" };
                format!("{:.3}s{}", self.delay_time, suffix)
            }
        }
    }
}

impl fmt::Display for TempoDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bpm() {
            Some(bpm) => write!(f, "{:5.1} bpm  {}", bpm, self.hint_text()),
            None => write!(f, "  — bpm  {}", self.hint_text()),
        }
    }
}
