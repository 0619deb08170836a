//! Error types for the control core

use thiserror::Error;

/// Fatal, startup-only configuration problems.
///
/// Bounds are fixed once the loop is built, so none of these can occur
/// while the tick is running.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("parameter '{id}': min {min} is greater than max {max}")]
    InvertedRange { id: String, min: f64, max: f64 },

    #[error("parameter '{id}': {field} {value} must be finite")]
    NonFiniteValue { id: String, field: &'static str, value: f64 },

    #[error("parameter '{id}': alpha {alpha} must be in (0, 1]")]
    InvalidAlpha { id: String, alpha: f64 },

    #[error("parameter '{id}': step {step} must not be negative")]
    InvalidStep { id: String, step: f64 },

    #[error("output '{address}': exponential range {min}..{max} must be positive and finite")]
    NonPositiveExpRange { address: String, min: f64, max: f64 },

    #[error("output '{address}': exponential min {min} is greater than max {max}")]
    InvertedExpRange { address: String, min: f64, max: f64 },

    #[error("output '{address}': epsilon {epsilon} must be finite and not negative")]
    InvalidEpsilon { address: String, epsilon: f64 },

    #[error("output '{address}' reads unknown parameter '{source_id}'")]
    UnknownSource { address: String, source_id: String },

    #[error("output address '{0}' is declared more than once")]
    DuplicateAddress(String),

    #[error("output address must not be empty")]
    EmptyAddress,

    #[error("tick rate {0} Hz must be between 1 and 10000")]
    InvalidTickRate(f64),

    #[error("tap interval band {min}..{max} is empty or non-positive")]
    InvalidTapBand { min: f64, max: f64 },

    #[error("tap history capacities must be at least 2")]
    InvalidTapCapacity,

    #[error("required parameter '{0}' is not configured")]
    MissingParameter(String),
}

/// Failure to hand an outbound message to the wire.
///
/// Always recovered locally: the tick logs it and moves on.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// A headless command line that could not be understood.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("unknown trigger '{0}'")]
    UnknownTrigger(String),

    #[error("missing argument for '{0}'")]
    MissingArgument(&'static str),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}
