//! Change-threshold gate for outbound messages
//!
//! The smoother keeps creeping toward its target forever, so without this
//! gate every output would be re-sent on every tick.

use std::collections::HashMap;

/// Sends a value only when it moved more than `epsilon` since the last send
#[derive(Debug, Default, Clone)]
pub struct DispatchGate {
    last_sent: HashMap<String, f64>,
}

impl DispatchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(value)` and records it when the message should go out.
    pub fn maybe_emit(&mut self, address: &str, value: f64, epsilon: f64) -> Option<f64> {
        match self.last_sent.get_mut(address) {
            Some(last) if (value - *last).abs() <= epsilon => None,
            Some(last) => {
                *last = value;
                Some(value)
            }
            None => {
                self.last_sent.insert(address.to_string(), value);
                Some(value)
            }
        }
    }

    /// Last value sent on `address`, if any
    pub fn last_sent(&self, address: &str) -> Option<f64> {
        self.last_sent.get(address).copied()
    }

    /// Number of addresses seen so far
    pub fn len(&self) -> usize {
        self.last_sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_sent.is_empty()
    }
}
