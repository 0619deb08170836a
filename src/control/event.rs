//! Inbound events and outbound messages

use std::fmt;
use std::str::FromStr;

use super::ParamId;
use crate::error::CommandError;

/// Sound generators that accept one-shot triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    /// Dub siren
    Siren,
    /// Air horn
    Air,
    /// Ben's bleep
    Bens,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Siren, Device::Air, Device::Bens];

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Siren => "siren",
            Device::Air => "air",
            Device::Bens => "bens",
        }
    }
}

/// One-shot control that bypasses smoothing entirely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Flush the delay line
    ClearDelay,
    /// Start or stop a device
    Toggle(Device),
    /// Stop a device
    Stop(Device),
}

impl Trigger {
    pub fn address(&self) -> String {
        match self {
            Trigger::ClearDelay => "delay/clear".to_string(),
            Trigger::Toggle(device) => format!("{}/toggle", device.as_str()),
            Trigger::Stop(device) => format!("{}/stop", device.as_str()),
        }
    }

    /// The message sent the moment this trigger fires
    pub fn message(&self) -> OutboundMessage {
        OutboundMessage::int(self.address(), 1)
    }
}

impl FromStr for Trigger {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = s.trim_start_matches('/');
        if address == "delay/clear" {
            return Ok(Trigger::ClearDelay);
        }

        let unknown = || CommandError::UnknownTrigger(s.to_string());
        let (device, action) = address.split_once('/').ok_or_else(unknown)?;
        let device = Device::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == device)
            .ok_or_else(unknown)?;

        match action {
            "toggle" => Ok(Trigger::Toggle(device)),
            "stop" => Ok(Trigger::Stop(device)),
            _ => Err(unknown()),
        }
    }
}

/// Everything an input adapter can tell the control loop
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// A slider moved to an absolute value
    TargetChanged { id: ParamId, value: f64 },
    /// A key moved a target by whole steps
    Nudged { id: ParamId, steps: i32 },
    /// Tap tempo, timestamp in seconds on a monotonic clock
    TapRegistered { timestamp: f64 },
    /// The ×2 checkbox reported its state
    DoubleToggled { active: bool },
    /// The ×2 key flipped the current state
    DoubleFlipped,
    /// A pass-through trigger
    Triggered(Trigger),
}

/// Argument of an outbound message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageValue {
    Float(f64),
    Int(i32),
}

impl fmt::Display for MessageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageValue::Float(v) => write!(f, "{:.4}", v),
            MessageValue::Int(v) => write!(f, "{}", v),
        }
    }
}

/// An `(address, value)` pair for the transport to serialize
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub address: String,
    pub value: MessageValue,
}

impl OutboundMessage {
    pub fn float(address: impl Into<String>, value: f64) -> Self {
        Self {
            address: address.into(),
            value: MessageValue::Float(value),
        }
    }

    pub fn int(address: impl Into<String>, value: i32) -> Self {
        Self {
            address: address.into(),
            value: MessageValue::Int(value),
        }
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_addresses() {
        assert_eq!(Trigger::ClearDelay.address(), "delay/clear");
        assert_eq!(Trigger::Toggle(Device::Siren).address(), "siren/toggle");
        assert_eq!(Trigger::Stop(Device::Air).address(), "air/stop");
        assert_eq!(Trigger::Toggle(Device::Bens).address(), "bens/toggle");
    }

    #[test]
    fn test_trigger_message_is_int_one() {
        let msg = Trigger::Stop(Device::Bens).message();
        assert_eq!(msg, OutboundMessage::int("bens/stop", 1));
    }

    #[test]
    fn test_trigger_parses_from_address() {
        assert_eq!("delay/clear".parse::<Trigger>(), Ok(Trigger::ClearDelay));
        assert_eq!("/siren/toggle".parse::<Trigger>(), Ok(Trigger::Toggle(Device::Siren)));
        assert_eq!("air/stop".parse::<Trigger>(), Ok(Trigger::Stop(Device::Air)));
    }

    #[test]
    fn test_trigger_parse_rejects_unknown() {
        assert!("siren/explode".parse::<Trigger>().is_err());
        assert!("drums/toggle".parse::<Trigger>().is_err());
        assert!("clear".parse::<Trigger>().is_err());
    }

    #[test]
    fn test_message_display() {
        assert_eq!(OutboundMessage::float("delay/time", 0.33).to_string(), "delay/time 0.3300");
        assert_eq!(OutboundMessage::int("siren/stop", 1).to_string(), "siren/stop 1");
    }
}
