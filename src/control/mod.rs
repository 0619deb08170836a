//! The control loop
//!
//! Input handlers write parameter targets between ticks. Each tick glides
//! every smoothed value toward its target, derives per-device outputs and
//! lets only meaningful changes through the dispatch gate.

mod display;
mod doubler;
mod event;
mod gate;
mod parameter;
mod smoother;
mod tap;

pub use display::{TapHint, TempoDisplay};
pub use doubler::TempoDoubler;
pub use event::{ControlEvent, Device, MessageValue, OutboundMessage, Trigger};
pub use gate::DispatchGate;
pub use parameter::{ParamId, Parameter};
pub use smoother::Smoother;
pub use tap::{TapOutcome, TapSettings, TapTempo};

use std::collections::BTreeMap;

use crate::config::{OutputMap, SirenboxConfig};
use crate::error::ConfigError;
use crate::mapping::{DirectMapper, ExponentialMapper, Mapper};

/// One outbound channel derived from a parameter
#[derive(Debug)]
struct Output {
    address: String,
    source: ParamId,
    mapper: Box<dyn Mapper>,
    epsilon: f64,
}

/// Read-only view of a parameter for display
#[derive(Debug, Clone, PartialEq)]
pub struct ParamView {
    pub id: ParamId,
    pub target: f64,
    pub smoothed: f64,
    pub min: f64,
    pub max: f64,
}

impl From<&Parameter> for ParamView {
    fn from(param: &Parameter) -> Self {
        Self {
            id: param.id(),
            target: param.target(),
            smoothed: param.smoothed(),
            min: param.min(),
            max: param.max(),
        }
    }
}

/// Everything a display adapter needs after an event or tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub tempo: TempoDisplay,
    pub params: Vec<ParamView>,
}

/// Owns all control state and runs the tick
#[derive(Debug)]
pub struct ControlLoop {
    parameters: BTreeMap<ParamId, Parameter>,
    outputs: Vec<Output>,
    gate: DispatchGate,
    tap: TapTempo,
    doubler: TempoDoubler,
    display: TempoDisplay,
}

impl ControlLoop {
    /// Build the loop from a configuration. All targets start at their
    /// configured defaults.
    pub fn new(config: &SirenboxConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let parameters: BTreeMap<ParamId, Parameter> = config
            .parameters
            .iter()
            .map(|(&id, p)| {
                let param = Parameter::new(id, p.default, p.min, p.max, p.alpha, p.step, p.instant);
                (id, param)
            })
            .collect();

        let outputs = config
            .outputs
            .iter()
            .filter_map(|o| {
                let address = o.address.trim_start_matches('/').to_string();
                let source = parameters.get(&o.source)?;
                let mapper: Box<dyn Mapper> = match o.map {
                    OutputMap::Direct => {
                        Box::new(DirectMapper::new(address.clone(), source.min(), source.max()))
                    }
                    OutputMap::Exponential { min, max } => {
                        Box::new(ExponentialMapper::new(address.clone(), min, max))
                    }
                };
                Some(Output {
                    address,
                    source: o.source,
                    mapper,
                    epsilon: o.epsilon,
                })
            })
            .collect();

        let delay = parameters
            .get(&ParamId::DelayTime)
            .ok_or_else(|| ConfigError::MissingParameter(ParamId::DelayTime.to_string()))?;
        let (time_min, time_max) = (delay.min(), delay.max());
        let display = TempoDisplay::new(delay.target(), false, TapHint::Locked);

        Ok(Self {
            parameters,
            outputs,
            gate: DispatchGate::new(),
            tap: TapTempo::new(config.tap.clone(), time_min, time_max),
            doubler: TempoDoubler::new(time_min, time_max),
            display,
        })
    }

    /// Single entry point for input adapters.
    ///
    /// Returns the one-shot message a trigger produces; every other event only
    /// changes state for the next tick.
    pub fn apply_event(&mut self, event: ControlEvent) -> Option<OutboundMessage> {
        match event {
            ControlEvent::TargetChanged { id, value } => {
                self.set_target(id, value);
            }
            ControlEvent::Nudged { id, steps } => {
                self.nudge(id, steps);
            }
            ControlEvent::TapRegistered { timestamp } => {
                self.trigger_tap(timestamp);
            }
            ControlEvent::DoubleToggled { active } => {
                self.set_double_active(active);
            }
            ControlEvent::DoubleFlipped => {
                self.toggle_double();
            }
            ControlEvent::Triggered(trigger) => return Some(self.trigger_discrete(trigger)),
        }
        None
    }

    /// Set a target, saturating at the parameter bounds.
    pub fn set_target(&mut self, id: ParamId, value: f64) -> Option<f64> {
        let stored = self.parameters.get_mut(&id)?.set_target(value);
        if id == ParamId::DelayTime {
            self.refresh_display(TapHint::Locked);
        }
        Some(stored)
    }

    /// Move a target by whole steps.
    pub fn nudge(&mut self, id: ParamId, steps: i32) -> Option<f64> {
        let stored = self.parameters.get_mut(&id)?.nudge(steps);
        if id == ParamId::DelayTime {
            self.refresh_display(TapHint::Locked);
        }
        Some(stored)
    }

    /// Register a tap. An estimate becomes the delay-time target at once.
    pub fn trigger_tap(&mut self, timestamp: f64) -> TapOutcome {
        let outcome = self.tap.register_tap(timestamp);
        tracing::debug!(?outcome, "tap");

        if let TapOutcome::Estimate(interval) = outcome {
            if let Some(delay) = self.parameters.get_mut(&ParamId::DelayTime) {
                delay.set_target(interval);
            }
        }
        self.refresh_display(outcome.into());
        outcome
    }

    /// Apply the ×2 state reported by a checkbox-style input.
    pub fn set_double_active(&mut self, active: bool) -> f64 {
        if active == self.doubler.is_active() {
            return self.delay_target();
        }
        let next = self.doubler.apply(active, self.delay_target());
        self.set_target(ParamId::DelayTime, next).unwrap_or(next)
    }

    /// Flip the ×2 state.
    pub fn toggle_double(&mut self) -> f64 {
        self.set_double_active(!self.doubler.is_active())
    }

    /// Forward a one-shot trigger untouched by smoothing.
    pub fn trigger_discrete(&self, trigger: Trigger) -> OutboundMessage {
        let message = trigger.message();
        tracing::debug!(%message, "trigger");
        message
    }

    /// Run one tick: smooth, map, gate.
    pub fn tick(&mut self) -> Vec<OutboundMessage> {
        for param in self.parameters.values_mut() {
            param.tick();
        }

        let mut messages = Vec::new();
        for output in &self.outputs {
            let Some(source) = self.parameters.get(&output.source) else {
                continue;
            };
            let value = output.mapper.map(source.smoothed());
            if let Some(value) = self.gate.maybe_emit(&output.address, value, output.epsilon) {
                messages.push(OutboundMessage::float(output.address.clone(), value));
            }
        }
        messages
    }

    pub fn parameter(&self, id: ParamId) -> Option<&Parameter> {
        self.parameters.get(&id)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn target(&self, id: ParamId) -> Option<f64> {
        self.parameter(id).map(Parameter::target)
    }

    pub fn smoothed(&self, id: ParamId) -> Option<f64> {
        self.parameter(id).map(Parameter::smoothed)
    }

    pub fn display(&self) -> TempoDisplay {
        self.display
    }

    pub fn is_doubled(&self) -> bool {
        self.doubler.is_active()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tempo: self.display,
            params: self.parameters.values().map(ParamView::from).collect(),
        }
    }

    fn delay_target(&self) -> f64 {
        self.target(ParamId::DelayTime).unwrap_or_default()
    }

    fn refresh_display(&mut self, hint: TapHint) {
        self.display = TempoDisplay::new(self.delay_target(), self.doubler.is_active(), hint);
    }
}
