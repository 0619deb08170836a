//! Fixed-rate scheduler for the control loop
//!
//! Runs `ControlLoop::tick()` on a tokio interval and applies input events
//! as they arrive between ticks. Adapters talk to it through an
//! [`EngineHandle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::config::SirenboxConfig;
use crate::control::{ControlEvent, ControlLoop, OutboundMessage, Snapshot};
use crate::error::ConfigError;
use crate::transport::Transport;

/// Counters reported when the engine stops
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineStats {
    pub ticks: u64,
    pub events: u64,
    pub sent: u64,
    pub failed: u64,
}

/// Input side of a running engine, cheap to clone
#[derive(Clone)]
pub struct EngineHandle {
    events: mpsc::UnboundedSender<ControlEvent>,
    snapshots: watch::Receiver<Snapshot>,
    running: Arc<AtomicBool>,
}

impl EngineHandle {
    /// Queue an event for the engine. Returns false once the engine is gone.
    pub fn send(&self, event: ControlEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Latest published state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Ask the engine to stop after the current tick
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared stop flag, for signal handlers
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
}

/// The scheduler
pub struct Engine<T: Transport> {
    control: ControlLoop,
    transport: T,
    events: mpsc::UnboundedReceiver<ControlEvent>,
    snapshots: watch::Sender<Snapshot>,
    running: Arc<AtomicBool>,
    period: Duration,
    stats: EngineStats,
}

impl<T: Transport> Engine<T> {
    /// Create an engine and the handle its input adapters use
    pub fn new(config: &SirenboxConfig, transport: T) -> Result<(Self, EngineHandle), ConfigError> {
        let control = ControlLoop::new(config)?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(control.snapshot());
        let running = Arc::new(AtomicBool::new(true));

        let engine = Self {
            control,
            transport,
            events: event_rx,
            snapshots: snapshot_tx,
            running: Arc::clone(&running),
            period: config.tick_period(),
            stats: EngineStats::default(),
        };
        let handle = EngineHandle {
            events: event_tx,
            snapshots: snapshot_rx,
            running,
        };
        Ok((engine, handle))
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run until stopped or until every handle is dropped
    pub async fn run(mut self) -> EngineStats {
        tracing::info!(period_ms = self.period.as_secs_f64() * 1000.0, "control loop started");

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = ticker.tick() => self.tick(),
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!(
            ticks = self.stats.ticks,
            events = self.stats.events,
            sent = self.stats.sent,
            failed = self.stats.failed,
            "control loop stopped"
        );
        self.stats
    }

    fn handle_event(&mut self, event: ControlEvent) {
        self.stats.events += 1;
        if let Some(message) = self.control.apply_event(event) {
            self.dispatch(&message);
        }
        self.publish();
    }

    fn tick(&mut self) {
        self.stats.ticks += 1;
        for message in self.control.tick() {
            self.dispatch(&message);
        }
        self.publish();
    }

    fn dispatch(&mut self, message: &OutboundMessage) {
        match self.transport.send(message) {
            Ok(()) => self.stats.sent += 1,
            Err(e) => {
                self.stats.failed += 1;
                tracing::warn!(address = %message.address, error = %e, "dropped outbound message");
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.control.snapshot());
    }
}
