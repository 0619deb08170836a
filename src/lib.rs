//! Sirenbox - keyboard control surface for a dub siren and delay rig
//!
//! Operator gestures become smoothed, mapped and deduplicated OSC messages
//! for a sound engine. Tap tempo and a ×2 switch drive the delay time.

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod surface;
pub mod transport;

pub use config::SirenboxConfig;
pub use control::ControlLoop;
pub use engine::Engine;
