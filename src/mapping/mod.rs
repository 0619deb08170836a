//! Value mapping for outbound parameters
//!
//! Pure, stateless helpers that turn a smoothed control value into the
//! value a sound generator expects.

mod direct;
mod exponential;
mod mapper;

pub use direct::{clamp, DirectMapper};
pub use exponential::{exp_map, ExponentialMapper};
pub use mapper::Mapper;
