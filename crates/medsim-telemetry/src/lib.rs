//! # medsim-telemetry
//!
//! Event bus for solver telemetry. The PBD model emits structured events
//! (timestep timing, per-iteration residuals, partitioning, runtime
//! constraint changes) that are consumed by pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
