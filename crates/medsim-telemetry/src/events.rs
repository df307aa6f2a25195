//! Simulation event types.
//!
//! Structured events emitted by the PBD model at fixed points of each
//! timestep. Events are plain values carrying just enough data to
//! monitor convergence and topology changes.

use serde::{Deserialize, Serialize};

/// A simulation event tagged with the timestep that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Timestep number (0-indexed).
    pub timestep: u32,
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Timestep started.
    TimestepBegin {
        /// Simulation time at the start of the step (seconds).
        sim_time: f64,
    },

    /// Timestep completed.
    TimestepEnd {
        /// Wall-clock time for the whole step (seconds).
        wall_time: f64,
    },

    /// One projection sweep over every constraint finished.
    SolverIteration {
        iteration: u32,
        /// Largest position correction applied during the sweep.
        residual: f64,
    },

    /// Solver summary for the timestep.
    Convergence {
        iterations: u32,
        final_residual: f64,
        converged: bool,
    },

    /// Constraints were regrouped into parallel buckets.
    Partitioned {
        colors: u32,
        partitions: u32,
        /// Constraints left in the sequential pool.
        sequential: u32,
    },

    /// Constraints were added at runtime (contacts, stitching).
    ConstraintsAdded { count: u32 },

    /// Constraints were removed at runtime (contacts, tearing).
    ConstraintsRemoved { count: u32 },

    /// Kinetic energy over all free particles.
    Energy { kinetic: f64 },
}

impl SimulationEvent {
    pub fn new(timestep: u32, kind: EventKind) -> Self {
        Self { timestep, kind }
    }
}
