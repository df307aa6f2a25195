//! # medsim-types
//!
//! Shared types, identifiers, error types, and physical constants
//! for the medsim soft-tissue simulation toolkit.
//!
//! This crate has zero domain logic. It defines the vocabulary
//! that all other medsim crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{MedsimError, MedsimResult};
pub use ids::{BodyHandle, ConstraintId, IdAllocator, PbdParticleId};
