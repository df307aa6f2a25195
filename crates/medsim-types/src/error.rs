//! Error types for medsim.
//!
//! Setup-time operations return `MedsimResult<T>`. Per-frame code paths
//! (projection, solve, map application) never fail; they log and skip.

use thiserror::Error;

/// Unified error type for medsim.
#[derive(Debug, Error)]
pub enum MedsimError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Material parameter is out of valid range.
    #[error("Invalid material parameter: {0}")]
    InvalidMaterial(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A geometry of the wrong kind was handed to a map or functor.
    #[error("Geometry mismatch: expected {expected}, found {found}")]
    GeometryMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A map was used before both endpoints were set and the map computed.
    #[error("Map not ready: {0}")]
    MapNotReady(String),

    /// A body handle did not resolve in the registry.
    #[error("Unknown body handle {0}")]
    UnknownBody(u32),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, MedsimError>`.
pub type MedsimResult<T> = Result<T, MedsimError>;
