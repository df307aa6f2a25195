//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Default simulation timestep (seconds).
pub const DEFAULT_DT: f64 = 0.01;

/// Default number of constraint projection iterations per timestep.
pub const DEFAULT_PBD_ITERATIONS: u32 = 10;

/// Buckets smaller than this are dissolved back into the sequential pool.
pub const DEFAULT_PARTITION_THRESHOLD: usize = 16;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1.0e-12;

/// Determinant / volume magnitude below which a simplex is treated as degenerate.
pub const DEGENERATE_VOLUME_THRESHOLD: f64 = 1.0e-14;

/// Slack allowed on barycentric weights when testing point containment.
pub const INSIDE_TOLERANCE: f64 = 1.0e-10;
