//! # medsim-bench
//!
//! Procedural benchmark scenarios for the PBD solver, a runner that
//! steps them, and CSV export of the collected metrics.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
