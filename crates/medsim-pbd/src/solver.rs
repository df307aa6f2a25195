//! Iterative position projection.
//!
//! One iteration is a sweep over every live constraint:
//!
//! ```text
//! for each constraint in the sequential pool (container order):
//!     compute correction, apply immediately          (Gauss-Seidel)
//! for each partition bucket:
//!     compute all corrections in parallel against the same positions
//!     apply them                                     (vertex-disjoint)
//! ```
//!
//! Buckets are vertex-disjoint by construction, so computing a bucket's
//! corrections against a shared snapshot and then applying them is
//! identical to projecting its constraints one after another in place.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::body::PbdState;
use crate::constraint::{Correction, SolverType};
use crate::container::{ConstraintEntry, PbdConstraintContainer};

/// Outcome of one [`PbdSolver::solve`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Number of sweeps performed.
    pub iterations: u32,
    /// Largest single position correction of the last sweep.
    pub final_residual: f64,
    /// Whether the last sweep fell below the tolerance.
    pub converged: bool,
    /// Residual of every sweep, in order.
    pub residuals: Vec<f64>,
}

/// Gauss-Seidel / partitioned-Jacobi PBD solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PbdSolver {
    /// Hard cap on sweeps per solve.
    pub iterations: u32,
    pub solver_type: SolverType,
    /// Early exit once the largest correction of a sweep drops below this.
    /// Zero disables the early exit.
    pub tolerance: f64,
    /// Dispatch partition buckets to the rayon pool.
    pub parallel: bool,
}

impl Default for PbdSolver {
    fn default() -> Self {
        Self {
            iterations: medsim_types::constants::DEFAULT_PBD_ITERATIONS,
            solver_type: SolverType::default(),
            tolerance: 0.0,
            parallel: true,
        }
    }
}

impl PbdSolver {
    pub fn new(iterations: u32, solver_type: SolverType) -> Self {
        Self {
            iterations,
            solver_type,
            ..Self::default()
        }
    }

    /// Projects every constraint in `container` up to `iterations` times.
    ///
    /// Lagrange multipliers are reset first, so each call is one timestep
    /// for XPBD. Constraints whose gradient is undefined in the current
    /// configuration are skipped for that sweep.
    pub fn solve(
        &self,
        container: &mut PbdConstraintContainer,
        state: &mut PbdState,
        dt: f64,
    ) -> SolveReport {
        let (pool, buckets) = container.parts_mut();
        for entry in pool.iter_mut().chain(buckets.iter_mut().flatten()) {
            entry.constraint.zero_lambda();
        }

        let mut report = SolveReport::default();
        if pool.is_empty() && buckets.is_empty() {
            return report;
        }

        for iteration in 1..=self.iterations {
            let mut residual = 0.0_f64;

            for entry in pool.iter_mut() {
                if let Some(correction) =
                    entry.constraint.compute_correction(state, dt, self.solver_type)
                {
                    residual = residual.max(apply(state, correction));
                }
            }

            for bucket in buckets.iter_mut() {
                let corrections = self.bucket_corrections(bucket, state, dt);
                for correction in corrections {
                    residual = residual.max(apply(state, correction));
                }
            }

            trace!(iteration, residual, "PBD sweep");
            report.iterations = iteration;
            report.final_residual = residual;
            report.residuals.push(residual);
            if residual < self.tolerance {
                report.converged = true;
                break;
            }
        }

        debug!(
            iterations = report.iterations,
            residual = report.final_residual,
            converged = report.converged,
            "PBD solve finished"
        );
        report
    }

    fn bucket_corrections(
        &self,
        bucket: &mut [ConstraintEntry],
        state: &PbdState,
        dt: f64,
    ) -> Vec<Correction> {
        let solver = self.solver_type;
        if self.parallel {
            bucket
                .par_iter_mut()
                .filter_map(|entry| entry.constraint.compute_correction(state, dt, solver))
                .collect()
        } else {
            bucket
                .iter_mut()
                .filter_map(|entry| entry.constraint.compute_correction(state, dt, solver))
                .collect()
        }
    }
}

/// Applies a correction and returns its largest displacement.
fn apply(state: &mut PbdState, correction: Correction) -> f64 {
    correction.into_iter().fold(0.0, |max, (id, delta)| {
        state.apply_correction(id, delta);
        max.max(delta.length())
    })
}
