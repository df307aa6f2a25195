//! Constraint trait: the core PBD abstraction.
//!
//! Every constraint kind implements [`PbdConstraint`]. The trait is open:
//! user crates can add their own kinds and feed them to the container
//! through a [`PbdConstraintFunctor`](crate::functors::PbdConstraintFunctor).

use std::fmt;

use medsim_math::DVec3;
use medsim_types::constants::EPSILON;
use medsim_types::PbdParticleId;
use serde::{Deserialize, Serialize};

use crate::body::PbdState;

/// Projection formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverType {
    /// Classic PBD: stiffness in `[0, 1]` scales each projection, the
    /// effective stiffness depends on the iteration count.
    Pbd,
    /// Extended PBD: stiffness is a physical modulus, compliance
    /// `α = 1/stiffness` and an accumulated Lagrange multiplier per
    /// constraint make the result independent of iteration count.
    #[default]
    #[serde(rename = "xpbd")]
    XPbd,
}

/// Position corrections produced by one projection.
pub type Correction = Vec<(PbdParticleId, DVec3)>;

/// State shared by every constraint kind.
#[derive(Debug, Clone)]
pub struct ConstraintBase {
    /// Particles referenced by the constraint, in constraint order.
    pub particles: Vec<PbdParticleId>,
    /// ∇C per particle, written by `compute_value_and_gradient`.
    pub gradients: Vec<DVec3>,
    /// XPBD Lagrange multiplier accumulated over the current timestep.
    pub lambda: f64,
    stiffness: f64,
    compliance: f64,
}

impl ConstraintBase {
    pub fn new(particles: Vec<PbdParticleId>, stiffness: f64) -> Self {
        let n = particles.len();
        let mut base = Self {
            particles,
            gradients: vec![DVec3::ZERO; n],
            lambda: 0.0,
            stiffness: 0.0,
            compliance: f64::INFINITY,
        };
        base.set_stiffness(stiffness);
        base
    }

    #[inline]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// XPBD compliance `1 / stiffness` (infinite for zero stiffness).
    #[inline]
    pub fn compliance(&self) -> f64 {
        self.compliance
    }

    /// Sets stiffness and the derived compliance.
    pub fn set_stiffness(&mut self, stiffness: f64) {
        self.stiffness = stiffness.max(0.0);
        self.compliance = if self.stiffness > 0.0 {
            1.0 / self.stiffness
        } else {
            f64::INFINITY
        };
    }

    /// Resizes the gradient scratch buffer after the particle list changed.
    pub fn reset_gradients(&mut self) {
        self.gradients.clear();
        self.gradients.resize(self.particles.len(), DVec3::ZERO);
    }
}

/// A position-based constraint.
///
/// Implementors provide the constraint function and its gradient; the
/// default `compute_correction` turns those into per-particle position
/// deltas with the PBD or XPBD update rule.
pub trait PbdConstraint: Send + Sync + fmt::Debug {
    /// Kind name for diagnostics.
    fn name(&self) -> &'static str;

    fn base(&self) -> &ConstraintBase;

    fn base_mut(&mut self) -> &mut ConstraintBase;

    /// Evaluates `C` at the current positions and writes `∇C` into
    /// `base().gradients`.
    ///
    /// Returns `None` when the configuration is singular (gradient
    /// undefined) or a particle does not resolve; the caller skips the
    /// constraint for this iteration.
    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64>;

    /// Particles referenced by the constraint.
    fn particles(&self) -> &[PbdParticleId] {
        &self.base().particles
    }

    /// Computes this iteration's position corrections without writing
    /// positions. Updates the Lagrange multiplier under XPBD.
    fn compute_correction(
        &mut self,
        state: &PbdState,
        dt: f64,
        solver: SolverType,
    ) -> Option<Correction> {
        let c = self.compute_value_and_gradient(state)?;
        solve_correction(self.base_mut(), c, state, dt, solver)
    }

    /// One Gauss-Seidel projection: computes and immediately applies the
    /// correction. Pinned particles never move.
    fn project_constraint(&mut self, state: &mut PbdState, dt: f64, solver: SolverType) {
        if let Some(correction) = self.compute_correction(state, dt, solver) {
            for (id, delta) in correction {
                state.apply_correction(id, delta);
            }
        }
    }

    /// Resets the accumulated Lagrange multiplier (start of a timestep).
    fn zero_lambda(&mut self) {
        self.base_mut().lambda = 0.0;
    }

    fn stiffness(&self) -> f64 {
        self.base().stiffness()
    }

    fn set_stiffness(&mut self, stiffness: f64) {
        self.base_mut().set_stiffness(stiffness);
    }
}

/// The generic PBD/XPBD update for a constraint whose value `c` and
/// gradients (in `base.gradients`) are already evaluated.
///
/// `Δx_i = w_i · Δλ · ∇_i C` with
/// - PBD:  `Δλ = -C · k / Σ w_j |∇_j C|²`, `k` clamped to `[0, 1]`
/// - XPBD: `Δλ = -(C + α̃ λ) / (Σ w_j |∇_j C|² + α̃)`, `α̃ = α / dt²`
///
/// Returns `None` if no particle can move or the constraint has zero
/// stiffness.
pub fn solve_correction(
    base: &mut ConstraintBase,
    c: f64,
    state: &PbdState,
    dt: f64,
    solver: SolverType,
) -> Option<Correction> {
    if base.stiffness <= 0.0 {
        return None;
    }

    let mut weighted = 0.0;
    for (&id, g) in base.particles.iter().zip(&base.gradients) {
        weighted += state.inv_mass(id)? * g.length_squared();
    }
    if weighted < EPSILON {
        return None;
    }

    let dlambda = match solver {
        SolverType::Pbd => -c * base.stiffness.min(1.0) / weighted,
        SolverType::XPbd => {
            let alpha = base.compliance / (dt * dt);
            let dlambda = -(c + alpha * base.lambda) / (weighted + alpha);
            base.lambda += dlambda;
            dlambda
        }
    };

    Some(
        base.particles
            .iter()
            .zip(&base.gradients)
            .filter_map(|(&id, &g)| {
                let w = state.inv_mass(id)?;
                (w > 0.0).then(|| (id, g * (w * dlambda)))
            })
            .collect(),
    )
}
