//! Distance (edge length) constraint.

use medsim_math::DVec3;
use medsim_types::constants::EPSILON;
use medsim_types::PbdParticleId;
use tracing::warn;

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, PbdConstraint};

/// Keeps two particles at their rest distance: `C = |x₀ − x₁| − L₀`.
#[derive(Debug, Clone)]
pub struct DistanceConstraint {
    base: ConstraintBase,
    rest_length: f64,
}

impl DistanceConstraint {
    /// Creates the constraint with `L₀ = |rest[0] − rest[1]|`.
    pub fn new(particles: [PbdParticleId; 2], rest: [DVec3; 2], stiffness: f64) -> Self {
        let rest_length = rest[0].distance(rest[1]);
        if rest_length < EPSILON {
            warn!(?particles, "Distance constraint with zero rest length");
        }
        Self {
            base: ConstraintBase::new(particles.to_vec(), stiffness),
            rest_length,
        }
    }

    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    pub fn set_rest_length(&mut self, rest_length: f64) {
        self.rest_length = rest_length;
    }
}

impl PbdConstraint for DistanceConstraint {
    fn name(&self) -> &'static str {
        "Distance"
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
        let [x0, x1] = state.gather::<2>(&self.base.particles)?;
        let diff = x0 - x1;
        let length = diff.length();
        if length < EPSILON {
            return None;
        }
        let n = diff / length;
        self.base.gradients[0] = n;
        self.base.gradients[1] = -n;
        Some(length - self.rest_length)
    }
}
