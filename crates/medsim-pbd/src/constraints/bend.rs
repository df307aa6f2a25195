//! Three-point bending constraint for strands.

use medsim_math::DVec3;
use medsim_types::constants::EPSILON;
use medsim_types::PbdParticleId;

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, PbdConstraint};

/// Keeps the middle particle of `(x₀, x₁, x₂)` at its rest offset from
/// the triple's centroid: `C = |x₁ − c| − d₀`, `c = (x₀ + x₁ + x₂) / 3`.
///
/// For a straight strand `d₀ = 0` and any kink is penalized.
#[derive(Debug, Clone)]
pub struct BendConstraint {
    base: ConstraintBase,
    rest_offset: f64,
}

impl BendConstraint {
    pub fn new(particles: [PbdParticleId; 3], rest: [DVec3; 3], stiffness: f64) -> Self {
        let center = (rest[0] + rest[1] + rest[2]) / 3.0;
        Self {
            base: ConstraintBase::new(particles.to_vec(), stiffness),
            rest_offset: rest[1].distance(center),
        }
    }

    pub fn rest_offset(&self) -> f64 {
        self.rest_offset
    }
}

impl PbdConstraint for BendConstraint {
    fn name(&self) -> &'static str {
        "Bend"
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
        let [x0, x1, x2] = state.gather::<3>(&self.base.particles)?;
        let diff = x1 - (x0 + x1 + x2) / 3.0;
        let dist = diff.length();
        if dist < EPSILON {
            return None;
        }
        let n = diff / dist;
        self.base
            .gradients
            .copy_from_slice(&[n * (-1.0 / 3.0), n * (2.0 / 3.0), n * (-1.0 / 3.0)]);
        Some(dist - self.rest_offset)
    }
}
