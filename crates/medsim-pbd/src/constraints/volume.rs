//! Tetrahedral volume constraint.

use medsim_math::{signed_tetrahedron_volume, DVec3};
use medsim_types::PbdParticleId;
use tracing::warn;

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, PbdConstraint};

/// Preserves the signed volume of a tetrahedron: `C = V − V₀` with
/// `V = (x₁−x₀)·((x₂−x₀)×(x₃−x₀)) / 6`.
#[derive(Debug, Clone)]
pub struct VolumeConstraint {
    base: ConstraintBase,
    rest_volume: f64,
}

impl VolumeConstraint {
    /// Creates the constraint with `V₀` from the rest positions.
    ///
    /// A negative rest volume means inverted winding; it is logged and
    /// kept as is.
    pub fn new(particles: [PbdParticleId; 4], rest: [DVec3; 4], stiffness: f64) -> Self {
        let [a, b, c, d] = rest;
        let rest_volume = signed_tetrahedron_volume(a, b, c, d);
        if rest_volume < 0.0 {
            warn!(?particles, rest_volume, "Tetrahedron has inverted winding");
        }
        Self {
            base: ConstraintBase::new(particles.to_vec(), stiffness),
            rest_volume,
        }
    }

    pub fn rest_volume(&self) -> f64 {
        self.rest_volume
    }

    pub fn set_rest_volume(&mut self, rest_volume: f64) {
        self.rest_volume = rest_volume;
    }
}

impl PbdConstraint for VolumeConstraint {
    fn name(&self) -> &'static str {
        "Volume"
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
        let [x0, x1, x2, x3] = state.gather::<4>(&self.base.particles)?;
        let (a, b, c) = (x1 - x0, x2 - x0, x3 - x0);
        let g1 = b.cross(c) / 6.0;
        let g2 = c.cross(a) / 6.0;
        let g3 = a.cross(b) / 6.0;
        self.base.gradients.copy_from_slice(&[-(g1 + g2 + g3), g1, g2, g3]);
        Some(a.dot(b.cross(c)) / 6.0 - self.rest_volume)
    }
}
