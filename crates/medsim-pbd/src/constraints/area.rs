//! Triangle area constraint.

use medsim_math::{triangle_area, DVec3};
use medsim_types::constants::EPSILON;
use medsim_types::PbdParticleId;

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, PbdConstraint};

/// Preserves the area of a triangle: `C = A − A₀`.
#[derive(Debug, Clone)]
pub struct AreaConstraint {
    base: ConstraintBase,
    rest_area: f64,
}

impl AreaConstraint {
    pub fn new(particles: [PbdParticleId; 3], rest: [DVec3; 3], stiffness: f64) -> Self {
        Self {
            base: ConstraintBase::new(particles.to_vec(), stiffness),
            rest_area: triangle_area(rest[0], rest[1], rest[2]),
        }
    }

    pub fn rest_area(&self) -> f64 {
        self.rest_area
    }
}

impl PbdConstraint for AreaConstraint {
    fn name(&self) -> &'static str {
        "Area"
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
        let [x0, x1, x2] = state.gather::<3>(&self.base.particles)?;
        let (e1, e2) = (x1 - x0, x2 - x0);
        let normal = e1.cross(e2);
        let twice_area = normal.length();
        if twice_area < EPSILON {
            return None;
        }
        let n = normal / twice_area;
        let g1 = e2.cross(n) * 0.5;
        let g2 = n.cross(e1) * 0.5;
        self.base.gradients.copy_from_slice(&[-(g1 + g2), g1, g2]);
        Some(0.5 * twice_area - self.rest_area)
    }
}
