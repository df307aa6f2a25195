//! Dihedral-angle bending constraint for triangle surfaces.

use medsim_math::DVec3;
use medsim_types::constants::EPSILON;
use medsim_types::PbdParticleId;

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, PbdConstraint};

/// Preserves the dihedral angle between two triangles sharing an edge.
///
/// Particles are ordered `(w₀, w₁, e₀, e₁)`: the two wing vertices then
/// the shared edge. With `e = e₁ − e₀` and face normals
/// `n₀ = (e₁ − w₀) × e`, `n₁ = e × (e₁ − w₁)`, the angle is
/// `θ = atan2((n̂₀ × n̂₁)·e, |e| n̂₀·n̂₁)` and `C = θ − θ₀`.
#[derive(Debug, Clone)]
pub struct DihedralConstraint {
    base: ConstraintBase,
    rest_angle: f64,
}

/// Angle and gradients, or `None` for degenerate faces.
fn dihedral(x: [DVec3; 4]) -> Option<(f64, [DVec3; 4])> {
    let [w0, w1, e0, e1] = x;
    let e = e1 - e0;
    let l = e.length();
    if l < EPSILON {
        return None;
    }

    let n0 = (e1 - w0).cross(e);
    let n1 = e.cross(e1 - w1);
    let (a0, a1) = (n0.length(), n1.length());
    if a0 < EPSILON || a1 < EPSILON {
        return None;
    }
    let (n0, n1) = (n0 / a0, n1 / a1);

    let angle = n0.cross(n1).dot(e).atan2(l * n0.dot(n1));

    let gradients = [
        n0 * (-l / a0),
        n1 * (-l / a1),
        n0 * (e.dot(e1 - w0) / (a0 * l)) + n1 * (e.dot(e1 - w1) / (a1 * l)),
        n0 * (e.dot(w0 - e0) / (a0 * l)) + n1 * (e.dot(w1 - e0) / (a1 * l)),
    ];
    Some((angle, gradients))
}

impl DihedralConstraint {
    pub fn new(particles: [PbdParticleId; 4], rest: [DVec3; 4], stiffness: f64) -> Self {
        let rest_angle = dihedral(rest).map_or(0.0, |(angle, _)| angle);
        Self {
            base: ConstraintBase::new(particles.to_vec(), stiffness),
            rest_angle,
        }
    }

    pub fn rest_angle(&self) -> f64 {
        self.rest_angle
    }
}

impl PbdConstraint for DihedralConstraint {
    fn name(&self) -> &'static str {
        "Dihedral"
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
        let x = state.gather::<4>(&self.base.particles)?;
        let (angle, gradients) = dihedral(x)?;
        self.base.gradients.copy_from_slice(&gradients);
        Some(angle - self.rest_angle)
    }
}
