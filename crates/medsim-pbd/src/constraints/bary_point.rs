//! Constraint between two interpolated points.

use medsim_math::DVec3;
use medsim_types::constants::EPSILON;
use medsim_types::PbdParticleId;

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, PbdConstraint};

/// A point expressed as a weighted sum of particles (a vertex, a point on
/// an edge, or a point on a triangle).
#[derive(Debug, Clone, PartialEq)]
pub struct BarySide {
    pub particles: Vec<PbdParticleId>,
    pub weights: Vec<f64>,
}

impl BarySide {
    pub fn new(particles: Vec<PbdParticleId>, weights: Vec<f64>) -> Self {
        Self { particles, weights }
    }

    /// A single particle with weight 1.
    pub fn vertex(id: PbdParticleId) -> Self {
        Self {
            particles: vec![id],
            weights: vec![1.0],
        }
    }
}

/// Pulls the point `p_a = Σ uᵢ xᵢ` toward `p_b = Σ vⱼ xⱼ`:
/// `C = |p_a − p_b| − d`, with `d = 0` unless a separation is set.
///
/// Used for contact response and stitching. When the two points coincide
/// the gradient is undefined and the constraint is skipped.
#[derive(Debug, Clone)]
pub struct BaryPointToPointConstraint {
    base: ConstraintBase,
    /// Side A weights followed by side B weights.
    weights: Vec<f64>,
    side_a_len: usize,
    rest_length: f64,
}

impl BaryPointToPointConstraint {
    pub fn new(side_a: BarySide, side_b: BarySide, stiffness: f64) -> Self {
        let side_a_len = side_a.particles.len();
        let mut particles = side_a.particles;
        particles.extend(side_b.particles);
        let mut weights = side_a.weights;
        weights.extend(side_b.weights);
        weights.resize(particles.len(), 0.0);
        Self {
            base: ConstraintBase::new(particles, stiffness),
            weights,
            side_a_len,
            rest_length: 0.0,
        }
    }

    /// Target separation between the two points.
    pub fn with_rest_length(mut self, rest_length: f64) -> Self {
        self.rest_length = rest_length;
        self
    }

    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Current interpolated points `(p_a, p_b)`.
    pub fn points(&self, state: &PbdState) -> Option<(DVec3, DVec3)> {
        let mut a = DVec3::ZERO;
        let mut b = DVec3::ZERO;
        for (k, (&id, &w)) in self.base.particles.iter().zip(&self.weights).enumerate() {
            let x = state.position(id)? * w;
            if k < self.side_a_len {
                a += x;
            } else {
                b += x;
            }
        }
        Some((a, b))
    }
}

impl PbdConstraint for BaryPointToPointConstraint {
    fn name(&self) -> &'static str {
        "BaryPointToPoint"
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
        let (a, b) = self.points(state)?;
        let diff = a - b;
        let length = diff.length();
        if length < EPSILON {
            return None;
        }
        let n = diff / length;
        for (k, (g, &w)) in self.base.gradients.iter_mut().zip(&self.weights).enumerate() {
            *g = if k < self.side_a_len { n * w } else { -n * w };
        }
        Some(length - self.rest_length)
    }
}
