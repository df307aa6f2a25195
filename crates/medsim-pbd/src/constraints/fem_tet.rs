//! Hyperelastic FEM tetrahedron constraint.

use medsim_material::{FemMaterialConfig, LameParameters};
use medsim_math::{DMat3, DVec3};
use medsim_types::constants::DEGENERATE_VOLUME_THRESHOLD;
use medsim_types::PbdParticleId;
use tracing::warn;

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, PbdConstraint};

/// Drives the strain energy of a linear tetrahedron to zero.
///
/// With rest shape matrix `Dm = [x₁−x₀, x₂−x₀, x₃−x₀]`, deformation
/// gradient `F = Ds·Dm⁻¹` and rest volume `V₀`:
/// `C = V₀ ψ(F)`, `∇_{1..3} C = columns of V₀ P(F) Dm⁻ᵀ`,
/// `∇₀ C = −(∇₁ + ∇₂ + ∇₃)`.
#[derive(Debug, Clone)]
pub struct FemTetConstraint {
    base: ConstraintBase,
    material: FemMaterialConfig,
    lame: LameParameters,
    /// `None` for a degenerate rest shape; the constraint is then inert.
    inv_rest_shape: Option<DMat3>,
    rest_volume: f64,
}

impl FemTetConstraint {
    pub fn new(
        particles: [PbdParticleId; 4],
        rest: [DVec3; 4],
        material: FemMaterialConfig,
        stiffness: f64,
    ) -> Self {
        let [x0, x1, x2, x3] = rest;
        let dm = DMat3::from_cols(x1 - x0, x2 - x0, x3 - x0);
        let det = dm.determinant();
        let inv_rest_shape = if det.abs() > DEGENERATE_VOLUME_THRESHOLD {
            Some(dm.inverse())
        } else {
            warn!(?particles, "Degenerate FEM tetrahedron; constraint disabled");
            None
        };
        if det < 0.0 {
            warn!(?particles, "FEM tetrahedron has inverted winding");
        }
        Self {
            base: ConstraintBase::new(particles.to_vec(), stiffness),
            material,
            lame: material.lame(),
            inv_rest_shape,
            rest_volume: det.abs() / 6.0,
        }
    }

    pub fn rest_volume(&self) -> f64 {
        self.rest_volume
    }

    pub fn material(&self) -> &FemMaterialConfig {
        &self.material
    }

    /// Deformation gradient at the current positions.
    pub fn deformation_gradient(&self, state: &PbdState) -> Option<DMat3> {
        let inv_dm = self.inv_rest_shape?;
        let [x0, x1, x2, x3] = state.gather::<4>(&self.base.particles)?;
        Some(DMat3::from_cols(x1 - x0, x2 - x0, x3 - x0) * inv_dm)
    }
}

impl PbdConstraint for FemTetConstraint {
    fn name(&self) -> &'static str {
        "FemTet"
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
        let inv_dm = self.inv_rest_shape?;
        let f = self.deformation_gradient(state)?;
        let result = self.material.material_type.model().evaluate(&f, self.lame)?;

        let h = result.stress * inv_dm.transpose() * self.rest_volume;
        let (g1, g2, g3) = (h.x_axis, h.y_axis, h.z_axis);
        self.base.gradients.copy_from_slice(&[-(g1 + g2 + g3), g1, g2, g3]);
        Some(self.rest_volume * result.energy)
    }
}
