//! Co-rotational linear elasticity.
//!
//! Performs polar decomposition F = R·S, measures linear strain in the
//! rotated frame (RᵀF) and rotates the stress back:
//! P = R (2μ ε + λ tr(ε) I) with ε = ½(RᵀF + FᵀR) − I.

use medsim_math::decomposition::polar_decomposition;
use medsim_math::DMat3;

use crate::properties::LameParameters;
use crate::traits::{isotropic_linear, ConstitutiveModel, StressEnergy};

/// Co-rotational FEM constitutive model.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorotationalModel;

impl ConstitutiveModel for CorotationalModel {
    fn evaluate(&self, f: &DMat3, lame: LameParameters) -> Option<StressEnergy> {
        let rotation = polar_decomposition(f).rotation;
        let unrotated = rotation.transpose() * *f;
        let strain = (unrotated + unrotated.transpose()) * 0.5 - DMat3::IDENTITY;
        let (energy, stress) = isotropic_linear(&strain, lame);
        Some(StressEnergy {
            energy,
            stress: rotation * stress,
        })
    }

    fn name(&self) -> &str {
        "corotation"
    }
}
