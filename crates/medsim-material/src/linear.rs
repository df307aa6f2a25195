//! Small-strain linear elasticity.
//!
//! ε = ½(F + Fᵀ) − I, P = 2μ ε + λ tr(ε) I.
//! Rotations register as strain, so large rotations produce spurious
//! restoring forces.

use medsim_math::DMat3;

use crate::properties::LameParameters;
use crate::traits::{isotropic_linear, ConstitutiveModel, StressEnergy};

/// Linear elastic model.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearModel;

impl ConstitutiveModel for LinearModel {
    fn evaluate(&self, f: &DMat3, lame: LameParameters) -> Option<StressEnergy> {
        let strain = (*f + f.transpose()) * 0.5 - DMat3::IDENTITY;
        let (energy, stress) = isotropic_linear(&strain, lame);
        Some(StressEnergy { energy, stress })
    }

    fn name(&self) -> &str {
        "linear"
    }
}
