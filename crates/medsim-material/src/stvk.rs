//! St. Venant-Kirchhoff.
//!
//! Green strain E = ½(FᵀF − I), P = F (2μ E + λ tr(E) I).

use medsim_math::DMat3;

use crate::properties::LameParameters;
use crate::traits::{isotropic_linear, ConstitutiveModel, StressEnergy};

/// StVK constitutive model.
#[derive(Debug, Clone, Copy, Default)]
pub struct StVKModel;

impl ConstitutiveModel for StVKModel {
    fn evaluate(&self, f: &DMat3, lame: LameParameters) -> Option<StressEnergy> {
        let green = (f.transpose() * *f - DMat3::IDENTITY) * 0.5;
        let (energy, second_piola) = isotropic_linear(&green, lame);
        Some(StressEnergy {
            energy,
            stress: *f * second_piola,
        })
    }

    fn name(&self) -> &str {
        "stvk"
    }
}
