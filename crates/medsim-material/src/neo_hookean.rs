//! Compressible Neo-Hookean.
//!
//! With I₁ = tr(FᵀF) and log I₃ = 2 log J:
//! ψ = μ/2 (I₁ − log I₃ − 3) + λ/8 (log I₃)²,
//! P = μ (F − F⁻ᵀ) + λ/2 log I₃ F⁻ᵀ.

use medsim_math::DMat3;
use medsim_types::constants::EPSILON;

use crate::properties::LameParameters;
use crate::traits::{double_dot, ConstitutiveModel, StressEnergy};

/// Neo-Hookean constitutive model. Undefined for `det F ≤ EPSILON`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeoHookeanModel;

impl ConstitutiveModel for NeoHookeanModel {
    fn evaluate(&self, f: &DMat3, lame: LameParameters) -> Option<StressEnergy> {
        let j = f.determinant();
        if j <= EPSILON {
            return None;
        }
        let i1 = double_dot(f, f);
        let log_i3 = 2.0 * j.ln();
        let f_inv_t = f.inverse().transpose();

        let energy = 0.5 * lame.mu * (i1 - log_i3 - 3.0) + 0.125 * lame.lambda * log_i3 * log_i3;
        let stress = (*f - f_inv_t) * lame.mu + f_inv_t * (0.5 * lame.lambda * log_i3);
        Some(StressEnergy { energy, stress })
    }

    fn name(&self) -> &str {
        "neo_hookean"
    }
}
