//! Constitutive model trait: the core material abstraction.
//!
//! Every material model implements this trait, so the FEM constraint can
//! swap material strategies without changing its projection logic.

use medsim_math::DMat3;

use crate::properties::LameParameters;

/// Energy density and stress for one deformation gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressEnergy {
    /// Strain energy density ψ(F).
    pub energy: f64,
    /// First Piola-Kirchhoff stress P = ∂ψ/∂F.
    pub stress: DMat3,
}

/// Trait for hyperelastic constitutive models.
///
/// # Strategy Pattern
///
/// - `LinearModel` — small-strain, cheapest, wrong under rotation
/// - `CorotationalModel` — linear in the element's rotated frame
/// - `StVKModel` — Green strain, handles rotation but softens under compression
/// - `NeoHookeanModel` — resists inversion, undefined once det F ≤ 0
pub trait ConstitutiveModel: Send + Sync {
    /// Evaluates ψ(F) and P(F).
    ///
    /// Returns `None` when the model is undefined at `f` (e.g. inverted
    /// elements for Neo-Hookean); callers skip the element.
    fn evaluate(&self, f: &DMat3, lame: LameParameters) -> Option<StressEnergy>;

    /// Returns the name of this constitutive model.
    fn name(&self) -> &str;
}

/// Frobenius inner product `A : B`.
#[inline]
pub(crate) fn double_dot(a: &DMat3, b: &DMat3) -> f64 {
    a.x_axis.dot(b.x_axis) + a.y_axis.dot(b.y_axis) + a.z_axis.dot(b.z_axis)
}

/// Energy and stress of the isotropic linear law on a symmetric strain:
/// ψ = μ ε:ε + λ/2 tr(ε)², σ = 2μ ε + λ tr(ε) I.
#[inline]
pub(crate) fn isotropic_linear(strain: &DMat3, lame: LameParameters) -> (f64, DMat3) {
    let trace = strain.x_axis.x + strain.y_axis.y + strain.z_axis.z;
    let energy = lame.mu * double_dot(strain, strain) + 0.5 * lame.lambda * trace * trace;
    let stress = *strain * (2.0 * lame.mu) + DMat3::IDENTITY * (lame.lambda * trace);
    (energy, stress)
}
