//! Material parameters and model selection.

use medsim_types::{MedsimError, MedsimResult};
use serde::{Deserialize, Serialize};

use crate::corotational::CorotationalModel;
use crate::linear::LinearModel;
use crate::neo_hookean::NeoHookeanModel;
use crate::stvk::StVKModel;
use crate::traits::ConstitutiveModel;

/// Constitutive model tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FemMaterialType {
    Linear,
    Corotation,
    #[default]
    #[serde(rename = "stvk")]
    StVK,
    NeoHookean,
}

static LINEAR: LinearModel = LinearModel;
static COROTATION: CorotationalModel = CorotationalModel;
static STVK: StVKModel = StVKModel;
static NEO_HOOKEAN: NeoHookeanModel = NeoHookeanModel;

impl FemMaterialType {
    /// The model implementing this tag.
    pub fn model(self) -> &'static dyn ConstitutiveModel {
        match self {
            FemMaterialType::Linear => &LINEAR,
            FemMaterialType::Corotation => &COROTATION,
            FemMaterialType::StVK => &STVK,
            FemMaterialType::NeoHookean => &NEO_HOOKEAN,
        }
    }
}

/// Lamé parameters (μ, λ).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LameParameters {
    pub mu: f64,
    pub lambda: f64,
}

/// Isotropic FEM material.
///
/// | Field | Meaning | Default |
/// |---|---|---|
/// | `young_modulus` | E, Pa | 1000 |
/// | `poisson_ratio` | ν, dimensionless, in (-1, 0.5) | 0.2 |
/// | `material_type` | constitutive model | StVK |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FemMaterialConfig {
    pub young_modulus: f64,
    pub poisson_ratio: f64,
    pub material_type: FemMaterialType,
}

impl Default for FemMaterialConfig {
    fn default() -> Self {
        Self {
            young_modulus: 1000.0,
            poisson_ratio: 0.2,
            material_type: FemMaterialType::default(),
        }
    }
}

impl FemMaterialConfig {
    pub fn new(young_modulus: f64, poisson_ratio: f64, material_type: FemMaterialType) -> Self {
        Self {
            young_modulus,
            poisson_ratio,
            material_type,
        }
    }

    /// Converts (E, ν) to Lamé parameters.
    pub fn lame(&self) -> LameParameters {
        let e = self.young_modulus;
        let nu = self.poisson_ratio;
        LameParameters {
            mu: e / (2.0 * (1.0 + nu)),
            lambda: e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu)),
        }
    }

    /// Checks `E > 0` and `-1 < ν < 0.5`.
    pub fn validate(&self) -> MedsimResult<()> {
        if !(self.young_modulus.is_finite() && self.young_modulus > 0.0) {
            return Err(MedsimError::InvalidMaterial(format!(
                "Young's modulus must be positive, got {}",
                self.young_modulus
            )));
        }
        if !(self.poisson_ratio > -1.0 && self.poisson_ratio < 0.5) {
            return Err(MedsimError::InvalidMaterial(format!(
                "Poisson ratio must lie in (-1, 0.5), got {}",
                self.poisson_ratio
            )));
        }
        Ok(())
    }
}
