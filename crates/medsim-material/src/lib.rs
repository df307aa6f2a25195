//! # medsim-material
//!
//! FEM material parameters and hyperelastic constitutive models.
//!
//! ## Design
//!
//! The [`ConstitutiveModel`] trait maps a 3×3 deformation gradient to a
//! strain energy density and its first Piola-Kirchhoff stress. The FEM
//! tetrahedron constraint turns those into a constraint value and
//! gradient. Models are selected at runtime through [`FemMaterialType`],
//! which is the tag stored in configuration files.

pub mod corotational;
pub mod linear;
pub mod neo_hookean;
pub mod properties;
pub mod stvk;
pub mod traits;

pub use corotational::CorotationalModel;
pub use linear::LinearModel;
pub use neo_hookean::NeoHookeanModel;
pub use properties::{FemMaterialConfig, FemMaterialType, LameParameters};
pub use stvk::StVKModel;
pub use traits::{ConstitutiveModel, StressEnergy};
