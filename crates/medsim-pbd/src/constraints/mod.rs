//! Concrete constraint kinds.
//!
//! Every kind stores its rest value, computed once from the rest
//! configuration handed to its constructor. A degenerate rest
//! configuration yields a degenerate rest value (e.g. zero length) and a
//! warning, never an error.

pub mod area;
pub mod bary_point;
pub mod bend;
pub mod constant_density;
pub mod dihedral;
pub mod distance;
pub mod fem_tet;
pub mod inflatable;
pub mod volume;

pub use area::AreaConstraint;
pub use bary_point::{BaryPointToPointConstraint, BarySide};
pub use bend::BendConstraint;
pub use constant_density::{ConstantDensityConstraint, DensityParameters};
pub use dihedral::DihedralConstraint;
pub use distance::DistanceConstraint;
pub use fem_tet::FemTetConstraint;
pub use inflatable::{InflatableDistanceConstraint, InflatableVolumeConstraint, Inflation};
pub use volume::VolumeConstraint;
