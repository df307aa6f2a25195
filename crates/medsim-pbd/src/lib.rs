//! # medsim-pbd
//!
//! Position-based dynamics: particle state, constraints, graph-colored
//! partitioning and the iterative projection solver.
//!
//! ## Key Types
//!
//! - [`PbdState`] — body registry; particles are resolved by [`PbdParticleId`](medsim_types::PbdParticleId)
//! - [`PbdConstraint`] — open constraint trait with PBD / XPBD projection
//! - [`PbdConstraintContainer`] — thread-safe constraint store with partitioning
//! - [`PbdSolver`] — sequential pool + parallel buckets, iterated to a cap
//! - [`PbdConstraintFunctor`] — builds constraint families from meshes
//! - [`PbdModel`] — time stepping over all of the above

pub mod body;
pub mod coloring;
pub mod config;
pub mod constraint;
pub mod constraints;
pub mod contact;
pub mod container;
pub mod functors;
pub mod model;
pub mod solver;

pub use body::{PbdBody, PbdState};
pub use config::{ConstraintKind, ConstraintParameters, PbdModelConfig};
pub use constraint::{solve_correction, ConstraintBase, Correction, PbdConstraint, SolverType};
pub use contact::{ContactPair, ContactType};
pub use container::{ConstraintEntry, PartitionSummary, PbdConstraintContainer};
pub use functors::{
    functor_for, AreaFunctor, BendFunctor, ConstantDensityFunctor, DihedralFunctor,
    DistanceFunctor, FemTetFunctor, PbdConstraintFunctor, VolumeFunctor,
};
pub use model::PbdModel;
pub use solver::{PbdSolver, SolveReport};
