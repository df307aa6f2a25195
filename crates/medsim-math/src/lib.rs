//! # medsim-math
//!
//! Double-precision geometry primitives for the medsim toolkit.
//!
//! Provides:
//! - Re-exports of `glam` double types (`DVec3`, `DMat3`, etc.)
//! - Barycentric weights for triangles and tetrahedra (Cramer's rule)
//! - Axis-aligned bounding boxes
//! - Enclosing / nearest element search over simplex candidates
//! - Rotation extraction (polar decomposition) for co-rotational FEM

pub mod barycentric;
pub mod bounds;
pub mod decomposition;
pub mod query;

pub use barycentric::{
    signed_tetrahedron_volume, tetrahedron_weights, triangle_area, triangle_weights,
};
pub use bounds::Aabb;
pub use query::{find_enclosing_element, find_nearest_element, Simplex};

// Re-export glam types as the canonical math types for medsim.
pub use glam::{DMat3, DMat4, DQuat, DVec3, DVec4};
