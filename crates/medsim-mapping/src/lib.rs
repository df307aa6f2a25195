//! # medsim-mapping
//!
//! One-directional maps that drive a "slave" geometry from a "master"
//! geometry: a tetrahedral physics mesh driving its collision or visual
//! surface, or a vertex-for-vertex copy between co-located meshes.
//!
//! Every map follows the same lifecycle: assign master and slave
//! (type-checked), [`GeometryMap::compute`] once from the rest
//! configuration, then [`GeometryMap::apply`] every frame.

pub mod map;
pub mod pointwise;
pub mod tetra_triangle;
pub mod triangle_to_tet;

pub use map::{GeometryMap, MapSlots};
pub use pointwise::{match_vertices, PointwiseMap, DEFAULT_MATCH_TOLERANCE};
pub use tetra_triangle::{MapEntry, TetraTriangleMap};
pub use triangle_to_tet::TriangleToTetMap;
