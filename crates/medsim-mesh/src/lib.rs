//! # medsim-mesh
//!
//! Point sets and simplicial meshes stored as arrays of `DVec3`
//! positions plus fixed-arity index tuples.
//!
//! ## Key Types
//!
//! - [`CellMesh`] — generic mesh over `N`-vertex cells, aliased as
//!   [`LineMesh`] (N=2), [`SurfaceMesh`] (N=3) and [`TetrahedralMesh`] (N=4).
//! - [`Geometry`] — closed sum over the supported geometry kinds, used
//!   wherever a collaborator must type-check the geometry it is handed.
//! - [`SurfaceTopology`] — edge / interior-edge adjacency for surfaces.
//! - Conforming surface extraction from tetrahedral meshes.
//! - Procedural generators for tests and benchmarks.

pub mod generators;
pub mod geometry;
pub mod mesh;
pub mod surface;
pub mod topology;

pub use geometry::{read_geometry, shared, write_geometry, Geometry, GeometryKind, SharedGeometry};
pub use mesh::{CellMesh, LineMesh, PointSet, SurfaceMesh, TetrahedralMesh};
pub use surface::SurfaceExtraction;
pub use topology::{unique_edges, InteriorEdge, SurfaceTopology};
