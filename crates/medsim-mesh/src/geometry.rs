//! Closed sum over geometry kinds.
//!
//! Maps and constraint functors receive a `Geometry` and check its kind
//! before use; handing a functor the wrong mesh type is a recoverable
//! configuration error, not a panic.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use medsim_math::DVec3;
use medsim_types::{MedsimError, MedsimResult};

use crate::mesh::{LineMesh, PointSet, SurfaceMesh, TetrahedralMesh};

/// Discriminant of [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    PointSet,
    LineMesh,
    SurfaceMesh,
    TetrahedralMesh,
}

impl GeometryKind {
    /// Returns a human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::PointSet => "PointSet",
            GeometryKind::LineMesh => "LineMesh",
            GeometryKind::SurfaceMesh => "SurfaceMesh",
            GeometryKind::TetrahedralMesh => "TetrahedralMesh",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any geometry the toolkit simulates or maps between.
#[derive(Debug, Clone)]
pub enum Geometry {
    PointSet(PointSet),
    Line(LineMesh),
    Surface(SurfaceMesh),
    Tetrahedral(TetrahedralMesh),
}

/// A geometry shared between a physics body, maps and other consumers.
pub type SharedGeometry = Arc<RwLock<Geometry>>;

/// Wraps a geometry for sharing.
pub fn shared(geometry: impl Into<Geometry>) -> SharedGeometry {
    Arc::new(RwLock::new(geometry.into()))
}

/// Read access to a shared geometry. A poisoned lock is recovered: the
/// buffers are plain data and stay structurally valid.
pub fn read_geometry(geometry: &SharedGeometry) -> RwLockReadGuard<'_, Geometry> {
    geometry.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write access to a shared geometry, recovering a poisoned lock.
pub fn write_geometry(geometry: &SharedGeometry) -> RwLockWriteGuard<'_, Geometry> {
    geometry.write().unwrap_or_else(PoisonError::into_inner)
}

impl Geometry {
    /// Kind tag of this geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::PointSet(_) => GeometryKind::PointSet,
            Geometry::Line(_) => GeometryKind::LineMesh,
            Geometry::Surface(_) => GeometryKind::SurfaceMesh,
            Geometry::Tetrahedral(_) => GeometryKind::TetrahedralMesh,
        }
    }

    /// Current positions.
    pub fn positions(&self) -> &[DVec3] {
        match self {
            Geometry::PointSet(g) => &g.positions,
            Geometry::Line(g) => &g.positions,
            Geometry::Surface(g) => &g.positions,
            Geometry::Tetrahedral(g) => &g.positions,
        }
    }

    /// Mutable current positions.
    pub fn positions_mut(&mut self) -> &mut Vec<DVec3> {
        match self {
            Geometry::PointSet(g) => &mut g.positions,
            Geometry::Line(g) => &mut g.positions,
            Geometry::Surface(g) => &mut g.positions,
            Geometry::Tetrahedral(g) => &mut g.positions,
        }
    }

    /// Rest positions.
    pub fn initial_positions(&self) -> &[DVec3] {
        match self {
            Geometry::PointSet(g) => &g.initial_positions,
            Geometry::Line(g) => &g.initial_positions,
            Geometry::Surface(g) => &g.initial_positions,
            Geometry::Tetrahedral(g) => &g.initial_positions,
        }
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions().len()
    }

    /// Returns the line mesh or a `GeometryMismatch` error.
    pub fn as_line(&self) -> MedsimResult<&LineMesh> {
        match self {
            Geometry::Line(g) => Ok(g),
            other => Err(other.mismatch(GeometryKind::LineMesh)),
        }
    }

    /// Returns the surface mesh or a `GeometryMismatch` error.
    pub fn as_surface(&self) -> MedsimResult<&SurfaceMesh> {
        match self {
            Geometry::Surface(g) => Ok(g),
            other => Err(other.mismatch(GeometryKind::SurfaceMesh)),
        }
    }

    /// Mutable access to the surface mesh.
    pub fn as_surface_mut(&mut self) -> MedsimResult<&mut SurfaceMesh> {
        match self {
            Geometry::Surface(g) => Ok(g),
            other => Err(other.mismatch(GeometryKind::SurfaceMesh)),
        }
    }

    /// Returns the tetrahedral mesh or a `GeometryMismatch` error.
    pub fn as_tetrahedral(&self) -> MedsimResult<&TetrahedralMesh> {
        match self {
            Geometry::Tetrahedral(g) => Ok(g),
            other => Err(other.mismatch(GeometryKind::TetrahedralMesh)),
        }
    }

    /// The `GeometryMismatch` error for a caller expecting `expected`.
    pub fn mismatch(&self, expected: GeometryKind) -> MedsimError {
        MedsimError::GeometryMismatch {
            expected: expected.name(),
            found: self.kind().name(),
        }
    }
}

impl From<PointSet> for Geometry {
    fn from(g: PointSet) -> Self {
        Geometry::PointSet(g)
    }
}

impl From<LineMesh> for Geometry {
    fn from(g: LineMesh) -> Self {
        Geometry::Line(g)
    }
}

impl From<SurfaceMesh> for Geometry {
    fn from(g: SurfaceMesh) -> Self {
        Geometry::Surface(g)
    }
}

impl From<TetrahedralMesh> for Geometry {
    fn from(g: TetrahedralMesh) -> Self {
        Geometry::Tetrahedral(g)
    }
}
