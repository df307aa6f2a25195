//! Core mesh types.
//!
//! Every mesh keeps two position buffers: `initial_positions`, the rest
//! configuration used to build constraints and maps, and `positions`, the
//! current (deformed) configuration written by the simulation.

use medsim_math::barycentric::{signed_tetrahedron_volume, triangle_area};
use medsim_math::query::{find_enclosing_element, find_nearest_element};
use medsim_math::{Aabb, DVec3};
use medsim_types::{MedsimError, MedsimResult};

/// A cloud of points without connectivity.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    /// Rest positions.
    pub initial_positions: Vec<DVec3>,
    /// Current positions.
    pub positions: Vec<DVec3>,
}

impl PointSet {
    /// Creates a point set whose current positions equal its rest positions.
    pub fn new(positions: Vec<DVec3>) -> Self {
        Self {
            initial_positions: positions.clone(),
            positions,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Bounds of the current positions.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}

/// A mesh of `N`-vertex cells.
#[derive(Debug, Clone)]
pub struct CellMesh<const N: usize> {
    /// Rest positions.
    pub initial_positions: Vec<DVec3>,
    /// Current positions.
    pub positions: Vec<DVec3>,
    /// Cell connectivity, each entry indexes into the position buffers.
    pub cells: Vec<[usize; N]>,
}

/// Polyline mesh (segments).
pub type LineMesh = CellMesh<2>;
/// Triangle surface mesh.
pub type SurfaceMesh = CellMesh<3>;
/// Tetrahedral volume mesh.
pub type TetrahedralMesh = CellMesh<4>;

impl<const N: usize> CellMesh<N> {
    /// Creates a validated mesh. Current positions start at rest.
    pub fn new(positions: Vec<DVec3>, cells: Vec<[usize; N]>) -> MedsimResult<Self> {
        let mesh = Self::from_raw(positions, cells);
        mesh.validate()?;
        Ok(mesh)
    }

    /// Creates a mesh without validation. Generators use this for
    /// connectivity that is correct by construction.
    pub(crate) fn from_raw(positions: Vec<DVec3>, cells: Vec<[usize; N]>) -> Self {
        Self {
            initial_positions: positions.clone(),
            positions,
            cells,
        }
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - Rest and current buffers have the same length
    /// - Cell indices are within bounds
    /// - No cell repeats a vertex
    pub fn validate(&self) -> MedsimResult<()> {
        let n = self.positions.len();
        if self.initial_positions.len() != n {
            return Err(MedsimError::InvalidMesh(format!(
                "Initial positions ({}) != current positions ({})",
                self.initial_positions.len(),
                n
            )));
        }

        for (c, cell) in self.cells.iter().enumerate() {
            for (k, &v) in cell.iter().enumerate() {
                if v >= n {
                    return Err(MedsimError::InvalidMesh(format!(
                        "Cell {c} references vertex {v} (vertex count: {n})"
                    )));
                }
                if cell[..k].contains(&v) {
                    return Err(MedsimError::InvalidMesh(format!(
                        "Cell {c} has repeated vertex index {v}: {cell:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the vertex indices of cell `c`.
    #[inline]
    pub fn cell(&self, c: usize) -> [usize; N] {
        self.cells[c]
    }

    /// Current positions of the vertices of cell `c`.
    #[inline]
    pub fn cell_positions(&self, c: usize) -> [DVec3; N] {
        let cell = self.cells[c];
        std::array::from_fn(|k| self.positions[cell[k]])
    }

    /// Rest positions of the vertices of cell `c`.
    #[inline]
    pub fn initial_cell_positions(&self, c: usize) -> [DVec3; N] {
        let cell = self.cells[c];
        std::array::from_fn(|k| self.initial_positions[cell[k]])
    }

    /// Bounds of the current positions.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    /// For each vertex, the cells that reference it.
    pub fn vertex_cells(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.vertex_count()];
        for (c, cell) in self.cells.iter().enumerate() {
            for &v in cell {
                adjacency[v].push(c);
            }
        }
        adjacency
    }

    /// Moves every current position by `offset`.
    pub fn translate(&mut self, offset: DVec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Restores current positions to the rest configuration.
    pub fn reset_positions(&mut self) {
        self.positions.clone_from(&self.initial_positions);
    }
}

impl LineMesh {
    /// Current length of segment `s`.
    pub fn segment_length(&self, s: usize) -> f64 {
        let [a, b] = self.cell_positions(s);
        a.distance(b)
    }
}

impl SurfaceMesh {
    /// Current area of triangle `t`.
    pub fn triangle_area(&self, t: usize) -> f64 {
        let [a, b, c] = self.cell_positions(t);
        triangle_area(a, b, c)
    }

    /// Unit face normal of triangle `t` (zero for degenerate triangles).
    pub fn face_normal(&self, t: usize) -> DVec3 {
        let [a, b, c] = self.cell_positions(t);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Sum of all current triangle areas.
    pub fn total_area(&self) -> f64 {
        (0..self.cell_count()).map(|t| self.triangle_area(t)).sum()
    }
}

impl TetrahedralMesh {
    /// Current signed volume of tetrahedron `t`.
    pub fn signed_volume(&self, t: usize) -> f64 {
        let [a, b, c, d] = self.cell_positions(t);
        signed_tetrahedron_volume(a, b, c, d)
    }

    /// Sum of all current signed volumes.
    pub fn total_volume(&self) -> f64 {
        (0..self.cell_count()).map(|t| self.signed_volume(t)).sum()
    }

    /// Tetrahedra whose rest volume is not positive.
    pub fn inverted_tetrahedra(&self) -> Vec<usize> {
        (0..self.cell_count())
            .filter(|&t| {
                let [a, b, c, d] = self.initial_cell_positions(t);
                signed_tetrahedron_volume(a, b, c, d) <= 0.0
            })
            .collect()
    }

    /// First tetrahedron (current configuration) enclosing `p`, with the
    /// barycentric weights of `p` inside it.
    pub fn find_enclosing_tetrahedron(&self, p: DVec3) -> Option<(usize, [f64; 4])> {
        let candidates = (0..self.cell_count())
            .map(|t| (t, self.cell_positions(t)))
            .filter(|(_, tet)| Aabb::from_points(tet).contains(p, 0.0));
        find_enclosing_element(candidates, p)
    }

    /// Tetrahedron (current configuration) whose centroid is closest to `p`.
    pub fn find_nearest_tetrahedron(&self, p: DVec3) -> Option<usize> {
        find_nearest_element((0..self.cell_count()).map(|t| (t, self.cell_positions(t))), p)
    }
}
