//! Mesh topology queries.
//!
//! Builds adjacency data from cell index buffers. Edge enumeration is
//! deterministic: edges appear in the order they are first met while
//! walking cells, so constraint generation produces the same sequence on
//! every run.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::mesh::SurfaceMesh;

/// Unique undirected edges of a cell buffer in first-appearance order.
///
/// Each cell contributes the pairs `(cell[i], cell[j])` for `i < j`; the
/// first orientation met is kept.
pub fn unique_edges<const N: usize>(cells: &[[usize; N]]) -> Vec<[usize; 2]> {
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut edges = Vec::new();
    for cell in cells {
        for i in 0..N {
            for j in (i + 1)..N {
                let (a, b) = (cell[i], cell[j]);
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    edges.push([a, b]);
                }
            }
        }
    }
    edges
}

/// Precomputed topology information for a triangle surface.
///
/// Used by dihedral constraint generation (interior edges) and by
/// boundary / closedness checks on extracted surfaces.
#[derive(Debug, Clone)]
pub struct SurfaceTopology {
    /// For each vertex, the list of triangles that contain it.
    pub vertex_triangles: Vec<Vec<usize>>,

    /// Unique edges in first-appearance order.
    pub edges: Vec<[usize; 2]>,

    /// For each edge, the adjacent triangles. Boundary edges have one.
    pub edge_triangles: Vec<Vec<usize>>,

    /// Edges shared by exactly two triangles.
    pub interior_edges: Vec<InteriorEdge>,
}

/// An interior (non-boundary) edge with its two adjacent triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteriorEdge {
    /// First shared vertex, in the orientation of `tri_a`.
    pub v0: usize,
    /// Second shared vertex, in the orientation of `tri_a`.
    pub v1: usize,
    /// Vertex of `tri_a` not on the edge.
    pub wing_a: usize,
    /// Vertex of `tri_b` not on the edge.
    pub wing_b: usize,
    pub tri_a: usize,
    pub tri_b: usize,
}

impl SurfaceTopology {
    /// Build topology from a surface mesh.
    pub fn build(mesh: &SurfaceMesh) -> Self {
        let mut vertex_triangles: Vec<Vec<usize>> = vec![Vec::new(); mesh.vertex_count()];
        let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges: Vec<[usize; 2]> = Vec::new();
        let mut edge_triangles: Vec<Vec<usize>> = Vec::new();

        for (t, &[a, b, c]) in mesh.cells.iter().enumerate() {
            vertex_triangles[a].push(t);
            vertex_triangles[b].push(t);
            vertex_triangles[c].push(t);

            for (v0, v1) in [(a, b), (b, c), (c, a)] {
                let key = (v0.min(v1), v0.max(v1));
                let e = *edge_index.entry(key).or_insert_with(|| {
                    edges.push([v0, v1]);
                    edge_triangles.push(Vec::new());
                    edges.len() - 1
                });
                edge_triangles[e].push(t);
            }
        }

        let interior_edges = edges
            .iter()
            .zip(&edge_triangles)
            .filter(|(_, tris)| tris.len() == 2)
            .map(|(&[v0, v1], tris)| InteriorEdge {
                v0,
                v1,
                wing_a: find_wing_vertex(mesh, tris[0], v0, v1),
                wing_b: find_wing_vertex(mesh, tris[1], v0, v1),
                tri_a: tris[0],
                tri_b: tris[1],
            })
            .collect();

        Self {
            vertex_triangles,
            edges,
            edge_triangles,
            interior_edges,
        }
    }

    /// Returns the 1-ring vertex neighborhood of vertex `v`, sorted.
    pub fn one_ring(&self, v: usize, mesh: &SurfaceMesh) -> BTreeSet<usize> {
        self.vertex_triangles[v]
            .iter()
            .flat_map(|&t| mesh.cells[t])
            .filter(|&u| u != v)
            .collect()
    }

    /// Returns the number of boundary edges (edges with only 1 adjacent triangle).
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_triangles
            .iter()
            .filter(|tris| tris.len() == 1)
            .count()
    }

    /// Returns the number of edges shared by more than two triangles.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_triangles
            .iter()
            .filter(|tris| tris.len() > 2)
            .count()
    }

    /// Returns true if the mesh is closed (no boundary edges).
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }
}

/// Find the vertex in triangle `tri` that is not v0 or v1.
fn find_wing_vertex(mesh: &SurfaceMesh, tri: usize, v0: usize, v1: usize) -> usize {
    let [a, b, c] = mesh.cells[tri];
    if a != v0 && a != v1 {
        a
    } else if b != v0 && b != v1 {
        b
    } else {
        c
    }
}
