//! Boundary surface extraction from tetrahedral meshes.

use std::collections::HashMap;

use medsim_math::DVec3;
use medsim_types::{MedsimError, MedsimResult};
use tracing::debug;

use crate::mesh::{SurfaceMesh, TetrahedralMesh};

/// Local faces of a tetrahedron with the local index of the opposite
/// vertex. For a positively oriented tetrahedron these wind outward.
const TET_FACES: [([usize; 3], usize); 4] = [
    ([1, 2, 3], 0),
    ([0, 3, 2], 1),
    ([0, 1, 3], 2),
    ([0, 2, 1], 3),
];

/// Result of [`TetrahedralMesh::extract_surface`].
#[derive(Debug, Clone)]
pub struct SurfaceExtraction {
    /// Boundary triangles with outward winding, compactly indexed.
    pub surface: SurfaceMesh,
    /// Surface vertex index → tetrahedral mesh vertex index.
    pub vertex_map: Vec<usize>,
    /// Surface triangle index → tetrahedron that owns the face.
    pub parent_tetrahedra: Vec<usize>,
}

impl TetrahedralMesh {
    /// Extracts the boundary surface: faces used by exactly one tetrahedron.
    ///
    /// Faces are emitted in tetrahedron order and oriented away from the
    /// opposite vertex of their owning tetrahedron (rest configuration).
    /// Fails if a face is shared by more than two tetrahedra.
    pub fn extract_surface(&self) -> MedsimResult<SurfaceExtraction> {
        let mut use_count: HashMap<[usize; 3], usize> = HashMap::new();
        for cell in &self.cells {
            for (face, _) in TET_FACES {
                *use_count.entry(sorted_face(face.map(|k| cell[k]))).or_insert(0) += 1;
            }
        }

        if let Some((face, count)) = use_count.iter().find(|(_, count)| **count > 2) {
            return Err(MedsimError::InvalidMesh(format!(
                "Face {face:?} is shared by {count} tetrahedra"
            )));
        }

        let mut vertex_map = Vec::new();
        let mut local_index: HashMap<usize, usize> = HashMap::new();
        let mut triangles = Vec::new();
        let mut parent_tetrahedra = Vec::new();

        for (t, cell) in self.cells.iter().enumerate() {
            for (face, opposite) in TET_FACES {
                let mut tri = face.map(|k| cell[k]);
                if use_count[&sorted_face(tri)] != 1 {
                    continue;
                }

                let [a, b, c] = tri.map(|v| self.initial_positions[v]);
                let normal = (b - a).cross(c - a);
                let to_opposite: DVec3 = self.initial_positions[cell[opposite]] - a;
                if normal.dot(to_opposite) > 0.0 {
                    tri.swap(1, 2);
                }

                let local = tri.map(|v| {
                    *local_index.entry(v).or_insert_with(|| {
                        vertex_map.push(v);
                        vertex_map.len() - 1
                    })
                });
                triangles.push(local);
                parent_tetrahedra.push(t);
            }
        }

        let surface = SurfaceMesh {
            initial_positions: vertex_map.iter().map(|&v| self.initial_positions[v]).collect(),
            positions: vertex_map.iter().map(|&v| self.positions[v]).collect(),
            cells: triangles,
        };

        debug!(
            tetrahedra = self.cell_count(),
            faces = surface.cell_count(),
            vertices = surface.vertex_count(),
            "Extracted boundary surface"
        );

        Ok(SurfaceExtraction {
            surface,
            vertex_map,
            parent_tetrahedra,
        })
    }
}

fn sorted_face(mut face: [usize; 3]) -> [usize; 3] {
    face.sort_unstable();
    face
}
