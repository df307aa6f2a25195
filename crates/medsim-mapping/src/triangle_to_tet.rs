//! Surface-to-volume correspondence for surfaces extracted from a
//! tetrahedral mesh.

use std::collections::HashMap;

use medsim_mesh::{read_geometry, GeometryKind, SharedGeometry};
use medsim_types::MedsimResult;
use tracing::{debug, warn};

use crate::map::{GeometryMap, MapSlots};
use crate::pointwise::{copy_mapped_positions, match_vertices, DEFAULT_MATCH_TOLERANCE};

/// Local face patterns of a tetrahedron.
const TET_FACES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

/// Maps a surface that shares vertices with a tetrahedral mesh (usually
/// its extracted boundary) back onto it.
///
/// `compute` matches surface vertices to tetrahedral vertices by rest
/// position, then finds for every surface triangle the tetrahedron that
/// owns it as a face. `apply` copies matched tetrahedral positions onto
/// the surface.
#[derive(Debug)]
pub struct TriangleToTetMap {
    slots: MapSlots,
    tolerance: f64,
    vertex_map: Option<Vec<usize>>,
    parent_tets: Vec<Option<usize>>,
    active: bool,
}

impl Default for TriangleToTetMap {
    fn default() -> Self {
        Self::new()
    }
}

impl TriangleToTetMap {
    pub fn new() -> Self {
        Self {
            slots: MapSlots::new(
                "TriangleToTetMap",
                Some(GeometryKind::TetrahedralMesh),
                Some(GeometryKind::SurfaceMesh),
            ),
            tolerance: DEFAULT_MATCH_TOLERANCE,
            vertex_map: None,
            parent_tets: Vec::new(),
            active: true,
        }
    }

    /// Creates a map with both geometries assigned.
    pub fn between(master: SharedGeometry, slave: SharedGeometry) -> MedsimResult<Self> {
        let mut map = Self::new();
        map.set_master(master)?;
        map.set_slave(slave)?;
        Ok(map)
    }

    pub fn set_master(&mut self, geometry: SharedGeometry) -> MedsimResult<()> {
        self.slots.set_master(geometry)?;
        self.vertex_map = None;
        self.parent_tets.clear();
        Ok(())
    }

    pub fn set_slave(&mut self, geometry: SharedGeometry) -> MedsimResult<()> {
        self.slots.set_slave(geometry)?;
        self.vertex_map = None;
        self.parent_tets.clear();
        Ok(())
    }

    /// Tetrahedral vertex for each surface vertex, once computed.
    pub fn vertex_map(&self) -> Option<&[usize]> {
        self.vertex_map.as_deref()
    }

    /// Tetrahedron owning surface triangle `triangle` as one of its faces.
    ///
    /// `None` if the map is not computed, the index is out of range, or
    /// the triangle is not a face of any tetrahedron.
    pub fn get_parent_tet_id(&self, triangle: usize) -> Option<usize> {
        self.parent_tets.get(triangle).copied().flatten()
    }
}

fn face_key(mut face: [usize; 3]) -> [usize; 3] {
    face.sort_unstable();
    face
}

impl GeometryMap for TriangleToTetMap {
    fn name(&self) -> &'static str {
        "TriangleToTetMap"
    }

    fn compute(&mut self) -> MedsimResult<()> {
        let (master, slave) = self.slots.both()?;
        let master = read_geometry(master);
        let slave = read_geometry(slave);
        let tets = master.as_tetrahedral()?;
        let surface = slave.as_surface()?;

        let vertex_map = match_vertices(
            &tets.initial_positions,
            &surface.initial_positions,
            self.tolerance,
        )?;

        // Face → first owning tetrahedron. Sorted keys make the lookup
        // independent of winding.
        let mut face_owner: HashMap<[usize; 3], usize> = HashMap::new();
        for (t, cell) in tets.cells.iter().enumerate() {
            for face in TET_FACES {
                face_owner.entry(face_key(face.map(|k| cell[k]))).or_insert(t);
            }
        }

        let parent_tets: Vec<Option<usize>> = surface
            .cells
            .iter()
            .map(|tri| face_owner.get(&face_key(tri.map(|s| vertex_map[s]))).copied())
            .collect();

        let orphans = parent_tets.iter().filter(|p| p.is_none()).count();
        if orphans > 0 {
            warn!(orphans, "Surface triangles without a parent tetrahedron");
        }
        debug!(
            vertices = vertex_map.len(),
            triangles = parent_tets.len(),
            "Computed triangle-to-tet map"
        );

        drop(slave);
        drop(master);
        self.vertex_map = Some(vertex_map);
        self.parent_tets = parent_tets;
        Ok(())
    }

    fn apply(&mut self) {
        if !self.active {
            return;
        }
        let (Some(mapping), Ok((master, slave))) = (&self.vertex_map, self.slots.both()) else {
            warn!(map = self.name(), "apply called before compute; skipping");
            return;
        };
        copy_mapped_positions(mapping, master, slave);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
