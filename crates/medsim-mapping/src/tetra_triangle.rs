//! Barycentric embedding of a triangle surface in a tetrahedral mesh.

use medsim_math::query::{find_enclosing_element, find_nearest_element};
use medsim_math::{tetrahedron_weights, Aabb, DVec3, Simplex};
use medsim_mesh::{read_geometry, write_geometry, GeometryKind, SharedGeometry, TetrahedralMesh};
use medsim_types::constants::INSIDE_TOLERANCE;
use medsim_types::{MedsimError, MedsimResult};
use tracing::{debug, warn};

use crate::map::{GeometryMap, MapSlots};

/// Embedding of one slave vertex: its host tetrahedron and the
/// barycentric weights of the vertex's rest position inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapEntry {
    pub tetrahedron: usize,
    pub weights: [f64; 4],
    /// False when the vertex lies outside every tetrahedron and was bound
    /// to the nearest one by centroid distance.
    pub enclosed: bool,
}

/// Drives a surface mesh from a tetrahedral mesh.
///
/// Each slave vertex is expressed in barycentric coordinates of the
/// tetrahedron that encloses its rest position (or the nearest one, by
/// centroid, when it lies outside the volume). `apply` re-evaluates those
/// coordinates against the master's current positions, so the surface
/// follows the deformation of the volume.
#[derive(Debug)]
pub struct TetraTriangleMap {
    slots: MapSlots,
    entries: Option<Vec<MapEntry>>,
    active: bool,
}

impl Default for TetraTriangleMap {
    fn default() -> Self {
        Self::new()
    }
}

impl TetraTriangleMap {
    pub fn new() -> Self {
        Self {
            slots: MapSlots::new(
                "TetraTriangleMap",
                Some(GeometryKind::TetrahedralMesh),
                Some(GeometryKind::SurfaceMesh),
            ),
            entries: None,
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

    /// Assigns the tetrahedral master. Invalidates a computed map.
    pub fn set_master(&mut self, geometry: SharedGeometry) -> MedsimResult<()> {
        self.slots.set_master(geometry)?;
        self.entries = None;
        Ok(())
    }

    /// Assigns the surface slave. Invalidates a computed map.
    pub fn set_slave(&mut self, geometry: SharedGeometry) -> MedsimResult<()> {
        self.slots.set_slave(geometry)?;
        self.entries = None;
        Ok(())
    }

    pub fn is_computed(&self) -> bool {
        self.entries.is_some()
    }

    /// Per-slave-vertex embeddings, once computed.
    pub fn entries(&self) -> Option<&[MapEntry]> {
        self.entries.as_deref()
    }

    /// Host tetrahedron of slave vertex `v`.
    pub fn enclosing_tetrahedron(&self, v: usize) -> Option<usize> {
        Some(self.entries.as_ref()?.get(v)?.tetrahedron)
    }
}

/// Embeds `p` in `mesh` using rest positions.
fn embed(mesh: &TetrahedralMesh, boxes: &[Aabb], p: DVec3) -> Option<MapEntry> {
    let candidates = boxes
        .iter()
        .enumerate()
        .filter(|(_, b)| b.contains(p, INSIDE_TOLERANCE))
        .map(|(t, _)| (t, mesh.initial_cell_positions(t)));
    if let Some((tetrahedron, weights)) = find_enclosing_element(candidates, p) {
        return Some(MapEntry {
            tetrahedron,
            weights,
            enclosed: true,
        });
    }

    let tetrahedron = find_nearest_element(
        (0..mesh.cell_count()).map(|t| (t, mesh.initial_cell_positions(t))),
        p,
    )?;

    let weights = tetrahedron_weights(&mesh.initial_cell_positions(tetrahedron), p)
        .unwrap_or_else(|| {
            warn!(tetrahedron, "Nearest tetrahedron is degenerate; using centroid weights");
            [0.25; 4]
        });
    Some(MapEntry {
        tetrahedron,
        weights,
        enclosed: false,
    })
}

impl GeometryMap for TetraTriangleMap {
    fn name(&self) -> &'static str {
        "TetraTriangleMap"
    }

    fn compute(&mut self) -> MedsimResult<()> {
        let (master, slave) = self.slots.both()?;
        let master = read_geometry(master);
        let slave = read_geometry(slave);
        let mesh = master.as_tetrahedral()?;
        if mesh.cell_count() == 0 {
            return Err(MedsimError::InvalidMesh(
                "TetraTriangleMap master has no tetrahedra".into(),
            ));
        }

        let boxes: Vec<Aabb> = (0..mesh.cell_count())
            .map(|t| mesh.initial_cell_positions(t).bounding_box())
            .collect();

        let entries: Vec<MapEntry> = slave
            .initial_positions()
            .iter()
            .filter_map(|&p| embed(mesh, &boxes, p))
            .collect();

        let outside = entries.iter().filter(|e| !e.enclosed).count();
        debug!(
            vertices = entries.len(),
            outside,
            "Computed tetra-triangle map"
        );

        drop(slave);
        drop(master);
        self.entries = Some(entries);
        Ok(())
    }

    fn apply(&mut self) {
        if !self.active {
            return;
        }
        let (Some(entries), Ok((master, slave))) = (&self.entries, self.slots.both()) else {
            warn!(map = self.name(), "apply called before compute; skipping");
            return;
        };

        let master = read_geometry(master);
        let Ok(mesh) = master.as_tetrahedral() else {
            return;
        };
        let master_vertices = mesh.positions.len();
        if mesh.cells.iter().flatten().any(|&v| v >= master_vertices) {
            warn!(
                master_vertices,
                "Master geometry changed since the map was computed; skipping"
            );
            return;
        }
        let mut slave = write_geometry(slave);
        let targets = slave.positions_mut();
        if targets.len() != entries.len() {
            warn!(
                slave_vertices = targets.len(),
                mapped = entries.len(),
                "Slave geometry changed since the map was computed; skipping"
            );
            return;
        }

        for (target, entry) in targets.iter_mut().zip(entries) {
            let Some(&cell) = mesh.cells.get(entry.tetrahedron) else {
                continue;
            };
            *target = cell
                .iter()
                .zip(entry.weights)
                .map(|(&v, w)| mesh.positions[v] * w)
                .sum();
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
