//! Vertex-for-vertex correspondence between co-located geometries.

use std::collections::HashMap;
use std::sync::Arc;

use medsim_math::DVec3;
use medsim_mesh::{read_geometry, write_geometry, SharedGeometry};
use medsim_types::{MedsimError, MedsimResult};
use tracing::{debug, warn};

use crate::map::{GeometryMap, MapSlots};

/// Distance under which two rest positions are considered the same vertex.
pub const DEFAULT_MATCH_TOLERANCE: f64 = 1e-8;

/// For every slave point, the index of the master point within `tolerance`
/// of it (the closest one if several qualify).
///
/// Master points are hashed on a grid of cell size `tolerance`; each slave
/// lookup scans the 27 surrounding cells. Fails on the first slave point
/// with no match.
pub fn match_vertices(
    master: &[DVec3],
    slave: &[DVec3],
    tolerance: f64,
) -> MedsimResult<Vec<usize>> {
    if tolerance.is_nan() || tolerance <= 0.0 {
        return Err(MedsimError::InvalidConfig(format!(
            "Match tolerance must be positive, got {tolerance}"
        )));
    }

    let cell = |p: DVec3| (p / tolerance).floor().as_i64vec3().to_array();

    let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
    for (i, &p) in master.iter().enumerate() {
        grid.entry(cell(p)).or_default().push(i);
    }

    slave
        .iter()
        .enumerate()
        .map(|(s, &p)| {
            let [cx, cy, cz] = cell(p);
            let mut best: Option<(usize, f64)> = None;
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(bucket) = grid.get(&[cx + dx, cy + dy, cz + dz]) else {
                            continue;
                        };
                        for &m in bucket {
                            let d = master[m].distance(p);
                            if d <= tolerance && best.map_or(true, |(_, bd)| d < bd) {
                                best = Some((m, d));
                            }
                        }
                    }
                }
            }
            best.map(|(m, _)| m).ok_or_else(|| {
                MedsimError::InvalidMesh(format!(
                    "No master vertex within {tolerance} of slave vertex {s} at {p}"
                ))
            })
        })
        .collect()
}

/// Copies master positions onto slave vertices that share a rest position.
///
/// Accepts any geometry kinds on either side.
#[derive(Debug)]
pub struct PointwiseMap {
    slots: MapSlots,
    tolerance: f64,
    slave_to_master: Option<Vec<usize>>,
    active: bool,
}

impl Default for PointwiseMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PointwiseMap {
    pub fn new() -> Self {
        Self {
            slots: MapSlots::new("PointwiseMap", None, None),
            tolerance: DEFAULT_MATCH_TOLERANCE,
            slave_to_master: None,
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

    /// Sets the position-matching tolerance used by `compute`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn set_master(&mut self, geometry: SharedGeometry) -> MedsimResult<()> {
        self.slots.set_master(geometry)
    }

    pub fn set_slave(&mut self, geometry: SharedGeometry) -> MedsimResult<()> {
        self.slots.set_slave(geometry)
    }

    /// Master vertex index for each slave vertex, once computed.
    pub fn slave_to_master(&self) -> Option<&[usize]> {
        self.slave_to_master.as_deref()
    }

    /// Master vertex mapped to slave vertex `s`.
    pub fn master_vertex(&self, s: usize) -> Option<usize> {
        self.slave_to_master.as_ref()?.get(s).copied()
    }
}

impl GeometryMap for PointwiseMap {
    fn name(&self) -> &'static str {
        "PointwiseMap"
    }

    fn compute(&mut self) -> MedsimResult<()> {
        let (master, slave) = self.slots.both()?;
        let mapping = {
            let master = read_geometry(master);
            let slave = read_geometry(slave);
            match_vertices(master.initial_positions(), slave.initial_positions(), self.tolerance)?
        };
        debug!(vertices = mapping.len(), "Computed pointwise map");
        self.slave_to_master = Some(mapping);
        Ok(())
    }

    fn apply(&mut self) {
        if !self.active {
            return;
        }
        let (Some(mapping), Ok((master, slave))) = (&self.slave_to_master, self.slots.both()) else {
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

/// `slave[s] = master[mapping[s]]` for every slave vertex.
pub(crate) fn copy_mapped_positions(
    mapping: &[usize],
    master: &SharedGeometry,
    slave: &SharedGeometry,
) {
    if Arc::ptr_eq(master, slave) {
        return;
    }
    let master = read_geometry(master);
    let mut slave = write_geometry(slave);
    let source = master.positions();
    let target = slave.positions_mut();
    if target.len() != mapping.len() || mapping.iter().any(|&m| m >= source.len()) {
        warn!(
            slave_vertices = target.len(),
            mapped = mapping.len(),
            "Geometry changed since the map was computed; skipping"
        );
        return;
    }
    for (dst, &m) in target.iter_mut().zip(mapping) {
        *dst = source[m];
    }
}
