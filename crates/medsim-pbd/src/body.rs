//! Body registry: per-body particle buffers resolved by `PbdParticleId`.
//!
//! Constraints never hold references into these buffers; they name
//! particles by `(body, vertex)` and look them up here on every
//! projection. A lookup that fails (stale id after a topology change)
//! yields `None` and the constraint is skipped.

use medsim_math::DVec3;
use medsim_types::{BodyHandle, IdAllocator, MedsimError, MedsimResult, PbdParticleId};

/// Particle buffers of one simulated body.
///
/// All arrays have length `vertex_count()`.
#[derive(Debug, Clone)]
pub struct PbdBody {
    pub handle: BodyHandle,

    // ─── Position ───
    pub positions: Vec<DVec3>,
    /// Positions at the start of the current timestep.
    pub previous_positions: Vec<DVec3>,

    // ─── Velocity ───
    pub velocities: Vec<DVec3>,

    // ─── Mass (inverse mass 0 pins a vertex) ───
    pub masses: Vec<f64>,
    pub inv_masses: Vec<f64>,
}

impl PbdBody {
    /// Creates a body at rest with uniform per-vertex mass.
    ///
    /// A non-positive `vertex_mass` makes every vertex fixed.
    pub fn new(handle: BodyHandle, positions: Vec<DVec3>, vertex_mass: f64) -> Self {
        let n = positions.len();
        let inv_mass = if vertex_mass > 0.0 {
            1.0 / vertex_mass
        } else {
            0.0
        };
        Self {
            handle,
            previous_positions: positions.clone(),
            positions,
            velocities: vec![DVec3::ZERO; n],
            masses: vec![vertex_mass.max(0.0); n],
            inv_masses: vec![inv_mass; n],
        }
    }

    /// Number of particles.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Pins vertex `v` (inverse mass 0). Out-of-range indices are ignored.
    pub fn fix_vertex(&mut self, v: usize) {
        if let Some(w) = self.inv_masses.get_mut(v) {
            *w = 0.0;
        }
        if let Some(u) = self.velocities.get_mut(v) {
            *u = DVec3::ZERO;
        }
    }

    /// Indices of pinned vertices.
    pub fn fixed_vertices(&self) -> Vec<usize> {
        self.inv_masses
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w == 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Particle id of vertex `v` of this body.
    #[inline]
    pub fn particle(&self, v: usize) -> PbdParticleId {
        PbdParticleId::new(self.handle, v)
    }

    /// Save current positions as "previous" for the next timestep.
    pub fn save_previous(&mut self) {
        self.previous_positions.copy_from_slice(&self.positions);
    }

    /// Explicit prediction: `v += g·dt`, `v *= 1 - damping`, `x += v·dt`.
    ///
    /// Pinned vertices are left untouched.
    pub fn integrate(&mut self, dt: f64, gravity: DVec3, damping: f64) {
        let factor = 1.0 - damping;
        for ((x, v), &w) in self
            .positions
            .iter_mut()
            .zip(&mut self.velocities)
            .zip(&self.inv_masses)
        {
            if w == 0.0 {
                continue;
            }
            *v = (*v + gravity * dt) * factor;
            *x += *v * dt;
        }
    }

    /// Update velocities from position change: v = (x - x_prev) / dt.
    pub fn update_velocities(&mut self, dt: f64) {
        let inv_dt = 1.0 / dt;
        for ((v, x), prev) in self
            .velocities
            .iter_mut()
            .zip(&self.positions)
            .zip(&self.previous_positions)
        {
            *v = (*x - *prev) * inv_dt;
        }
    }

    /// Compute total kinetic energy: 0.5 * Σ m_i * ||v_i||² over free vertices.
    pub fn kinetic_energy(&self) -> f64 {
        self.velocities
            .iter()
            .zip(&self.masses)
            .zip(&self.inv_masses)
            .filter(|&(_, &w)| w > 0.0)
            .map(|((v, &m), _)| 0.5 * m * v.length_squared())
            .sum()
    }
}

/// Registry of all bodies taking part in one PBD system.
#[derive(Debug, Clone, Default)]
pub struct PbdState {
    bodies: Vec<PbdBody>,
    ids: IdAllocator,
}

impl PbdState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a body and returns its handle.
    pub fn add_body(&mut self, positions: Vec<DVec3>, vertex_mass: f64) -> BodyHandle {
        let handle = BodyHandle(self.ids.allocate() as u32);
        self.bodies.push(PbdBody::new(handle, positions, vertex_mass));
        handle
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&PbdBody> {
        self.bodies.get(handle.index())
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut PbdBody> {
        self.bodies.get_mut(handle.index())
    }

    /// Like [`body_mut`](Self::body_mut) but reports unknown handles.
    pub fn try_body_mut(&mut self, handle: BodyHandle) -> MedsimResult<&mut PbdBody> {
        self.bodies
            .get_mut(handle.index())
            .ok_or(MedsimError::UnknownBody(handle.0))
    }

    pub fn bodies(&self) -> &[PbdBody] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [PbdBody] {
        &mut self.bodies
    }

    /// Total particle count over all bodies.
    pub fn particle_count(&self) -> usize {
        self.bodies.iter().map(PbdBody::vertex_count).sum()
    }

    /// Current position of a particle.
    #[inline]
    pub fn position(&self, id: PbdParticleId) -> Option<DVec3> {
        self.body(id.body)?.positions.get(id.index()).copied()
    }

    /// Inverse mass of a particle.
    #[inline]
    pub fn inv_mass(&self, id: PbdParticleId) -> Option<f64> {
        self.body(id.body)?.inv_masses.get(id.index()).copied()
    }

    /// Current positions of several particles, or `None` if any is stale.
    pub fn gather<const N: usize>(&self, ids: &[PbdParticleId]) -> Option<[DVec3; N]> {
        if ids.len() != N {
            return None;
        }
        let mut out = [DVec3::ZERO; N];
        for (slot, &id) in out.iter_mut().zip(ids) {
            *slot = self.position(id)?;
        }
        Some(out)
    }

    /// Adds `delta` to a free particle. Pinned or stale particles are left alone.
    #[inline]
    pub fn apply_correction(&mut self, id: PbdParticleId, delta: DVec3) {
        let Some(body) = self.bodies.get_mut(id.body.index()) else {
            return;
        };
        let v = id.index();
        if body.inv_masses.get(v).is_some_and(|&w| w > 0.0) {
            body.positions[v] += delta;
        }
    }
}
