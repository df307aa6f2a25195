//! PBD model: bodies, constraints and the per-step pipeline.
//!
//! ```text
//! step():
//!     partition constraints (if new ones were generated)
//!     save previous positions
//!     predict:  v += g·dt,  v *= 1 - damping,  x += v·dt
//!     solve:    project all constraints
//!     update:   v = (x - x_prev) / dt
//!     write positions back to each body's shared geometry
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use medsim_math::DVec3;
use medsim_mesh::{read_geometry, write_geometry, SharedGeometry};
use medsim_telemetry::{EventBus, EventKind};
use medsim_types::{BodyHandle, ConstraintId, MedsimError, MedsimResult, PbdParticleId};
use tracing::{debug, warn};

use crate::body::PbdState;
use crate::config::{ConstraintKind, PbdModelConfig};
use crate::constraint::PbdConstraint;
use crate::contact::ContactPair;
use crate::container::{PartitionSummary, PbdConstraintContainer};
use crate::functors::{functor_for, PbdConstraintFunctor};
use crate::solver::{PbdSolver, SolveReport};

#[derive(Debug)]
pub struct PbdModel {
    config: PbdModelConfig,
    solver: PbdSolver,
    state: PbdState,
    container: PbdConstraintContainer,
    geometries: HashMap<BodyHandle, SharedGeometry>,
    /// Constraints created by the last `set_contacts` call.
    contact_ids: HashSet<ConstraintId>,
    /// Set when generated constraints have not been partitioned yet.
    needs_partition: bool,
    bus: Option<EventBus>,
    timestep: u32,
    sim_time: f64,
}

impl PbdModel {
    /// Creates an empty model after validating `config`.
    pub fn new(config: PbdModelConfig) -> MedsimResult<Self> {
        config.validate()?;
        Ok(Self {
            solver: config.solver(),
            config,
            state: PbdState::new(),
            container: PbdConstraintContainer::new(),
            geometries: HashMap::new(),
            contact_ids: HashSet::new(),
            needs_partition: false,
            bus: None,
            timestep: 0,
            sim_time: 0.0,
        })
    }

    pub fn config(&self) -> &PbdModelConfig {
        &self.config
    }

    pub fn state(&self) -> &PbdState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PbdState {
        &mut self.state
    }

    /// The constraint container. Producers on other threads may add and
    /// remove constraints through a shared reference between steps.
    pub fn container(&self) -> &PbdConstraintContainer {
        &self.container
    }

    pub fn attach_event_bus(&mut self, bus: EventBus) {
        self.bus = Some(bus);
    }

    pub fn event_bus_mut(&mut self) -> Option<&mut EventBus> {
        self.bus.as_mut()
    }

    pub fn timestep(&self) -> u32 {
        self.timestep
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Registers a body simulated on the vertices of `geometry`.
    ///
    /// Every vertex gets mass `vertex_mass`; a non-positive mass pins the
    /// whole body.
    pub fn add_body(&mut self, geometry: SharedGeometry, vertex_mass: f64) -> BodyHandle {
        let positions = read_geometry(&geometry).positions().to_vec();
        let handle = self.state.add_body(positions, vertex_mass);
        self.geometries.insert(handle, geometry);
        handle
    }

    pub fn geometry(&self, body: BodyHandle) -> Option<&SharedGeometry> {
        self.geometries.get(&body)
    }

    /// Pins the given vertices of `body`.
    pub fn fix_vertices(&mut self, body: BodyHandle, vertices: &[usize]) -> MedsimResult<()> {
        let b = self.state.try_body_mut(body)?;
        for &v in vertices {
            b.fix_vertex(v);
        }
        Ok(())
    }

    /// Generates the `kind` constraint family for `body` from its geometry,
    /// using the parameters in the model config.
    pub fn enable_constraint(
        &mut self,
        kind: ConstraintKind,
        body: BodyHandle,
    ) -> MedsimResult<Vec<ConstraintId>> {
        let functor = functor_for(kind, &self.config.parameters);
        self.add_functor(functor.as_ref(), body)
    }

    /// Runs a (possibly user-defined) functor on `body`'s geometry.
    pub fn add_functor(
        &mut self,
        functor: &dyn PbdConstraintFunctor,
        body: BodyHandle,
    ) -> MedsimResult<Vec<ConstraintId>> {
        let geometry = self
            .geometries
            .get(&body)
            .ok_or(MedsimError::UnknownBody(body.0))?;
        let ids = functor.add_to(&self.container, body, &read_geometry(geometry))?;
        if !ids.is_empty() {
            self.needs_partition = true;
        }
        Ok(ids)
    }

    /// Adds a single constraint to the sequential pool.
    pub fn add_constraint(&self, constraint: Box<dyn PbdConstraint>) -> ConstraintId {
        self.container.add_constraint(constraint)
    }

    /// Replaces last frame's contact constraints with constraints for
    /// `contacts`.
    pub fn set_contacts(&mut self, contacts: &[ContactPair]) -> Vec<ConstraintId> {
        let removed = self.container.remove_constraints(&self.contact_ids);
        if removed > 0 {
            self.emit(EventKind::ConstraintsRemoved {
                count: removed as u32,
            });
        }

        let stiffness = self.config.parameters.contact_stiffness;
        let ids = self
            .container
            .add_constraints(contacts.iter().map(|c| c.to_constraint(stiffness)));
        if !ids.is_empty() {
            self.needs_partition = true;
            self.emit(EventKind::ConstraintsAdded {
                count: ids.len() as u32,
            });
        }
        self.contact_ids = ids.iter().copied().collect();
        ids
    }

    /// Removes every constraint touching the given vertices of `body`
    /// (tearing, cell removal). Returns the number removed.
    pub fn remove_vertices(&mut self, body: BodyHandle, vertices: &[usize]) -> usize {
        let particles: HashSet<PbdParticleId> = vertices
            .iter()
            .map(|&v| PbdParticleId::new(body, v))
            .collect();
        let removed = self.container.remove_constraints_by_vertices(&particles);
        if removed > 0 {
            let live: HashSet<ConstraintId> = self.container.inspect(|pool, buckets| {
                pool.iter()
                    .chain(buckets.iter().flatten())
                    .map(|e| e.id)
                    .collect()
            });
            self.contact_ids.retain(|id| live.contains(id));
            self.emit(EventKind::ConstraintsRemoved {
                count: removed as u32,
            });
        }
        removed
    }

    /// Colors the constraint graph into parallel buckets.
    pub fn partition(&mut self) -> PartitionSummary {
        let summary = self
            .container
            .partition_constraints(self.config.partition_threshold);
        self.needs_partition = false;
        self.emit(EventKind::Partitioned {
            colors: summary.colors as u32,
            partitions: summary.partitions.len() as u32,
            sequential: summary.sequential as u32,
        });
        summary
    }

    /// Advances the simulation by one timestep of `config.dt`.
    pub fn step(&mut self) -> SolveReport {
        let start = Instant::now();
        let dt = self.config.dt;
        self.emit(EventKind::TimestepBegin {
            sim_time: self.sim_time,
        });

        if self.config.do_partitioning && self.needs_partition {
            self.partition();
        }

        let gravity = DVec3::from_array(self.config.gravity);
        for body in self.state.bodies_mut() {
            body.save_previous();
            body.integrate(dt, gravity, self.config.linear_damping);
        }

        let report = self.solver.solve(&mut self.container, &mut self.state, dt);

        for body in self.state.bodies_mut() {
            body.update_velocities(dt);
        }
        self.write_back();

        for (i, &residual) in report.residuals.iter().enumerate() {
            self.emit(EventKind::SolverIteration {
                iteration: i as u32 + 1,
                residual,
            });
        }
        self.emit(EventKind::Convergence {
            iterations: report.iterations,
            final_residual: report.final_residual,
            converged: report.converged,
        });
        self.emit(EventKind::Energy {
            kinetic: self.kinetic_energy(),
        });
        self.emit(EventKind::TimestepEnd {
            wall_time: start.elapsed().as_secs_f64(),
        });
        if let Some(bus) = self.bus.as_mut() {
            bus.flush();
        }

        self.timestep += 1;
        self.sim_time += dt;
        report
    }

    /// Kinetic energy over every free particle.
    pub fn kinetic_energy(&self) -> f64 {
        self.state.bodies().iter().map(|b| b.kinetic_energy()).sum()
    }

    /// Copies body positions into the shared geometries.
    fn write_back(&self) {
        for body in self.state.bodies() {
            let Some(geometry) = self.geometries.get(&body.handle) else {
                continue;
            };
            let mut geometry = write_geometry(geometry);
            let target = geometry.positions_mut();
            if target.len() != body.positions.len() {
                warn!(
                    body = body.handle.0,
                    geometry = target.len(),
                    particles = body.positions.len(),
                    "Geometry vertex count changed; positions not written back"
                );
                continue;
            }
            target.copy_from_slice(&body.positions);
        }
        debug!(timestep = self.timestep, "Positions written back");
    }

    fn emit(&self, kind: EventKind) {
        if let Some(bus) = &self.bus {
            bus.emit_kind(self.timestep, kind);
        }
    }
}
