//! PBD model configuration.
//!
//! Plain numeric knobs with documented defaults. Everything here is
//! `serde`-serializable so a scenario can be described in JSON.

use medsim_material::FemMaterialConfig;
use medsim_types::constants::{
    DEFAULT_DT, DEFAULT_PARTITION_THRESHOLD, DEFAULT_PBD_ITERATIONS, GRAVITY,
};
use medsim_types::{MedsimError, MedsimResult};
use serde::{Deserialize, Serialize};

use crate::constraint::SolverType;
use crate::constraints::DensityParameters;
use crate::solver::PbdSolver;

/// Constraint families a model can generate from geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Distance,
    Volume,
    Area,
    Bend,
    Dihedral,
    Fem,
    ConstantDensity,
    InflatableDistance,
    InflatableVolume,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 9] = [
        ConstraintKind::Distance,
        ConstraintKind::Volume,
        ConstraintKind::Area,
        ConstraintKind::Bend,
        ConstraintKind::Dihedral,
        ConstraintKind::Fem,
        ConstraintKind::ConstantDensity,
        ConstraintKind::InflatableDistance,
        ConstraintKind::InflatableVolume,
    ];
}

/// Per-kind constraint parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintParameters {
    pub distance_stiffness: f64,
    pub volume_stiffness: f64,
    pub area_stiffness: f64,
    pub bend_stiffness: f64,
    /// Vertex stride between the three particles of a bend constraint.
    pub bend_stride: usize,
    pub dihedral_stiffness: f64,
    pub fem_stiffness: f64,
    pub fem_material: FemMaterialConfig,
    pub density_stiffness: f64,
    pub density: DensityParameters,
    /// Rate at which inflated rest values relax back to their initial value.
    pub inflation_diffusion_rate: f64,
    /// Stiffness of contact constraints built from collision data.
    pub contact_stiffness: f64,
}

impl Default for ConstraintParameters {
    fn default() -> Self {
        Self {
            distance_stiffness: 1.0e4,
            volume_stiffness: 1.0e4,
            area_stiffness: 1.0e3,
            bend_stiffness: 1.0e2,
            bend_stride: 1,
            dihedral_stiffness: 1.0e2,
            fem_stiffness: 1.0,
            fem_material: FemMaterialConfig::default(),
            density_stiffness: 1.0,
            density: DensityParameters::default(),
            inflation_diffusion_rate: 0.0,
            contact_stiffness: 1.0e5,
        }
    }
}

/// Configuration for a [`PbdModel`](crate::model::PbdModel).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PbdModelConfig {
    /// Timestep in seconds.
    pub dt: f64,
    /// Maximum solver sweeps per timestep.
    pub iterations: u32,
    pub gravity: [f64; 3],
    /// Velocity damping per step (0 = none, 1 = full).
    pub linear_damping: f64,
    pub solver_type: SolverType,
    /// Color the constraint graph before solving.
    pub do_partitioning: bool,
    /// Buckets smaller than this are solved sequentially.
    pub partition_threshold: usize,
    /// Early-exit tolerance on the largest correction (0 disables).
    pub tolerance: f64,
    /// Solve partition buckets on the rayon pool.
    pub parallel: bool,
    pub parameters: ConstraintParameters,
}

impl Default for PbdModelConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            iterations: DEFAULT_PBD_ITERATIONS,
            gravity: [0.0, -GRAVITY, 0.0],
            linear_damping: 0.01,
            solver_type: SolverType::XPbd,
            do_partitioning: true,
            partition_threshold: DEFAULT_PARTITION_THRESHOLD,
            tolerance: 0.0,
            parallel: true,
            parameters: ConstraintParameters::default(),
        }
    }
}

impl PbdModelConfig {
    /// Few iterations, single-threaded; for stepping through a scene.
    pub fn debug() -> Self {
        Self {
            iterations: 3,
            do_partitioning: false,
            parallel: false,
            ..Default::default()
        }
    }

    /// More iterations and an early-exit tolerance.
    pub fn high_quality() -> Self {
        Self {
            iterations: 50,
            tolerance: 1.0e-9,
            ..Default::default()
        }
    }

    /// Solver settings derived from this config.
    pub fn solver(&self) -> PbdSolver {
        PbdSolver {
            iterations: self.iterations,
            solver_type: self.solver_type,
            tolerance: self.tolerance,
            parallel: self.parallel,
        }
    }

    pub fn validate(&self) -> MedsimResult<()> {
        let invalid = |msg: String| Err(MedsimError::InvalidConfig(msg));
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return invalid(format!("dt must be positive, got {}", self.dt));
        }
        if self.iterations == 0 {
            return invalid("iterations must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.linear_damping) {
            return invalid(format!(
                "linear_damping must be in [0, 1], got {}",
                self.linear_damping
            ));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return invalid(format!("tolerance must be >= 0, got {}", self.tolerance));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return invalid("gravity must be finite".into());
        }

        let p = &self.parameters;
        let stiffnesses = [
            ("distance_stiffness", p.distance_stiffness),
            ("volume_stiffness", p.volume_stiffness),
            ("area_stiffness", p.area_stiffness),
            ("bend_stiffness", p.bend_stiffness),
            ("dihedral_stiffness", p.dihedral_stiffness),
            ("fem_stiffness", p.fem_stiffness),
            ("density_stiffness", p.density_stiffness),
            ("contact_stiffness", p.contact_stiffness),
        ];
        for (name, k) in stiffnesses {
            if k.is_nan() || k < 0.0 {
                return invalid(format!("{name} must be >= 0, got {k}"));
            }
        }
        if p.bend_stride == 0 {
            return invalid("bend_stride must be at least 1".into());
        }
        if p.density.kernel_radius.is_nan() || p.density.kernel_radius <= 0.0 {
            return invalid(format!(
                "density kernel_radius must be positive, got {}",
                p.density.kernel_radius
            ));
        }
        if p.inflation_diffusion_rate.is_nan() || p.inflation_diffusion_rate < 0.0 {
            return invalid(format!(
                "inflation_diffusion_rate must be >= 0, got {}",
                p.inflation_diffusion_rate
            ));
        }
        p.fem_material
            .validate()
            .map_err(|e| MedsimError::InvalidConfig(format!("fem_material: {e}")))
    }
}
