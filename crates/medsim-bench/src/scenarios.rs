//! Benchmark scenarios: procedural geometry, pinning, constraint set and
//! solver configuration for each case.
//!
//! 1. **Hanging strand** — a line pinned at one end swinging down
//!    (distance + bend)
//! 2. **Hanging sheet** — a cloth pinned along its top edge
//!    (distance + dihedral)
//! 3. **Tet block** — a soft block pinned on its top face
//!    (distance + volume), with a conforming surface driven by a
//!    tetra-triangle map

use medsim_math::DVec3;
use medsim_mesh::generators::{line_strand, quad_grid, tet_grid};
use medsim_mesh::Geometry;
use medsim_pbd::{ConstraintKind, PbdModelConfig};
use serde::{Deserialize, Serialize};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    HangingStrand,
    HangingSheet,
    TetBlock,
}

impl ScenarioKind {
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::HangingStrand,
            ScenarioKind::HangingSheet,
            ScenarioKind::TetBlock,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::HangingStrand => "hanging_strand",
            ScenarioKind::HangingSheet => "hanging_sheet",
            ScenarioKind::TetBlock => "tet_block",
        }
    }

    /// Parses a scenario name as printed by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    /// Simulated geometry (rest configuration).
    pub geometry: Geometry,
    /// Pinned vertex indices.
    pub pinned: Vec<usize>,
    /// Constraint families generated on the body.
    pub constraints: Vec<ConstraintKind>,
    pub config: PbdModelConfig,
    pub timesteps: u32,
    /// Per-vertex mass (kg).
    pub vertex_mass: f64,
    /// Drive an extracted boundary surface through a tetra-triangle map.
    pub map_surface: bool,
}

impl Scenario {
    /// A 2 m strand of 41 vertices along +X, pinned at the origin.
    pub fn hanging_strand() -> Self {
        let mut config = PbdModelConfig::default();
        config.parameters.bend_stride = 2;
        Self {
            kind: ScenarioKind::HangingStrand,
            geometry: line_strand(41, 0.05, DVec3::ZERO, DVec3::X).into(),
            pinned: vec![0],
            constraints: vec![ConstraintKind::Distance, ConstraintKind::Bend],
            config,
            timesteps: 100,
            vertex_mass: 0.01,
            map_surface: false,
        }
    }

    /// A 1 m × 1 m cloth at 20×20 resolution, pinned along the top row.
    pub fn hanging_sheet() -> Self {
        let cols = 20;
        Self {
            kind: ScenarioKind::HangingSheet,
            geometry: quad_grid(cols, 20, 1.0, 1.0).into(),
            pinned: (0..=cols).collect(),
            constraints: vec![ConstraintKind::Distance, ConstraintKind::Dihedral],
            config: PbdModelConfig::default(),
            timesteps: 100,
            vertex_mass: 0.002,
            map_surface: false,
        }
    }

    /// A 1 m × 0.5 m × 0.5 m block of 8×4×4 cubes, pinned on its top face.
    pub fn tet_block() -> Self {
        let mesh = tet_grid(8, 4, 4, DVec3::new(1.0, 0.5, 0.5), DVec3::ZERO);
        let top = mesh.bounding_box().max.y;
        let pinned = mesh
            .initial_positions
            .iter()
            .enumerate()
            .filter(|(_, p)| (p.y - top).abs() < 1e-9)
            .map(|(i, _)| i)
            .collect();
        Self {
            kind: ScenarioKind::TetBlock,
            geometry: mesh.into(),
            pinned,
            constraints: vec![ConstraintKind::Distance, ConstraintKind::Volume],
            config: PbdModelConfig::default(),
            timesteps: 60,
            vertex_mass: 0.05,
            map_surface: true,
        }
    }

    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::HangingStrand => Self::hanging_strand(),
            ScenarioKind::HangingSheet => Self::hanging_sheet(),
            ScenarioKind::TetBlock => Self::tet_block(),
        }
    }

    /// Replaces the model configuration.
    pub fn with_config(mut self, config: PbdModelConfig) -> Self {
        self.config = config;
        self
    }
}
