//! Constraint generation from mesh connectivity.
//!
//! A functor inspects a geometry's rest configuration and builds one
//! constraint family for it. Handing a functor the wrong geometry kind
//! (e.g. a surface to the bend functor) is logged and rejected with
//! `GeometryMismatch`; no constraints are produced.
//!
//! The trait is open, so downstream crates can feed their own
//! constraint kinds into the container through the same path.

use medsim_material::FemMaterialConfig;
use medsim_math::DVec3;
use medsim_mesh::{unique_edges, CellMesh, Geometry, GeometryKind, SurfaceTopology};
use medsim_types::{BodyHandle, ConstraintId, MedsimResult, PbdParticleId};
use tracing::{debug, warn};

use crate::config::{ConstraintKind, ConstraintParameters};
use crate::constraint::PbdConstraint;
use crate::constraints::{
    AreaConstraint, BendConstraint, ConstantDensityConstraint, DensityParameters,
    DihedralConstraint, DistanceConstraint, FemTetConstraint, InflatableDistanceConstraint,
    InflatableVolumeConstraint, VolumeConstraint,
};
use crate::container::PbdConstraintContainer;

/// Boxed constraints ready for the container.
pub type ConstraintList = Vec<Box<dyn PbdConstraint>>;

/// Builds one constraint family from a body's geometry.
pub trait PbdConstraintFunctor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generates constraints for `body`, whose vertex `i` is vertex `i`
    /// of `geometry`. Rest values come from the initial positions.
    fn generate(&self, body: BodyHandle, geometry: &Geometry) -> MedsimResult<ConstraintList>;

    /// Generates and adds the constraints to `container`.
    fn add_to(
        &self,
        container: &PbdConstraintContainer,
        body: BodyHandle,
        geometry: &Geometry,
    ) -> MedsimResult<Vec<ConstraintId>> {
        let constraints = self.generate(body, geometry)?;
        debug!(
            functor = self.name(),
            count = constraints.len(),
            "Generated constraints"
        );
        Ok(container.add_constraints(constraints))
    }
}

/// Logs a rejected geometry before handing the error back.
fn checked<T>(functor: &'static str, result: MedsimResult<T>) -> MedsimResult<T> {
    result.inspect_err(|e| warn!(functor, error = %e, "Geometry rejected by constraint functor"))
}

fn particles<const N: usize>(body: BodyHandle, cell: [usize; N]) -> [PbdParticleId; N] {
    cell.map(|v| PbdParticleId::new(body, v))
}

fn rest<const N: usize>(initial: &[DVec3], cell: [usize; N]) -> [DVec3; N] {
    cell.map(|v| initial[v])
}

// ─── Distance ───────────────────────────────────────────────

/// One distance constraint per unique edge of a line, surface or
/// tetrahedral mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceFunctor {
    pub stiffness: f64,
    /// When set, generates inflatable constraints with this diffusion rate.
    pub inflation: Option<f64>,
}

impl DistanceFunctor {
    pub fn new(stiffness: f64) -> Self {
        Self {
            stiffness,
            inflation: None,
        }
    }

    pub fn with_inflation(mut self, diffusion_rate: f64) -> Self {
        self.inflation = Some(diffusion_rate);
        self
    }

    fn edges<const N: usize>(&self, body: BodyHandle, mesh: &CellMesh<N>) -> ConstraintList {
        unique_edges(&mesh.cells)
            .into_iter()
            .map(|edge| {
                let ids = particles(body, edge);
                let x = rest(&mesh.initial_positions, edge);
                match self.inflation {
                    Some(rate) => Box::new(InflatableDistanceConstraint::new(
                        ids,
                        x,
                        self.stiffness,
                        rate,
                    )) as Box<dyn PbdConstraint>,
                    None => Box::new(DistanceConstraint::new(ids, x, self.stiffness)),
                }
            })
            .collect()
    }
}

impl PbdConstraintFunctor for DistanceFunctor {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn generate(&self, body: BodyHandle, geometry: &Geometry) -> MedsimResult<ConstraintList> {
        match geometry {
            Geometry::Line(mesh) => Ok(self.edges(body, mesh)),
            Geometry::Surface(mesh) => Ok(self.edges(body, mesh)),
            Geometry::Tetrahedral(mesh) => Ok(self.edges(body, mesh)),
            Geometry::PointSet(_) => checked(
                self.name(),
                Err(geometry.mismatch(GeometryKind::LineMesh)),
            ),
        }
    }
}

// ─── Volume ─────────────────────────────────────────────────

/// One volume constraint per tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeFunctor {
    pub stiffness: f64,
    pub inflation: Option<f64>,
}

impl VolumeFunctor {
    pub fn new(stiffness: f64) -> Self {
        Self {
            stiffness,
            inflation: None,
        }
    }

    pub fn with_inflation(mut self, diffusion_rate: f64) -> Self {
        self.inflation = Some(diffusion_rate);
        self
    }
}

impl PbdConstraintFunctor for VolumeFunctor {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn generate(&self, body: BodyHandle, geometry: &Geometry) -> MedsimResult<ConstraintList> {
        let mesh = checked(self.name(), geometry.as_tetrahedral())?;
        Ok(mesh
            .cells
            .iter()
            .map(|&tet| {
                let ids = particles(body, tet);
                let x = rest(&mesh.initial_positions, tet);
                match self.inflation {
                    Some(rate) => Box::new(InflatableVolumeConstraint::new(
                        ids,
                        x,
                        self.stiffness,
                        rate,
                    )) as Box<dyn PbdConstraint>,
                    None => Box::new(VolumeConstraint::new(ids, x, self.stiffness)),
                }
            })
            .collect())
    }
}

// ─── FEM ────────────────────────────────────────────────────

/// One FEM constraint per tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FemTetFunctor {
    pub material: FemMaterialConfig,
    pub stiffness: f64,
}

impl FemTetFunctor {
    pub fn new(material: FemMaterialConfig, stiffness: f64) -> Self {
        Self {
            material,
            stiffness,
        }
    }
}

impl PbdConstraintFunctor for FemTetFunctor {
    fn name(&self) -> &'static str {
        "fem_tet"
    }

    fn generate(&self, body: BodyHandle, geometry: &Geometry) -> MedsimResult<ConstraintList> {
        let mesh = checked(self.name(), geometry.as_tetrahedral())?;
        checked(self.name(), self.material.validate())?;
        Ok(mesh
            .cells
            .iter()
            .map(|&tet| {
                Box::new(FemTetConstraint::new(
                    particles(body, tet),
                    rest(&mesh.initial_positions, tet),
                    self.material,
                    self.stiffness,
                )) as Box<dyn PbdConstraint>
            })
            .collect())
    }
}

// ─── Area ───────────────────────────────────────────────────

/// One area constraint per surface triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaFunctor {
    pub stiffness: f64,
}

impl AreaFunctor {
    pub fn new(stiffness: f64) -> Self {
        Self { stiffness }
    }
}

impl PbdConstraintFunctor for AreaFunctor {
    fn name(&self) -> &'static str {
        "area"
    }

    fn generate(&self, body: BodyHandle, geometry: &Geometry) -> MedsimResult<ConstraintList> {
        let mesh = checked(self.name(), geometry.as_surface())?;
        Ok(mesh
            .cells
            .iter()
            .map(|&tri| {
                Box::new(AreaConstraint::new(
                    particles(body, tri),
                    rest(&mesh.initial_positions, tri),
                    self.stiffness,
                )) as Box<dyn PbdConstraint>
            })
            .collect())
    }
}

// ─── Bend ───────────────────────────────────────────────────

/// Bend constraints along a line strand.
///
/// Segment `i` spans `cells[i]`. For every start segment `i` with
/// `i + 2·stride − 1 < segment_count` the functor emits the triple
/// `(cells[i][0], cells[i + stride][0], cells[i + 2·stride − 1][1])`:
/// two points `stride` segments apart on either side of a middle point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BendFunctor {
    pub stiffness: f64,
    pub stride: usize,
}

impl BendFunctor {
    pub fn new(stiffness: f64, stride: usize) -> Self {
        Self { stiffness, stride }
    }
}

impl PbdConstraintFunctor for BendFunctor {
    fn name(&self) -> &'static str {
        "bend"
    }

    fn generate(&self, body: BodyHandle, geometry: &Geometry) -> MedsimResult<ConstraintList> {
        let mesh = checked(self.name(), geometry.as_line())?;
        let stride = self.stride.max(1);
        let span = 2 * stride - 1;
        let cells = &mesh.cells;

        Ok((0..cells.len())
            .take_while(|&i| i + span < cells.len())
            .map(|i| {
                let triple = [cells[i][0], cells[i + stride][0], cells[i + span][1]];
                Box::new(BendConstraint::new(
                    particles(body, triple),
                    rest(&mesh.initial_positions, triple),
                    self.stiffness,
                )) as Box<dyn PbdConstraint>
            })
            .collect())
    }
}

// ─── Dihedral ───────────────────────────────────────────────

/// One dihedral constraint per interior surface edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DihedralFunctor {
    pub stiffness: f64,
}

impl DihedralFunctor {
    pub fn new(stiffness: f64) -> Self {
        Self { stiffness }
    }
}

impl PbdConstraintFunctor for DihedralFunctor {
    fn name(&self) -> &'static str {
        "dihedral"
    }

    fn generate(&self, body: BodyHandle, geometry: &Geometry) -> MedsimResult<ConstraintList> {
        let mesh = checked(self.name(), geometry.as_surface())?;
        let topology = SurfaceTopology::build(mesh);
        Ok(topology
            .interior_edges
            .iter()
            .map(|edge| {
                let quad = [edge.wing_a, edge.wing_b, edge.v0, edge.v1];
                Box::new(DihedralConstraint::new(
                    particles(body, quad),
                    rest(&mesh.initial_positions, quad),
                    self.stiffness,
                )) as Box<dyn PbdConstraint>
            })
            .collect())
    }
}

// ─── Constant density ───────────────────────────────────────

/// A single density constraint over every vertex of any geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantDensityFunctor {
    pub stiffness: f64,
    pub parameters: DensityParameters,
}

impl ConstantDensityFunctor {
    pub fn new(parameters: DensityParameters, stiffness: f64) -> Self {
        Self {
            stiffness,
            parameters,
        }
    }
}

impl PbdConstraintFunctor for ConstantDensityFunctor {
    fn name(&self) -> &'static str {
        "constant_density"
    }

    fn generate(&self, body: BodyHandle, geometry: &Geometry) -> MedsimResult<ConstraintList> {
        let initial = geometry.initial_positions();
        if initial.is_empty() {
            return Ok(Vec::new());
        }
        let ids = (0..initial.len())
            .map(|v| PbdParticleId::new(body, v))
            .collect();
        Ok(vec![Box::new(ConstantDensityConstraint::new(
            ids,
            initial,
            self.parameters,
            self.stiffness,
        ))])
    }
}

/// The functor for `kind`, configured from `params`.
pub fn functor_for(
    kind: ConstraintKind,
    params: &ConstraintParameters,
) -> Box<dyn PbdConstraintFunctor> {
    match kind {
        ConstraintKind::Distance => Box::new(DistanceFunctor::new(params.distance_stiffness)),
        ConstraintKind::Volume => Box::new(VolumeFunctor::new(params.volume_stiffness)),
        ConstraintKind::Area => Box::new(AreaFunctor::new(params.area_stiffness)),
        ConstraintKind::Bend => {
            Box::new(BendFunctor::new(params.bend_stiffness, params.bend_stride))
        }
        ConstraintKind::Dihedral => Box::new(DihedralFunctor::new(params.dihedral_stiffness)),
        ConstraintKind::Fem => {
            Box::new(FemTetFunctor::new(params.fem_material, params.fem_stiffness))
        }
        ConstraintKind::ConstantDensity => Box::new(ConstantDensityFunctor::new(
            params.density,
            params.density_stiffness,
        )),
        ConstraintKind::InflatableDistance => Box::new(
            DistanceFunctor::new(params.distance_stiffness)
                .with_inflation(params.inflation_diffusion_rate),
        ),
        ConstraintKind::InflatableVolume => Box::new(
            VolumeFunctor::new(params.volume_stiffness)
                .with_inflation(params.inflation_diffusion_rate),
        ),
    }
}
