//! Integration tests for constraint kinds and constraint functors.

use medsim_material::FemMaterialConfig;
use medsim_math::DVec3;
use medsim_mesh::generators::{line_strand, quad_grid, tet_grid, unit_tetrahedron};
use medsim_mesh::{Geometry, LineMesh, PointSet};
use medsim_pbd::constraints::{
    AreaConstraint, BaryPointToPointConstraint, BarySide, BendConstraint,
    ConstantDensityConstraint, DensityParameters, DihedralConstraint, DistanceConstraint,
    FemTetConstraint, InflatableDistanceConstraint, InflatableVolumeConstraint,
    VolumeConstraint,
};
use medsim_pbd::{
    AreaFunctor, BendFunctor, ConstraintKind, ConstraintParameters, DihedralFunctor,
    DistanceFunctor, FemTetFunctor, PbdConstraint, PbdConstraintFunctor, PbdState,
    SolverType, VolumeFunctor, functor_for,
};
use medsim_types::{BodyHandle, MedsimError, PbdParticleId};

const BODY: BodyHandle = BodyHandle(0);

fn ids<const N: usize>(vertices: [usize; N]) -> [PbdParticleId; N] {
    vertices.map(|v| PbdParticleId::new(BODY, v))
}

fn unit_tet_positions() -> [DVec3; 4] {
    [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z]
}

/// Unit tetrahedron with vertices 1..3 displaced.
fn deformed_positions() -> Vec<DVec3> {
    vec![
        DVec3::ZERO,
        DVec3::new(1.3, 0.1, 0.0),
        DVec3::new(0.2, 0.8, 0.1),
        DVec3::new(0.1, -0.1, 1.4),
    ]
}

fn state_with(positions: Vec<DVec3>, mass: f64) -> PbdState {
    let mut state = PbdState::new();
    let handle = state.add_body(positions, mass);
    assert_eq!(handle, BODY);
    state
}

// ─── Rest values ─────────────────────────────────────────────

#[test]
fn distance_rest_length_from_initial_positions() {
    let c = DistanceConstraint::new(ids([0, 1]), [DVec3::new(-0.5, 0.0, 0.0), DVec3::ZERO], 1.0);
    assert!((c.rest_length() - 0.5).abs() < 1e-12);
}

#[test]
fn unit_tetrahedron_rest_volume() {
    let c = VolumeConstraint::new(ids([0, 1, 2, 3]), unit_tet_positions(), 1.0);
    assert!((c.rest_volume() - 1.0 / 6.0).abs() < 1e-12);

    let fem = FemTetConstraint::new(
        ids([0, 1, 2, 3]),
        unit_tet_positions(),
        FemMaterialConfig::default(),
        1.0,
    );
    assert!((fem.rest_volume() - 1.0 / 6.0).abs() < 1e-12);
}

#[test]
fn area_and_dihedral_rest_values() {
    let area = AreaConstraint::new(ids([0, 1, 2]), [DVec3::ZERO, DVec3::X, DVec3::Y], 1.0);
    assert!((area.rest_area() - 0.5).abs() < 1e-12);

    // Two coplanar triangles sharing the edge (0, 1)
    let flat = [
        DVec3::new(0.5, 1.0, 0.0),
        DVec3::new(0.5, -1.0, 0.0),
        DVec3::ZERO,
        DVec3::X,
    ];
    let dihedral = DihedralConstraint::new(ids([0, 1, 2, 3]), flat, 1.0);
    assert!(dihedral.rest_angle().abs() < 1e-12);
}

#[test]
fn straight_bend_has_zero_rest_offset() {
    let c = BendConstraint::new(
        ids([0, 1, 2]),
        [DVec3::ZERO, DVec3::new(0.5, 0.0, 0.0), DVec3::X],
        1.0,
    );
    assert!(c.rest_offset().abs() < 1e-12);
}

#[test]
fn constraint_value_is_zero_at_rest() {
    let rest = unit_tet_positions();
    let state = state_with(rest.to_vec(), 1.0);

    let mut constraints: Vec<Box<dyn PbdConstraint>> = vec![
        Box::new(DistanceConstraint::new(ids([0, 1]), [rest[0], rest[1]], 1.0)),
        Box::new(VolumeConstraint::new(ids([0, 1, 2, 3]), rest, 1.0)),
        Box::new(AreaConstraint::new(ids([0, 1, 2]), [rest[0], rest[1], rest[2]], 1.0)),
        Box::new(DihedralConstraint::new(ids([2, 3, 0, 1]), [rest[2], rest[3], rest[0], rest[1]], 1.0)),
    ];
    for c in &mut constraints {
        let value = c.compute_value_and_gradient(&state).unwrap();
        assert!(value.abs() < 1e-12, "{} not satisfied at rest: {value}", c.name());
    }
}

// ─── Projection ──────────────────────────────────────────────

#[test]
fn fixed_vertex_never_moves_for_any_constraint_kind() {
    let rest = unit_tet_positions();
    let dense = DensityParameters {
        kernel_radius: 2.0,
        ..DensityParameters::default()
    };

    let mut constraints: Vec<Box<dyn PbdConstraint>> = vec![
        Box::new(DistanceConstraint::new(ids([0, 1]), [rest[0], rest[1]], 1.0)),
        Box::new(VolumeConstraint::new(ids([0, 1, 2, 3]), rest, 1.0)),
        Box::new(AreaConstraint::new(ids([0, 1, 2]), [rest[0], rest[1], rest[2]], 1.0)),
        Box::new(BendConstraint::new(ids([1, 0, 2]), [rest[1], rest[0], rest[2]], 1.0)),
        Box::new(DihedralConstraint::new(ids([2, 3, 0, 1]), [rest[2], rest[3], rest[0], rest[1]], 1.0)),
        Box::new(FemTetConstraint::new(ids([0, 1, 2, 3]), rest, FemMaterialConfig::default(), 1.0)),
        Box::new(ConstantDensityConstraint::new(ids([0, 1, 2, 3]).to_vec(), &rest, dense, 1.0)),
        Box::new(BaryPointToPointConstraint::new(
            BarySide::vertex(PbdParticleId::new(BODY, 0)),
            BarySide::new(ids([1, 2]).to_vec(), vec![0.5, 0.5]),
            1.0,
        )),
        Box::new(InflatableDistanceConstraint::new(ids([0, 3]), [rest[0], rest[3]], 1.0, 1.0)),
        Box::new(InflatableVolumeConstraint::new(ids([0, 1, 2, 3]), rest, 1.0, 1.0)),
    ];

    for solver in [SolverType::Pbd, SolverType::XPbd] {
        for c in &mut constraints {
            let mut state = state_with(deformed_positions(), 1.0);
            state.body_mut(BODY).unwrap().fix_vertex(0);
            let pinned = PbdParticleId::new(BODY, 0);

            c.zero_lambda();
            for _ in 0..10 {
                c.project_constraint(&mut state, 0.01, solver);
            }
            assert_eq!(
                state.position(pinned),
                Some(DVec3::ZERO),
                "{} moved a pinned vertex under {solver:?}",
                c.name()
            );
        }
    }
}

#[test]
fn distance_projection_moves_free_particles() {
    let mut state = state_with(vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)], 1.0);
    let mut c = DistanceConstraint::new(ids([0, 1]), [DVec3::ZERO, DVec3::X], 1.0);
    c.project_constraint(&mut state, 0.01, SolverType::Pbd);

    let a = state.position(PbdParticleId::new(BODY, 0)).unwrap();
    let b = state.position(PbdParticleId::new(BODY, 1)).unwrap();
    assert!((a.x - 0.5).abs() < 1e-12);
    assert!((b.x - 1.5).abs() < 1e-12);
}

#[test]
fn zero_stiffness_constraint_is_skipped() {
    let state = state_with(vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)], 1.0);
    let mut c = DistanceConstraint::new(ids([0, 1]), [DVec3::ZERO, DVec3::X], 0.0);
    assert!(c.compute_correction(&state, 0.01, SolverType::Pbd).is_none());
}

#[test]
fn xpbd_accumulates_lambda_and_resets() {
    let state = state_with(vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)], 1.0);
    let mut c = DistanceConstraint::new(ids([0, 1]), [DVec3::ZERO, DVec3::X], 100.0);
    c.compute_correction(&state, 0.01, SolverType::XPbd).unwrap();
    assert!(c.base().lambda < 0.0);
    c.zero_lambda();
    assert_eq!(c.base().lambda, 0.0);
}

#[test]
fn coincident_bary_points_are_skipped() {
    let state = state_with(vec![DVec3::ZERO, DVec3::ZERO], 1.0);
    let mut c = BaryPointToPointConstraint::new(
        BarySide::vertex(PbdParticleId::new(BODY, 0)),
        BarySide::vertex(PbdParticleId::new(BODY, 1)),
        1.0,
    );
    assert!(c.compute_value_and_gradient(&state).is_none());
    assert!(c.compute_correction(&state, 0.01, SolverType::Pbd).is_none());
}

#[test]
fn stale_particle_id_skips_constraint() {
    let state = state_with(vec![DVec3::ZERO, DVec3::X], 1.0);
    let mut c = DistanceConstraint::new(
        [PbdParticleId::new(BODY, 0), PbdParticleId::new(BodyHandle(7), 0)],
        [DVec3::ZERO, DVec3::X],
        1.0,
    );
    assert!(c.compute_value_and_gradient(&state).is_none());
}

#[test]
fn inverted_tetrahedron_is_restored_by_volume_projection() {
    let rest = unit_tet_positions();
    let mut state = state_with(rest.to_vec(), 1.0);
    state.body_mut(BODY).unwrap().positions[3] = DVec3::new(0.0, 0.0, -0.2);

    let mut c = VolumeConstraint::new(ids([0, 1, 2, 3]), rest, 1.0);
    for _ in 0..50 {
        c.project_constraint(&mut state, 0.01, SolverType::Pbd);
    }
    let value = c.compute_value_and_gradient(&state).unwrap();
    assert!(value.abs() < 1e-6, "residual volume error {value}");
}

#[test]
fn fem_tet_drives_stretch_back_toward_rest() {
    let rest = unit_tet_positions();
    let mut stretched = rest.to_vec();
    stretched[1] = DVec3::new(1.5, 0.0, 0.0);
    let mut state = state_with(stretched, 1.0);

    let mut c = FemTetConstraint::new(ids([0, 1, 2, 3]), rest, FemMaterialConfig::default(), 1.0);
    let before = c.compute_value_and_gradient(&state).unwrap();
    for _ in 0..20 {
        c.project_constraint(&mut state, 0.01, SolverType::Pbd);
    }
    let after = c.compute_value_and_gradient(&state).unwrap();
    assert!(before > 0.0);
    assert!(after < before, "energy did not drop: {before} -> {after}");
}

#[test]
fn inflated_rest_value_relaxes_toward_initial() {
    let state = state_with(vec![DVec3::ZERO, DVec3::X], 1.0);
    let mut c = InflatableDistanceConstraint::new(ids([0, 1]), [DVec3::ZERO, DVec3::X], 1.0, 10.0);
    assert!(!c.inflation().inflated);

    c.set_rest_value(2.0);
    assert!(c.inflation().inflated);
    c.compute_correction(&state, 0.01, SolverType::Pbd);
    // gap 1.0 shrinks by rate * dt = 0.1
    assert!((c.rest_value() - 1.9).abs() < 1e-12);

    c.reset_rest_value();
    assert!((c.rest_value() - 1.0).abs() < 1e-12);
    assert!(!c.inflation().inflated);
}

#[test]
fn zero_diffusion_keeps_inflated_value() {
    let state = state_with(unit_tet_positions().to_vec(), 1.0);
    let mut c = InflatableVolumeConstraint::new(ids([0, 1, 2, 3]), unit_tet_positions(), 1.0, 0.0);
    c.set_rest_value(0.5);
    for _ in 0..5 {
        c.compute_correction(&state, 0.01, SolverType::Pbd);
    }
    assert!((c.rest_value() - 0.5).abs() < 1e-12);
}

#[test]
fn density_constraint_spreads_compressed_particles() {
    let rest: Vec<DVec3> = (0..4).map(|i| DVec3::new(i as f64 * 0.05, 0.0, 0.0)).collect();
    let compressed: Vec<DVec3> = (0..4).map(|i| DVec3::new(i as f64 * 0.03, 0.0, 0.0)).collect();
    let mut state = state_with(compressed, 1.0);

    let params = DensityParameters::default();
    let particles = (0..4).map(|v| PbdParticleId::new(BODY, v)).collect();
    let mut c = ConstantDensityConstraint::new(particles, &rest, params, 1.0);
    assert!(c.rest_density() > 0.0);

    let before = c.compute_value_and_gradient(&state).unwrap();
    assert!(before > 0.0);
    c.project_constraint(&mut state, 0.01, SolverType::Pbd);
    let first = state.position(PbdParticleId::new(BODY, 0)).unwrap();
    let last = state.position(PbdParticleId::new(BODY, 3)).unwrap();
    assert!(last.x - first.x > 0.09, "particles did not spread");
}

#[test]
fn density_correction_ignores_solver_type() {
    let rest: Vec<DVec3> = (0..4).map(|i| DVec3::new(i as f64 * 0.05, 0.0, 0.0)).collect();
    let compressed: Vec<DVec3> = (0..4).map(|i| DVec3::new(i as f64 * 0.03, 0.0, 0.0)).collect();
    let state = state_with(compressed, 1.0);
    let particles: Vec<PbdParticleId> = (0..4).map(|v| PbdParticleId::new(BODY, v)).collect();
    let params = DensityParameters::default();

    let mut pbd = ConstantDensityConstraint::new(particles.clone(), &rest, params, 1.0);
    let mut xpbd = ConstantDensityConstraint::new(particles, &rest, params, 1.0);
    let a = pbd.compute_correction(&state, 0.01, SolverType::Pbd).unwrap();
    let b = xpbd.compute_correction(&state, 0.01, SolverType::XPbd).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

// ─── Functors ────────────────────────────────────────────────

fn three_vertex_line() -> Geometry {
    LineMesh::new(
        vec![DVec3::new(-0.5, 0.0, 0.0), DVec3::ZERO, DVec3::new(0.5, 0.0, 0.0)],
        vec![[0, 1], [1, 2]],
    )
    .unwrap()
    .into()
}

#[test]
fn distance_functor_on_line_mesh() {
    let geometry = three_vertex_line();
    let constraints = DistanceFunctor::new(1.0).generate(BODY, &geometry).unwrap();
    assert_eq!(constraints.len(), 2);
    assert_eq!(constraints[0].particles(), &ids([0, 1]));
    assert_eq!(constraints[1].particles(), &ids([1, 2]));

    // Rest length 0.5: doubling the spacing gives C = 1.0 - 0.5
    let state = state_with(
        vec![DVec3::new(-1.0, 0.0, 0.0), DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0)],
        1.0,
    );
    for mut c in constraints {
        let value = c.compute_value_and_gradient(&state).unwrap();
        assert!((value - 0.5).abs() < 1e-12);
    }
}

#[test]
fn bend_functor_with_stride_two() {
    let geometry: Geometry = line_strand(5, 0.5, DVec3::ZERO, DVec3::X).into();
    let constraints = BendFunctor::new(1.0, 2).generate(BODY, &geometry).unwrap();
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].particles(), &ids([0, 2, 4]));
}

#[test]
fn bend_functor_with_unit_stride_covers_every_triple() {
    let geometry: Geometry = line_strand(5, 0.5, DVec3::ZERO, DVec3::X).into();
    let constraints = BendFunctor::new(1.0, 1).generate(BODY, &geometry).unwrap();
    let triples: Vec<&[PbdParticleId]> = constraints.iter().map(|c| c.particles()).collect();
    assert_eq!(
        triples,
        vec![&ids([0, 1, 2])[..], &ids([1, 2, 3])[..], &ids([2, 3, 4])[..]]
    );
}

#[test]
fn tetrahedral_functors_count() {
    let mesh = tet_grid(2, 1, 1, DVec3::new(2.0, 1.0, 1.0), DVec3::ZERO);
    let cells = mesh.cell_count();
    let geometry: Geometry = mesh.into();

    assert_eq!(VolumeFunctor::new(1.0).generate(BODY, &geometry).unwrap().len(), cells);
    assert_eq!(
        FemTetFunctor::new(FemMaterialConfig::default(), 1.0)
            .generate(BODY, &geometry)
            .unwrap()
            .len(),
        cells
    );
    let edges = medsim_mesh::unique_edges(&geometry.as_tetrahedral().unwrap().cells).len();
    assert_eq!(DistanceFunctor::new(1.0).generate(BODY, &geometry).unwrap().len(), edges);
}

#[test]
fn surface_functors_count() {
    let geometry: Geometry = quad_grid(1, 1, 1.0, 1.0).into();
    assert_eq!(AreaFunctor::new(1.0).generate(BODY, &geometry).unwrap().len(), 2);
    // A single quad has one interior edge (the diagonal)
    let dihedral = DihedralFunctor::new(1.0).generate(BODY, &geometry).unwrap();
    assert_eq!(dihedral.len(), 1);
    assert_eq!(DistanceFunctor::new(1.0).generate(BODY, &geometry).unwrap().len(), 5);
}

#[test]
fn wrong_geometry_kind_is_rejected() {
    let surface: Geometry = quad_grid(1, 1, 1.0, 1.0).into();
    let tets: Geometry = unit_tetrahedron().into();

    let bend = BendFunctor::new(1.0, 1).generate(BODY, &surface);
    assert!(matches!(bend, Err(MedsimError::GeometryMismatch { .. })));
    let volume = VolumeFunctor::new(1.0).generate(BODY, &surface);
    assert!(matches!(volume, Err(MedsimError::GeometryMismatch { .. })));
    let area = AreaFunctor::new(1.0).generate(BODY, &tets);
    assert!(matches!(area, Err(MedsimError::GeometryMismatch { .. })));
}

#[test]
fn distance_on_point_set_is_rejected() {
    let points: Geometry = PointSet::new(vec![DVec3::ZERO, DVec3::X]).into();
    let result = DistanceFunctor::new(1.0).generate(BODY, &points);
    assert!(matches!(
        result,
        Err(MedsimError::GeometryMismatch {
            expected: "LineMesh",
            found: "PointSet",
        })
    ));
}

#[test]
fn inflatable_functors_generate_inflatable_kinds() {
    let geometry: Geometry = unit_tetrahedron().into();
    let params = ConstraintParameters {
        inflation_diffusion_rate: 0.5,
        ..ConstraintParameters::default()
    };
    let distance = functor_for(ConstraintKind::InflatableDistance, &params)
        .generate(BODY, &geometry)
        .unwrap();
    assert_eq!(distance.len(), 6);
    assert!(distance.iter().all(|c| c.name() == "InflatableDistance"));

    let volume = functor_for(ConstraintKind::InflatableVolume, &params)
        .generate(BODY, &geometry)
        .unwrap();
    assert_eq!(volume.len(), 1);
    assert_eq!(volume[0].name(), "InflatableVolume");
}

#[test]
fn functor_stiffness_comes_from_parameters() {
    let params = ConstraintParameters {
        distance_stiffness: 42.0,
        ..ConstraintParameters::default()
    };
    let constraints = functor_for(ConstraintKind::Distance, &params)
        .generate(BODY, &three_vertex_line())
        .unwrap();
    assert!(constraints.iter().all(|c| c.stiffness() == 42.0));
}
