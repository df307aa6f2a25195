//! Integration tests for medsim-mapping.

use medsim_math::DVec3;
use medsim_mesh::generators::{quad_grid, tet_grid, unit_tetrahedron};
use medsim_mesh::{read_geometry, shared, write_geometry, PointSet, SharedGeometry, SurfaceMesh};
use medsim_mapping::{
    match_vertices, GeometryMap, PointwiseMap, TetraTriangleMap, TriangleToTetMap,
};
use medsim_types::MedsimError;

fn block() -> SharedGeometry {
    shared(tet_grid(2, 2, 2, DVec3::ONE, DVec3::ZERO))
}

fn inner_sheet() -> SharedGeometry {
    shared(quad_grid(3, 3, 0.8, 0.8))
}

fn transform(geometry: &SharedGeometry, f: impl Fn(DVec3) -> DVec3) {
    let mut g = write_geometry(geometry);
    for p in g.positions_mut() {
        *p = f(*p);
    }
}

fn positions(geometry: &SharedGeometry) -> Vec<DVec3> {
    read_geometry(geometry).positions().to_vec()
}

// ─── TetraTriangleMap ─────────────────────────────────────────

#[test]
fn weights_sum_to_one() {
    let mut map = TetraTriangleMap::between(block(), inner_sheet()).unwrap();
    map.compute().unwrap();
    let entries = map.entries().unwrap();
    assert_eq!(entries.len(), 16);
    for e in entries {
        assert!(e.enclosed);
        assert!((e.weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn rigid_translation_is_reproduced() {
    let master = block();
    let slave = inner_sheet();
    let before = positions(&slave);

    let mut map = TetraTriangleMap::between(master.clone(), slave.clone()).unwrap();
    map.compute().unwrap();

    let offset = DVec3::new(1.0, -2.0, 0.5);
    transform(&master, |p| p + offset);
    map.apply();

    for (b, a) in before.iter().zip(positions(&slave)) {
        assert!((a - (*b + offset)).length() < 1e-9);
    }
}

#[test]
fn affine_deformation_is_reproduced() {
    let master = block();
    let slave = inner_sheet();
    let before = positions(&slave);

    let mut map = TetraTriangleMap::between(master.clone(), slave.clone()).unwrap();
    map.compute().unwrap();

    let stretch = |p: DVec3| DVec3::new(2.0 * p.x, p.y + 0.5 * p.x, 0.25 * p.z);
    transform(&master, stretch);
    map.apply();

    for (b, a) in before.iter().zip(positions(&slave)) {
        assert!((a - stretch(*b)).length() < 1e-9);
    }
}

#[test]
fn outside_vertices_fall_back_to_nearest() {
    let master = shared(unit_tetrahedron());
    let slave = shared(quad_grid(1, 1, 4.0, 4.0));
    let before = positions(&slave);

    let mut map = TetraTriangleMap::between(master.clone(), slave.clone()).unwrap();
    map.compute().unwrap();
    let entries = map.entries().unwrap();
    assert!(entries.iter().all(|e| !e.enclosed && e.tetrahedron == 0));
    assert_eq!(map.enclosing_tetrahedron(0), Some(0));

    let offset = DVec3::new(0.0, 0.0, 3.0);
    transform(&master, |p| p + offset);
    map.apply();
    for (b, a) in before.iter().zip(positions(&slave)) {
        assert!((a - (*b + offset)).length() < 1e-9);
    }
}

#[test]
fn apply_before_compute_is_noop() {
    let master = block();
    let slave = inner_sheet();
    let before = positions(&slave);

    let mut map = TetraTriangleMap::between(master.clone(), slave.clone()).unwrap();
    transform(&master, |p| p + DVec3::ONE);
    map.apply();
    assert_eq!(positions(&slave), before);
    assert!(!map.is_computed());
}

#[test]
fn shrunk_master_skips_apply() {
    let master = block();
    let slave = inner_sheet();
    let before = positions(&slave);

    let mut map = TetraTriangleMap::between(master.clone(), slave.clone()).unwrap();
    map.compute().unwrap();
    write_geometry(&master).positions_mut().truncate(3);
    map.apply();
    assert_eq!(positions(&slave), before);
}

#[test]
fn muted_map_does_not_apply() {
    let master = block();
    let slave = inner_sheet();
    let before = positions(&slave);

    let mut map = TetraTriangleMap::between(master.clone(), slave.clone()).unwrap();
    map.compute().unwrap();
    map.mute();
    assert!(!map.is_active());
    transform(&master, |p| p + DVec3::ONE);
    map.apply();
    assert_eq!(positions(&slave), before);

    map.activate();
    map.apply();
    assert_ne!(positions(&slave), before);
}

#[test]
fn wrong_master_kind_is_rejected() {
    let mut map = TetraTriangleMap::new();
    let err = map.set_master(inner_sheet()).unwrap_err();
    assert!(matches!(
        err,
        MedsimError::GeometryMismatch { expected: "TetrahedralMesh", found: "SurfaceMesh" }
    ));
    map.set_slave(inner_sheet()).unwrap();
    assert!(matches!(map.compute(), Err(MedsimError::MapNotReady(_))));
}

#[test]
fn wrong_slave_kind_is_rejected() {
    let mut map = TetraTriangleMap::new();
    map.set_master(block()).unwrap();
    assert!(map.set_slave(block()).is_err());
    assert!(matches!(map.compute(), Err(MedsimError::MapNotReady(_))));
}

// ─── TriangleToTetMap ─────────────────────────────────────────

#[test]
fn parent_tets_match_extraction() {
    let mesh = tet_grid(2, 1, 1, DVec3::new(2.0, 1.0, 1.0), DVec3::ZERO);
    let extraction = mesh.extract_surface().unwrap();
    let master = shared(mesh);
    let slave = shared(extraction.surface.clone());

    let mut map = TriangleToTetMap::between(master, slave).unwrap();
    map.compute().unwrap();

    assert_eq!(map.vertex_map().unwrap(), extraction.vertex_map.as_slice());
    for (f, &t) in extraction.parent_tetrahedra.iter().enumerate() {
        assert_eq!(map.get_parent_tet_id(f), Some(t));
    }
    assert_eq!(map.get_parent_tet_id(extraction.parent_tetrahedra.len()), None);
}

#[test]
fn triangle_to_tet_copies_positions() {
    let mesh = tet_grid(1, 1, 1, DVec3::ONE, DVec3::ZERO);
    let surface = mesh.extract_surface().unwrap().surface;
    let master = shared(mesh);
    let slave = shared(surface);

    let mut map = TriangleToTetMap::between(master.clone(), slave.clone()).unwrap();
    map.compute().unwrap();
    transform(&master, |p| p * 3.0);
    map.apply();

    let tet_positions = positions(&master);
    let vertex_map = map.vertex_map().unwrap().to_vec();
    for (s, p) in positions(&slave).into_iter().enumerate() {
        assert_eq!(p, tet_positions[vertex_map[s]]);
    }
}

#[test]
fn foreign_triangle_has_no_parent() {
    // Kuhn tetrahedra of a unit cube all contain the (0,0,0) and (1,1,1)
    // corners, so the triangle X, Y, Z is not a face of any of them.
    let master = shared(tet_grid(1, 1, 1, DVec3::ONE, DVec3::splat(0.5)));
    let slave = shared(
        SurfaceMesh::new(
            vec![DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0)],
            vec![[0, 1, 2], [3, 0, 4]],
        )
        .unwrap(),
    );
    let mut map = TriangleToTetMap::between(master, slave).unwrap();
    map.compute().unwrap();
    assert_eq!(map.get_parent_tet_id(0), None);
    assert_eq!(map.get_parent_tet_id(1), Some(0));
}

// ─── PointwiseMap ─────────────────────────────────────────────

#[test]
fn match_vertices_finds_permutation() {
    let master = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
    let slave = vec![DVec3::Y, DVec3::ZERO, DVec3::X];
    assert_eq!(match_vertices(&master, &slave, 1e-8).unwrap(), vec![2, 0, 1]);
}

#[test]
fn match_vertices_missing_point_fails() {
    let master = vec![DVec3::ZERO, DVec3::X];
    let slave = vec![DVec3::new(0.5, 0.0, 0.0)];
    assert!(matches!(
        match_vertices(&master, &slave, 1e-8),
        Err(MedsimError::InvalidMesh(_))
    ));
    assert!(match_vertices(&master, &slave, 0.0).is_err());
}

#[test]
fn pointwise_map_follows_master() {
    let master = shared(PointSet::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y]));
    let slave = shared(PointSet::new(vec![DVec3::Y, DVec3::ZERO]));

    let mut map = PointwiseMap::between(master.clone(), slave.clone()).unwrap();
    map.compute().unwrap();
    assert_eq!(map.master_vertex(0), Some(2));
    assert_eq!(map.master_vertex(1), Some(0));

    transform(&master, |p| p + DVec3::Z);
    map.apply();
    assert_eq!(positions(&slave), vec![DVec3::Y + DVec3::Z, DVec3::Z]);
}
