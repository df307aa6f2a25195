//! Integration tests for medsim-math.

use medsim_math::barycentric::interpolate;
use medsim_math::decomposition::polar_decomposition;
use medsim_math::query::weights_enclose;
use medsim_math::{
    find_enclosing_element, find_nearest_element, signed_tetrahedron_volume, tetrahedron_weights,
    triangle_area, triangle_weights, Aabb, DMat3, DQuat, DVec3, Simplex,
};

fn unit_tet() -> [DVec3; 4] {
    [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z]
}

fn skewed_tet() -> [DVec3; 4] {
    [
        DVec3::new(0.3, -0.2, 0.1),
        DVec3::new(1.7, 0.4, -0.3),
        DVec3::new(0.2, 1.9, 0.5),
        DVec3::new(0.6, 0.1, 2.2),
    ]
}

// ─── Barycentric Weights ──────────────────────────────────────

#[test]
fn tet_weights_recover_combination() {
    let tet = skewed_tet();
    let expected = [0.1, 0.2, 0.3, 0.4];
    let p = interpolate(&tet, &expected);
    let w = tetrahedron_weights(&tet, p).unwrap();
    for i in 0..4 {
        assert!((w[i] - expected[i]).abs() < 1e-9, "w[{i}] = {}", w[i]);
    }
}

#[test]
fn tet_weights_sum_to_one_outside() {
    let tet = skewed_tet();
    let p = DVec3::new(5.0, -3.0, 7.0);
    let w = tetrahedron_weights(&tet, p).unwrap();
    assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(w.iter().any(|&x| x < 0.0));
    assert!(!weights_enclose(&w));
}

#[test]
fn tet_weights_at_vertex() {
    let tet = skewed_tet();
    let w = tetrahedron_weights(&tet, tet[2]).unwrap();
    assert!((w[2] - 1.0).abs() < 1e-12);
    assert!(w[0].abs() < 1e-12 && w[1].abs() < 1e-12 && w[3].abs() < 1e-12);
}

#[test]
fn degenerate_tet_has_no_weights() {
    let flat = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)];
    assert!(tetrahedron_weights(&flat, DVec3::splat(0.1)).is_none());
}

#[test]
fn triangle_weights_recover_combination() {
    let tri = [
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::new(2.0, 0.5, 1.0),
        DVec3::new(0.5, 1.5, 1.2),
    ];
    let expected = [0.5, 0.25, 0.25];
    let p = interpolate(&tri, &expected);
    let w = triangle_weights(&tri, p).unwrap();
    for i in 0..3 {
        assert!((w[i] - expected[i]).abs() < 1e-9);
    }
}

#[test]
fn triangle_weights_project_off_plane_points() {
    let tri = [DVec3::ZERO, DVec3::X, DVec3::Y];
    let w = triangle_weights(&tri, DVec3::new(0.25, 0.25, 3.0)).unwrap();
    assert!((w[0] - 0.5).abs() < 1e-12);
    assert!((w[1] - 0.25).abs() < 1e-12);
    assert!((w[2] - 0.25).abs() < 1e-12);
}

#[test]
fn degenerate_triangle_has_no_weights() {
    let line = [DVec3::ZERO, DVec3::X, DVec3::X * 2.0];
    assert!(triangle_weights(&line, DVec3::Y).is_none());
}

// ─── Volumes and Areas ────────────────────────────────────────

#[test]
fn unit_tet_volume() {
    let [a, b, c, d] = unit_tet();
    assert!((signed_tetrahedron_volume(a, b, c, d) - 1.0 / 6.0).abs() < 1e-15);
    assert!((signed_tetrahedron_volume(a, c, b, d) + 1.0 / 6.0).abs() < 1e-15);
}

#[test]
fn right_triangle_area() {
    assert!((triangle_area(DVec3::ZERO, DVec3::X, DVec3::Y) - 0.5).abs() < 1e-15);
}

// ─── Bounding Boxes ───────────────────────────────────────────

#[test]
fn aabb_from_points() {
    let b = Aabb::from_points(&skewed_tet());
    assert_eq!(b.min, DVec3::new(0.2, -0.2, -0.3));
    assert_eq!(b.max, DVec3::new(1.7, 1.9, 2.2));
    assert!(b.contains(DVec3::new(1.0, 1.0, 1.0), 0.0));
    assert!(!b.contains(DVec3::new(1.0, 1.0, 2.3), 0.0));
    assert!(b.contains(DVec3::new(1.0, 1.0, 2.3), 0.2));
}

#[test]
fn empty_aabb() {
    assert!(Aabb::EMPTY.is_empty());
    assert!(!Aabb::from_points(&[DVec3::ZERO]).is_empty());
}

// ─── Element Search ───────────────────────────────────────────

#[test]
fn enclosing_element_is_first_match() {
    let a = unit_tet();
    let b = unit_tet();
    let far = [DVec3::splat(10.0), DVec3::new(11.0, 10.0, 10.0), DVec3::new(10.0, 11.0, 10.0), DVec3::new(10.0, 10.0, 11.0)];
    let p = DVec3::splat(0.1);
    let found = find_enclosing_element(vec![(7, far), (3, a), (5, b)], p).unwrap();
    assert_eq!(found.0, 3);
    assert!((found.1.iter().sum::<f64>() - 1.0).abs() < 1e-12);
}

#[test]
fn no_enclosing_element_outside() {
    let p = DVec3::splat(2.0);
    assert!(find_enclosing_element(vec![(0, unit_tet())], p).is_none());
}

#[test]
fn boundary_point_is_enclosed() {
    let p = DVec3::new(0.5, 0.5, 0.0);
    assert!(find_enclosing_element(vec![(0, unit_tet())], p).is_some());
}

#[test]
fn nearest_element_by_centroid() {
    let near = unit_tet();
    let far = unit_tet().map(|v| v + DVec3::splat(5.0));
    let p = DVec3::splat(3.5);
    assert_eq!(find_nearest_element(vec![(0, near), (1, far)], p), Some(1));
    assert_eq!(find_nearest_element(Vec::<(usize, [DVec3; 4])>::new(), p), None);
}

#[test]
fn simplex_centroid() {
    let c = unit_tet().centroid();
    assert!((c - DVec3::splat(0.25)).length() < 1e-15);
}

// ─── Polar Decomposition ──────────────────────────────────────

#[test]
fn polar_identity() {
    let pd = polar_decomposition(&DMat3::IDENTITY);
    assert!(pd.rotation.abs_diff_eq(DMat3::IDENTITY, 1e-9));
    assert!(pd.stretch.abs_diff_eq(DMat3::IDENTITY, 1e-9));
}

#[test]
fn polar_recovers_rotation() {
    let r = DMat3::from_quat(DQuat::from_axis_angle(DVec3::new(1.0, 2.0, 0.5).normalize(), 0.7));
    let s = DMat3::from_diagonal(DVec3::new(2.0, 1.0, 0.5));
    let pd = polar_decomposition(&(r * s));
    assert!(pd.rotation.abs_diff_eq(r, 1e-6));
    assert!(pd.stretch.abs_diff_eq(s, 1e-6));
}

#[test]
fn polar_rotation_is_proper_for_inverted_input() {
    let f = DMat3::from_diagonal(DVec3::new(1.0, 1.0, -0.5));
    let pd = polar_decomposition(&f);
    assert!((pd.rotation.determinant() - 1.0).abs() < 1e-9);
}
