//! Barycentric weights for simplices.
//!
//! Tetrahedra use Cramer's rule on the homogeneous 4×4 vertex matrix:
//!
//! ```text
//!     | x0 x1 x2 x3 |
//! M = | y0 y1 y2 y3 |      w_i = det(M with column i := (p, 1)) / det(M)
//!     | z0 z1 z2 z3 |
//!     |  1  1  1  1 |
//! ```
//!
//! The homogeneous row makes the weights sum to one for any query point.
//! Points outside the simplex get at least one negative weight, which is
//! the basis of every inside/outside test in the toolkit.

use glam::{DMat4, DVec3};
use medsim_types::constants::DEGENERATE_VOLUME_THRESHOLD;

/// Barycentric weights of `p` with respect to tetrahedron `v`.
///
/// Returns `None` when the tetrahedron is degenerate (`|det| ≈ 0`); the
/// caller must then fall back to a nearest-element search.
///
/// # Example
/// ```
/// use medsim_math::{tetrahedron_weights, DVec3};
/// let tet = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
/// let w = tetrahedron_weights(&tet, DVec3::splat(0.25)).unwrap();
/// assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// ```
pub fn tetrahedron_weights(v: &[DVec3; 4], p: DVec3) -> Option<[f64; 4]> {
    let cols = [
        v[0].extend(1.0),
        v[1].extend(1.0),
        v[2].extend(1.0),
        v[3].extend(1.0),
    ];
    let det = DMat4::from_cols(cols[0], cols[1], cols[2], cols[3]).determinant();
    if det.abs() < DEGENERATE_VOLUME_THRESHOLD {
        return None;
    }

    let q = p.extend(1.0);
    let mut weights = [0.0; 4];
    for (i, w) in weights.iter_mut().enumerate() {
        let mut replaced = cols;
        replaced[i] = q;
        *w = DMat4::from_cols(replaced[0], replaced[1], replaced[2], replaced[3]).determinant()
            / det;
    }
    Some(weights)
}

/// Barycentric weights of `p` with respect to triangle `v`.
///
/// The point is implicitly projected onto the triangle's plane, so the
/// weights are the in-plane coordinates of that projection. Returns `None`
/// for a zero-area triangle.
pub fn triangle_weights(v: &[DVec3; 3], p: DVec3) -> Option<[f64; 3]> {
    let e0 = v[1] - v[0];
    let e1 = v[2] - v[0];
    let ep = p - v[0];

    let d00 = e0.dot(e0);
    let d01 = e0.dot(e1);
    let d11 = e1.dot(e1);
    let d20 = ep.dot(e0);
    let d21 = ep.dot(e1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < DEGENERATE_VOLUME_THRESHOLD {
        return None;
    }

    let w1 = (d11 * d20 - d01 * d21) / denom;
    let w2 = (d00 * d21 - d01 * d20) / denom;
    Some([1.0 - w1 - w2, w1, w2])
}

/// Signed volume of tetrahedron `(a, b, c, d)`.
///
/// Positive for right-handed winding; a negative value flags an
/// inverted element.
#[inline]
pub fn signed_tetrahedron_volume(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    (b - a).dot((c - a).cross(d - a)) / 6.0
}

/// Unsigned area of triangle `(a, b, c)`.
#[inline]
pub fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    0.5 * (b - a).cross(c - a).length()
}

/// Weighted sum `Σ w_i · v_i`.
#[inline]
pub fn interpolate(vertices: &[DVec3], weights: &[f64]) -> DVec3 {
    vertices
        .iter()
        .zip(weights)
        .fold(DVec3::ZERO, |acc, (&v, &w)| acc + v * w)
}
