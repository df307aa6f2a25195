//! Enclosing and nearest element search.
//!
//! Candidates are `(element_index, simplex)` pairs. Callers are expected
//! to pre-filter candidates by bounding box; the search itself only runs
//! the barycentric test.

use glam::DVec3;
use medsim_types::constants::INSIDE_TOLERANCE;

use crate::barycentric::{tetrahedron_weights, triangle_weights};
use crate::bounds::Aabb;

/// A triangle or tetrahedron given by its vertex positions.
pub trait Simplex {
    /// Fixed-size weight array, one entry per vertex.
    type Weights: AsRef<[f64]> + Copy;

    /// Barycentric weights of `p`, or `None` if the simplex is degenerate.
    fn barycentric_weights(&self, p: DVec3) -> Option<Self::Weights>;

    /// Vertex average.
    fn centroid(&self) -> DVec3;

    /// Componentwise bounds of the vertices.
    fn bounding_box(&self) -> Aabb;
}

impl Simplex for [DVec3; 3] {
    type Weights = [f64; 3];

    fn barycentric_weights(&self, p: DVec3) -> Option<[f64; 3]> {
        triangle_weights(self, p)
    }

    fn centroid(&self) -> DVec3 {
        (self[0] + self[1] + self[2]) / 3.0
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self)
    }
}

impl Simplex for [DVec3; 4] {
    type Weights = [f64; 4];

    fn barycentric_weights(&self, p: DVec3) -> Option<[f64; 4]> {
        tetrahedron_weights(self, p)
    }

    fn centroid(&self) -> DVec3 {
        (self[0] + self[1] + self[2] + self[3]) * 0.25
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self)
    }
}

/// True when every weight is non-negative (up to `INSIDE_TOLERANCE`).
#[inline]
pub fn weights_enclose(weights: &[f64]) -> bool {
    weights.iter().all(|&w| w >= -INSIDE_TOLERANCE)
}

/// First candidate whose barycentric weights for `p` are all non-negative.
///
/// Degenerate candidates are skipped. Overlapping elements resolve to the
/// first one in iteration order.
pub fn find_enclosing_element<S, I>(candidates: I, p: DVec3) -> Option<(usize, S::Weights)>
where
    S: Simplex,
    I: IntoIterator<Item = (usize, S)>,
{
    candidates.into_iter().find_map(|(index, simplex)| {
        simplex
            .barycentric_weights(p)
            .filter(|w| weights_enclose(w.as_ref()))
            .map(|w| (index, w))
    })
}

/// Element whose centroid is closest to `p`. Ties keep the earliest element.
pub fn find_nearest_element<S, I>(elements: I, p: DVec3) -> Option<usize>
where
    S: Simplex,
    I: IntoIterator<Item = (usize, S)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, simplex) in elements {
        let d2 = simplex.centroid().distance_squared(p);
        if best.map_or(true, |(_, bd)| d2 < bd) {
            best = Some((index, d2));
        }
    }
    best.map(|(index, _)| index)
}
