//! Axis-aligned bounding boxes.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box given by componentwise min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// An inverted box that contains nothing; the identity for `grow`.
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Componentwise min/max of a point set.
    pub fn from_points(points: &[DVec3]) -> Self {
        points.iter().fold(Self::EMPTY, |b, &p| b.grow(p))
    }

    /// Returns the box extended to include `p`.
    #[inline]
    pub fn grow(self, p: DVec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Returns true if no point has been added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Containment test with an absolute tolerance on every face.
    #[inline]
    pub fn contains(&self, p: DVec3, tolerance: f64) -> bool {
        p.cmpge(self.min - DVec3::splat(tolerance)).all()
            && p.cmple(self.max + DVec3::splat(tolerance)).all()
    }

    /// Center of the box.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box.
    pub fn extents(&self) -> DVec3 {
        self.max - self.min
    }
}
