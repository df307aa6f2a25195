//! Contact ingestion.
//!
//! Collision detection is an external producer. It reports contacts as
//! pairs of barycentric points on two primitives; each pair becomes a
//! [`BaryPointToPointConstraint`] that pulls the two points to the
//! requested separation.

use medsim_types::PbdParticleId;
use serde::{Deserialize, Serialize};

use crate::constraint::PbdConstraint;
use crate::constraints::{BaryPointToPointConstraint, BarySide};

/// Type of contact between two primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    /// Vertex of body A against a triangle of body B.
    VertexTriangle,
    /// Edge of body A against an edge of body B.
    EdgeEdge,
    /// Vertex against vertex (stitching, grasping).
    PointPoint,
}

/// A detected contact between two primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactPair {
    pub contact_type: ContactType,
    pub side_a: BarySide,
    pub side_b: BarySide,
    /// Separation the response should restore between the two points.
    pub thickness: f64,
}

impl ContactPair {
    /// Vertex `vertex` against the point `Σ weights[i] · triangle[i]`.
    pub fn vertex_triangle(
        vertex: PbdParticleId,
        triangle: [PbdParticleId; 3],
        weights: [f64; 3],
    ) -> Self {
        Self {
            contact_type: ContactType::VertexTriangle,
            side_a: BarySide::vertex(vertex),
            side_b: BarySide::new(triangle.to_vec(), weights.to_vec()),
            thickness: 0.0,
        }
    }

    /// Closest points `a₀ + s (a₁ − a₀)` and `b₀ + t (b₁ − b₀)` of two edges.
    pub fn edge_edge(edge_a: [PbdParticleId; 2], s: f64, edge_b: [PbdParticleId; 2], t: f64) -> Self {
        Self {
            contact_type: ContactType::EdgeEdge,
            side_a: BarySide::new(edge_a.to_vec(), vec![1.0 - s, s]),
            side_b: BarySide::new(edge_b.to_vec(), vec![1.0 - t, t]),
            thickness: 0.0,
        }
    }

    pub fn point_point(a: PbdParticleId, b: PbdParticleId) -> Self {
        Self {
            contact_type: ContactType::PointPoint,
            side_a: BarySide::vertex(a),
            side_b: BarySide::vertex(b),
            thickness: 0.0,
        }
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness.max(0.0);
        self
    }

    /// Every particle on either side.
    pub fn particles(&self) -> impl Iterator<Item = PbdParticleId> + '_ {
        self.side_a
            .particles
            .iter()
            .chain(&self.side_b.particles)
            .copied()
    }

    /// The response constraint for this contact.
    pub fn to_constraint(&self, stiffness: f64) -> Box<dyn PbdConstraint> {
        Box::new(
            BaryPointToPointConstraint::new(self.side_a.clone(), self.side_b.clone(), stiffness)
                .with_rest_length(self.thickness),
        )
    }
}
