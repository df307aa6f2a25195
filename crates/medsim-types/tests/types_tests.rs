//! Integration tests for medsim-types.

use medsim_types::{BodyHandle, ConstraintId, IdAllocator, MedsimError, PbdParticleId};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn particle_id_index() {
    let id = PbdParticleId::new(BodyHandle(2), 42);
    assert_eq!(id.index(), 42);
    assert_eq!(id.body.index(), 2);
}

#[test]
fn particle_id_from_tuple() {
    let id: PbdParticleId = (1, 7).into();
    assert_eq!(id, PbdParticleId::new(BodyHandle(1), 7));
}

#[test]
fn particle_ids_order_by_body_then_vertex() {
    let a = PbdParticleId::new(BodyHandle(0), 9);
    let b = PbdParticleId::new(BodyHandle(1), 0);
    assert!(a < b);
}

#[test]
fn allocator_is_per_instance() {
    let mut a = IdAllocator::new();
    let mut b = IdAllocator::new();
    assert_eq!(a.allocate(), 0);
    assert_eq!(a.allocate(), 1);
    assert_eq!(b.allocate(), 0);
    assert_eq!(a.allocated(), 2);
}

#[test]
fn ids_are_serializable() {
    let id = PbdParticleId::new(BodyHandle(3), 100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: PbdParticleId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);

    let cid = ConstraintId(5);
    let json = serde_json::to_string(&cid).unwrap();
    assert_eq!(serde_json::from_str::<ConstraintId>(&json).unwrap(), cid);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = MedsimError::InvalidMesh("cell 3 references vertex 99".into());
    assert!(err.to_string().contains("vertex 99"));
}

#[test]
fn geometry_mismatch_display() {
    let err = MedsimError::GeometryMismatch {
        expected: "TetrahedralMesh",
        found: "SurfaceMesh",
    };
    let msg = err.to_string();
    assert!(msg.contains("TetrahedralMesh"));
    assert!(msg.contains("SurfaceMesh"));
}
