//! Strongly-typed identifiers for simulation entities.
//!
//! Constraints never hold references into vertex storage. They name
//! particles by `(body, vertex)` and resolve them through the body
//! registry on every solve, so buffers may grow or be rebuilt freely.

use serde::{Deserialize, Serialize};

/// Handle of a body in the PBD body registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// One particle of one co-simulated body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PbdParticleId {
    /// Owning body.
    pub body: BodyHandle,
    /// Vertex index inside the body's buffers.
    pub vertex: u32,
}

/// Identity of a constraint inside a constraint container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstraintId(pub u64);

impl BodyHandle {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl PbdParticleId {
    /// Creates a particle id from a body handle and a vertex index.
    #[inline]
    pub fn new(body: BodyHandle, vertex: usize) -> Self {
        Self {
            body,
            vertex: vertex as u32,
        }
    }

    /// Returns the vertex index as `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.vertex as usize
    }
}

impl From<u32> for BodyHandle {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<(u32, u32)> for PbdParticleId {
    fn from((body, vertex): (u32, u32)) -> Self {
        Self {
            body: BodyHandle(body),
            vertex,
        }
    }
}

/// Monotonic identifier source owned by a registry.
///
/// Each registry (body state, constraint container) carries its own
/// allocator, so identities are deterministic per instance.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Creates an allocator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused identifier.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of identifiers handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}
