//! Thread-safe constraint container with graph-coloring partitioning.
//!
//! The container owns every live constraint in exactly one of two places:
//! the sequential pool, or one partition bucket. Structural mutation
//! (add / remove / partition) goes through an internal mutex, so producers
//! such as contact generation or tearing may run on other threads. The
//! solver takes `&mut` access, which statically rules out mutation
//! during a solve pass.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use medsim_types::{ConstraintId, IdAllocator, PbdParticleId};
use tracing::debug;

use crate::coloring::color_constraints;
use crate::constraint::PbdConstraint;

/// A live constraint with its container-assigned identity.
#[derive(Debug)]
pub struct ConstraintEntry {
    pub id: ConstraintId,
    pub constraint: Box<dyn PbdConstraint>,
}

/// Outcome of [`PbdConstraintContainer::partition_constraints`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionSummary {
    /// Constraints left in the sequential pool.
    pub sequential: usize,
    /// Size of each kept partition bucket.
    pub partitions: Vec<usize>,
    /// Colors used before small buckets were dissolved.
    pub colors: usize,
}

#[derive(Debug, Default)]
struct Inner {
    constraints: Vec<ConstraintEntry>,
    partitions: Vec<Vec<ConstraintEntry>>,
    ids: IdAllocator,
}

impl Inner {
    /// Removes every entry matching `pred` from the pool and all buckets.
    fn remove_where(&mut self, mut pred: impl FnMut(&ConstraintEntry) -> bool) -> usize {
        let before = self.len();
        self.constraints.retain(|e| !pred(e));
        for bucket in &mut self.partitions {
            bucket.retain(|e| !pred(e));
        }
        self.partitions.retain(|bucket| !bucket.is_empty());
        before - self.len()
    }

    fn len(&self) -> usize {
        self.constraints.len() + self.partitions.iter().map(Vec::len).sum::<usize>()
    }

    /// Moves partitioned constraints back to the pool, after the pool's
    /// own entries.
    fn clear_partitions(&mut self) {
        for bucket in self.partitions.drain(..) {
            self.constraints.extend(bucket);
        }
    }
}

/// Collection of PBD constraints shared between producers and the solver.
#[derive(Debug, Default)]
pub struct PbdConstraintContainer {
    inner: Mutex<Inner>,
}

impl PbdConstraintContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The list is always left structurally valid, so a poisoned lock is
    /// recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a constraint to the sequential pool.
    pub fn add_constraint(&self, constraint: Box<dyn PbdConstraint>) -> ConstraintId {
        let mut inner = self.lock();
        let id = ConstraintId(inner.ids.allocate());
        inner.constraints.push(ConstraintEntry { id, constraint });
        id
    }

    /// Appends several constraints under one lock acquisition.
    pub fn add_constraints(
        &self,
        constraints: impl IntoIterator<Item = Box<dyn PbdConstraint>>,
    ) -> Vec<ConstraintId> {
        let mut inner = self.lock();
        constraints
            .into_iter()
            .map(|constraint| {
                let id = ConstraintId(inner.ids.allocate());
                inner.constraints.push(ConstraintEntry { id, constraint });
                id
            })
            .collect()
    }

    /// Removes one constraint, wherever it currently lives.
    ///
    /// Returns `false` if the id is not live.
    pub fn remove_constraint(&self, id: ConstraintId) -> bool {
        self.lock().remove_where(|e| e.id == id) > 0
    }

    /// Removes a set of constraints. Returns how many were live.
    pub fn remove_constraints(&self, ids: &HashSet<ConstraintId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.lock().remove_where(|e| ids.contains(&e.id))
    }

    /// Removes every constraint that references at least one particle in
    /// `particles`, from the pool and from every partition bucket.
    pub fn remove_constraints_by_vertices(&self, particles: &HashSet<PbdParticleId>) -> usize {
        if particles.is_empty() {
            return 0;
        }
        let removed = self.lock().remove_where(|e| {
            e.constraint
                .particles()
                .iter()
                .any(|p| particles.contains(p))
        });
        debug!(removed, "Removed constraints touching vertices");
        removed
    }

    /// Erases the pool entry at `index` and returns the index of the next
    /// entry, or `None` when the erased entry was the last one (or
    /// `index` was out of range).
    ///
    /// Supports removal while walking the pool:
    /// ```
    /// # use medsim_pbd::PbdConstraintContainer;
    /// # let container = PbdConstraintContainer::new();
    /// let mut cursor = (container.sequential_len() > 0).then_some(0);
    /// while let Some(i) = cursor {
    ///     cursor = container.erase_constraint(i);
    /// }
    /// ```
    pub fn erase_constraint(&self, index: usize) -> Option<usize> {
        let mut inner = self.lock();
        if index >= inner.constraints.len() {
            return None;
        }
        inner.constraints.remove(index);
        (index < inner.constraints.len()).then_some(index)
    }

    /// Keeps only the constraints for which `keep` returns true.
    pub fn retain(&self, mut keep: impl FnMut(&ConstraintEntry) -> bool) -> usize {
        self.lock().remove_where(|e| !keep(e))
    }

    /// Partitions all live constraints into vertex-disjoint buckets.
    ///
    /// 1. Existing buckets are merged back into the pool.
    /// 2. The conflict graph (constraints sharing a particle) is colored
    ///    greedily in Welsh-Powell order.
    /// 3. Each color becomes a bucket; buckets with fewer than
    ///    `min_partition_size` constraints are dissolved into the
    ///    sequential pool, which keeps container order.
    pub fn partition_constraints(&self, min_partition_size: usize) -> PartitionSummary {
        let mut inner = self.lock();
        inner.clear_partitions();

        let entries = std::mem::take(&mut inner.constraints);
        let colors = {
            let sets: Vec<&[PbdParticleId]> =
                entries.iter().map(|e| e.constraint.particles()).collect();
            color_constraints(&sets)
        };
        let n_colors = colors.iter().max().map_or(0, |&c| c + 1);

        let mut counts = vec![0usize; n_colors];
        for &c in &colors {
            counts[c] += 1;
        }

        let mut buckets: Vec<Vec<ConstraintEntry>> = (0..n_colors).map(|_| Vec::new()).collect();
        let mut pool = Vec::new();
        for (entry, color) in entries.into_iter().zip(colors) {
            if counts[color] >= min_partition_size {
                buckets[color].push(entry);
            } else {
                pool.push(entry);
            }
        }
        buckets.retain(|bucket| !bucket.is_empty());

        inner.constraints = pool;
        inner.partitions = buckets;

        let summary = PartitionSummary {
            sequential: inner.constraints.len(),
            partitions: inner.partitions.iter().map(Vec::len).collect(),
            colors: n_colors,
        };
        debug!(
            colors = summary.colors,
            partitions = summary.partitions.len(),
            sequential = summary.sequential,
            "Partitioned constraints"
        );
        summary
    }

    /// Moves every partitioned constraint back into the sequential pool.
    pub fn clear_partitions(&self) {
        self.lock().clear_partitions();
    }

    /// Drops every constraint.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.constraints.clear();
        inner.partitions.clear();
    }

    /// Number of live constraints.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of constraints in the sequential pool.
    pub fn sequential_len(&self) -> usize {
        self.lock().constraints.len()
    }

    /// Size of each partition bucket.
    pub fn partition_sizes(&self) -> Vec<usize> {
        self.lock().partitions.iter().map(Vec::len).collect()
    }

    pub fn contains(&self, id: ConstraintId) -> bool {
        let inner = self.lock();
        inner.constraints.iter().any(|e| e.id == id)
            || inner.partitions.iter().flatten().any(|e| e.id == id)
    }

    /// Runs `f` on the pool and the buckets under the lock.
    pub fn inspect<R>(
        &self,
        f: impl FnOnce(&[ConstraintEntry], &[Vec<ConstraintEntry>]) -> R,
    ) -> R {
        let inner = self.lock();
        f(&inner.constraints, &inner.partitions)
    }

    /// Lock-free access for the solver: `(pool, buckets)`.
    pub fn parts_mut(&mut self) -> (&mut Vec<ConstraintEntry>, &mut Vec<Vec<ConstraintEntry>>) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        (&mut inner.constraints, &mut inner.partitions)
    }
}
