//! Graph coloring for parallel-safe constraint projection.
//!
//! Two constraints conflict if they reference a common particle. A valid
//! coloring puts conflicting constraints in different colors, so every
//! color class can be projected concurrently without write conflicts.

use std::collections::{HashMap, HashSet};

use medsim_types::PbdParticleId;

/// Greedy Welsh-Powell coloring of the constraint conflict graph.
///
/// `particle_sets[i]` lists the particles of constraint `i`. Constraints
/// are visited by descending conflict degree (ties keep input order) and
/// each takes the smallest color unused by its already-colored
/// neighbors. Returns one color per constraint.
pub fn color_constraints(particle_sets: &[&[PbdParticleId]]) -> Vec<usize> {
    let n = particle_sets.len();
    if n == 0 {
        return Vec::new();
    }

    // Build particle → constraint incidence
    let mut incidence: HashMap<PbdParticleId, Vec<usize>> = HashMap::new();
    for (c, particles) in particle_sets.iter().enumerate() {
        for &p in particles.iter() {
            let list = incidence.entry(p).or_default();
            if list.last() != Some(&c) {
                list.push(c);
            }
        }
    }

    // Build constraint-constraint conflict graph
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for touching in incidence.values() {
        for i in 0..touching.len() {
            for j in (i + 1)..touching.len() {
                adjacency[touching[i]].push(touching[j]);
                adjacency[touching[j]].push(touching[i]);
            }
        }
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| adjacency[b].len().cmp(&adjacency[a].len()));

    // Greedy assignment. `stamp[color] == c + 1` marks a color taken by a
    // neighbor of constraint `c`.
    let mut colors = vec![usize::MAX; n];
    let mut stamp: Vec<usize> = Vec::new();
    for &c in &order {
        for &neighbor in &adjacency[c] {
            let color = colors[neighbor];
            if color != usize::MAX {
                if color >= stamp.len() {
                    stamp.resize(color + 1, 0);
                }
                stamp[color] = c + 1;
            }
        }
        colors[c] = (0..).find(|&k| stamp.get(k) != Some(&(c + 1))).unwrap_or(0);
    }

    colors
}

/// True if no particle appears in two different sets.
pub fn is_vertex_disjoint(particle_sets: &[&[PbdParticleId]]) -> bool {
    let mut seen: HashSet<PbdParticleId> = HashSet::new();
    particle_sets.iter().all(|particles| {
        let own: HashSet<PbdParticleId> = particles.iter().copied().collect();
        own.into_iter().all(|p| seen.insert(p))
    })
}
