//! Constant-density (position-based fluids) constraint.
//!
//! One constraint instance covers every particle of a fluid body. Each
//! projection rebuilds a uniform-grid neighbor table, estimates densities
//! with the poly6 kernel and corrects positions along the spiky kernel
//! gradient (Macklin & Müller, "Position Based Fluids").

use std::collections::HashMap;
use std::f64::consts::PI;

use medsim_math::DVec3;
use medsim_types::PbdParticleId;
use serde::{Deserialize, Serialize};

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, Correction, PbdConstraint, SolverType};

/// Fluid parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityParameters {
    /// Kernel support radius `h`.
    pub kernel_radius: f64,
    /// Regularization added to the denominator of every density
    /// multiplier (constraint-force mixing).
    pub relaxation: f64,
}

impl Default for DensityParameters {
    fn default() -> Self {
        Self {
            kernel_radius: 0.1,
            relaxation: 1.0e-3,
        }
    }
}

/// Poly6 / spiky kernels for a fixed support radius.
#[derive(Debug, Clone, Copy)]
struct Kernels {
    h: f64,
    h2: f64,
    poly6: f64,
    spiky_grad: f64,
}

impl Kernels {
    fn new(h: f64) -> Self {
        Self {
            h,
            h2: h * h,
            poly6: 315.0 / (64.0 * PI * h.powi(9)),
            spiky_grad: -45.0 / (PI * h.powi(6)),
        }
    }

    #[inline]
    fn w_poly6(&self, r: DVec3) -> f64 {
        let r2 = r.length_squared();
        if r2 >= self.h2 {
            return 0.0;
        }
        let d = self.h2 - r2;
        self.poly6 * d * d * d
    }

    #[inline]
    fn grad_spiky(&self, r: DVec3) -> DVec3 {
        let len = r.length();
        if len >= self.h || len <= 0.0 {
            return DVec3::ZERO;
        }
        let d = self.h - len;
        r * (self.spiky_grad * d * d / len)
    }
}

/// Neighbor lists from a uniform grid with cell size `h`.
fn neighbor_lists(positions: &[DVec3], h: f64) -> Vec<Vec<usize>> {
    let inv_cell = 1.0 / h;
    let key = |p: DVec3| (p * inv_cell).floor().as_i64vec3().to_array();

    let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
    for (i, &p) in positions.iter().enumerate() {
        grid.entry(key(p)).or_default().push(i);
    }

    let h2 = h * h;
    positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let [cx, cy, cz] = key(p);
            let mut neighbors = Vec::new();
            for dx in -1..=1_i64 {
                for dy in -1..=1_i64 {
                    for dz in -1..=1_i64 {
                        if let Some(cell) = grid.get(&[cx + dx, cy + dy, cz + dz]) {
                            neighbors.extend(
                                cell.iter()
                                    .copied()
                                    .filter(|&j| j != i && positions[j].distance_squared(p) < h2),
                            );
                        }
                    }
                }
            }
            neighbors
        })
        .collect()
}

/// Incompressibility constraint over a particle set.
///
/// The rest density is the mean kernel density of the rest
/// configuration, so the initial state is at equilibrium. Only
/// compression (`ρᵢ > ρ₀`) is corrected, which keeps free-surface
/// particles from clumping.
///
/// The correction is always the PBD update scaled by `min(stiffness, 1)`;
/// the solver type is ignored and no Lagrange multiplier accumulates.
#[derive(Debug, Clone)]
pub struct ConstantDensityConstraint {
    base: ConstraintBase,
    params: DensityParameters,
    kernels: Kernels,
    rest_density: f64,
}

impl ConstantDensityConstraint {
    pub fn new(
        particles: Vec<PbdParticleId>,
        rest: &[DVec3],
        params: DensityParameters,
        stiffness: f64,
    ) -> Self {
        let kernels = Kernels::new(params.kernel_radius);
        let rest_density = if rest.is_empty() {
            0.0
        } else {
            densities(rest, &neighbor_lists(rest, kernels.h), &kernels).iter().sum::<f64>()
                / rest.len() as f64
        };
        Self {
            base: ConstraintBase::new(particles, stiffness),
            params,
            kernels,
            rest_density,
        }
    }

    pub fn rest_density(&self) -> f64 {
        self.rest_density
    }

    pub fn parameters(&self) -> &DensityParameters {
        &self.params
    }

    fn current_positions(&self, state: &PbdState) -> Option<Vec<DVec3>> {
        self.base.particles.iter().map(|&id| state.position(id)).collect()
    }
}

fn densities(positions: &[DVec3], neighbors: &[Vec<usize>], kernels: &Kernels) -> Vec<f64> {
    positions
        .iter()
        .zip(neighbors)
        .map(|(&p, list)| {
            kernels.w_poly6(DVec3::ZERO)
                + list.iter().map(|&j| kernels.w_poly6(p - positions[j])).sum::<f64>()
        })
        .collect()
}

impl PbdConstraint for ConstantDensityConstraint {
    fn name(&self) -> &'static str {
        "ConstantDensity"
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    /// Aggregate value: the largest relative compression `max(ρᵢ/ρ₀ − 1, 0)`.
    /// The per-particle gradients are not stored; projection goes through
    /// `compute_correction`.
    fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
        if self.rest_density <= 0.0 {
            return None;
        }
        let positions = self.current_positions(state)?;
        let neighbors = neighbor_lists(&positions, self.kernels.h);
        let rho = densities(&positions, &neighbors, &self.kernels);
        Some(
            rho.iter()
                .map(|&r| (r / self.rest_density - 1.0).max(0.0))
                .fold(0.0, f64::max),
        )
    }

    fn compute_correction(
        &mut self,
        state: &PbdState,
        _dt: f64,
        _solver: SolverType,
    ) -> Option<Correction> {
        if self.rest_density <= 0.0 || self.base.stiffness() <= 0.0 {
            return None;
        }
        let positions = self.current_positions(state)?;
        let neighbors = neighbor_lists(&positions, self.kernels.h);
        let rho = densities(&positions, &neighbors, &self.kernels);
        let inv_rho0 = 1.0 / self.rest_density;

        let lambdas: Vec<f64> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let c = (rho[i] * inv_rho0 - 1.0).max(0.0);
                if c == 0.0 {
                    return 0.0;
                }
                let mut grad_i = DVec3::ZERO;
                let mut sum_sq = 0.0;
                for &j in &neighbors[i] {
                    let g = self.kernels.grad_spiky(p - positions[j]) * inv_rho0;
                    grad_i += g;
                    sum_sq += g.length_squared();
                }
                sum_sq += grad_i.length_squared();
                -c / (sum_sq + self.params.relaxation)
            })
            .collect();

        let scale = self.base.stiffness().min(1.0) * inv_rho0;
        Some(
            self.base
                .particles
                .iter()
                .enumerate()
                .filter(|&(_, &id)| state.inv_mass(id).is_some_and(|w| w > 0.0))
                .filter_map(|(i, &id)| {
                    let delta = neighbors[i]
                        .iter()
                        .map(|&j| {
                            self.kernels.grad_spiky(positions[i] - positions[j])
                                * (lambdas[i] + lambdas[j])
                        })
                        .sum::<DVec3>()
                        * scale;
                    (delta != DVec3::ZERO).then_some((id, delta))
                })
                .collect(),
        )
    }
}
