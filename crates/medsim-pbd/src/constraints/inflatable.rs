//! Distance and volume constraints with time-varying rest values.
//!
//! An inflatable constraint can be pushed away from its initial rest
//! value and stiffness (e.g. tissue swelling under injection). Before
//! every projection both quantities relax back toward their initial
//! values by `diffusion_rate · dt` of the remaining gap; the projection
//! itself is the regular one.

use medsim_math::DVec3;
use medsim_types::PbdParticleId;

use crate::body::PbdState;
use crate::constraint::{ConstraintBase, Correction, PbdConstraint, SolverType};
use crate::constraints::{DistanceConstraint, VolumeConstraint};

/// Relaxation state shared by the inflatable kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inflation {
    pub initial_rest_value: f64,
    pub initial_stiffness: f64,
    pub diffusion_rate: f64,
    pub inflated: bool,
}

impl Inflation {
    fn new(initial_rest_value: f64, initial_stiffness: f64, diffusion_rate: f64) -> Self {
        Self {
            initial_rest_value,
            initial_stiffness,
            diffusion_rate,
            inflated: false,
        }
    }

    /// Relaxes `(rest, stiffness)` toward their initial values.
    fn relax(&self, rest: f64, stiffness: f64, dt: f64) -> (f64, f64) {
        let t = (self.diffusion_rate * dt).clamp(0.0, 1.0);
        (
            rest + (self.initial_rest_value - rest) * t,
            stiffness + (self.initial_stiffness - stiffness) * t,
        )
    }
}

macro_rules! inflatable_common {
    ($ty:ident, $inner:ty, $name:literal, $get:ident, $set:ident) => {
        impl $ty {
            pub fn inflation(&self) -> &Inflation {
                &self.inflation
            }

            pub fn inner(&self) -> &$inner {
                &self.inner
            }

            pub fn set_diffusion_rate(&mut self, rate: f64) {
                self.inflation.diffusion_rate = rate.max(0.0);
            }

            /// Overrides the rest value; it then diffuses back over time.
            pub fn set_rest_value(&mut self, rest: f64) {
                self.inner.$set(rest);
                self.inflation.inflated = true;
            }

            pub fn rest_value(&self) -> f64 {
                self.inner.$get()
            }

            /// Restores the initial rest value and stiffness immediately.
            pub fn reset_rest_value(&mut self) {
                self.inner.$set(self.inflation.initial_rest_value);
                self.inner.set_stiffness(self.inflation.initial_stiffness);
                self.inflation.inflated = false;
            }

            fn relax(&mut self, dt: f64) {
                if !self.inflation.inflated {
                    return;
                }
                let (rest, stiffness) =
                    self.inflation
                        .relax(self.inner.$get(), self.inner.stiffness(), dt);
                self.inner.$set(rest);
                self.inner.set_stiffness(stiffness);
            }
        }

        impl PbdConstraint for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn base(&self) -> &ConstraintBase {
                self.inner.base()
            }

            fn base_mut(&mut self) -> &mut ConstraintBase {
                self.inner.base_mut()
            }

            fn compute_value_and_gradient(&mut self, state: &PbdState) -> Option<f64> {
                self.inner.compute_value_and_gradient(state)
            }

            fn compute_correction(
                &mut self,
                state: &PbdState,
                dt: f64,
                solver: SolverType,
            ) -> Option<Correction> {
                self.relax(dt);
                self.inner.compute_correction(state, dt, solver)
            }

            fn set_stiffness(&mut self, stiffness: f64) {
                self.inner.set_stiffness(stiffness);
                self.inflation.inflated = true;
            }
        }
    };
}

/// Distance constraint whose rest length can be inflated.
#[derive(Debug, Clone)]
pub struct InflatableDistanceConstraint {
    inner: DistanceConstraint,
    inflation: Inflation,
}

impl InflatableDistanceConstraint {
    pub fn new(
        particles: [PbdParticleId; 2],
        rest: [DVec3; 2],
        stiffness: f64,
        diffusion_rate: f64,
    ) -> Self {
        let inner = DistanceConstraint::new(particles, rest, stiffness);
        let inflation = Inflation::new(inner.rest_length(), stiffness, diffusion_rate);
        Self { inner, inflation }
    }
}

inflatable_common!(
    InflatableDistanceConstraint,
    DistanceConstraint,
    "InflatableDistance",
    rest_length,
    set_rest_length
);

/// Volume constraint whose rest volume can be inflated.
#[derive(Debug, Clone)]
pub struct InflatableVolumeConstraint {
    inner: VolumeConstraint,
    inflation: Inflation,
}

impl InflatableVolumeConstraint {
    pub fn new(
        particles: [PbdParticleId; 4],
        rest: [DVec3; 4],
        stiffness: f64,
        diffusion_rate: f64,
    ) -> Self {
        let inner = VolumeConstraint::new(particles, rest, stiffness);
        let inflation = Inflation::new(inner.rest_volume(), stiffness, diffusion_rate);
        Self { inner, inflation }
    }
}

inflatable_common!(
    InflatableVolumeConstraint,
    VolumeConstraint,
    "InflatableVolume",
    rest_volume,
    set_rest_volume
);
