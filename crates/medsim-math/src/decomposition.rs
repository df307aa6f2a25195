//! Matrix decompositions for constitutive models.
//!
//! Provides the rotation part of the polar decomposition F = R·S
//! needed by co-rotational FEM.

use glam::{DMat3, DQuat};

/// Result of a 3×3 polar decomposition: F = R · S
#[derive(Debug, Clone, Copy)]
pub struct PolarDecomposition {
    /// Rotation part (proper rotation, det = +1).
    pub rotation: DMat3,
    /// Stretch part S = Rᵀ F.
    pub stretch: DMat3,
}

/// Maximum rotation-extraction iterations.
const MAX_ITERATIONS: usize = 50;

/// Extracts the closest proper rotation to `f`.
///
/// Iterative quaternion update (Müller et al., "A Robust Method to Extract
/// the Rotational Part of Deformations"). Starting from `initial`, each step
/// rotates R toward the columns of F by the torque-like vector
/// `Σ r_i × f_i / |Σ r_i · f_i|`. Unlike Higham iteration this stays well
/// defined for singular and inverted F.
pub fn extract_rotation(f: &DMat3, initial: DQuat) -> DQuat {
    let mut q = initial;
    for _ in 0..MAX_ITERATIONS {
        let r = DMat3::from_quat(q);
        let omega = r.x_axis.cross(f.x_axis) + r.y_axis.cross(f.y_axis) + r.z_axis.cross(f.z_axis);
        let denom = (r.x_axis.dot(f.x_axis) + r.y_axis.dot(f.y_axis) + r.z_axis.dot(f.z_axis))
            .abs()
            + 1.0e-9;
        let omega = omega / denom;
        let angle = omega.length();
        if angle < 1.0e-9 {
            break;
        }
        q = (DQuat::from_axis_angle(omega / angle, angle) * q).normalize();
    }
    q
}

/// Polar decomposition F = R·S with R a proper rotation.
pub fn polar_decomposition(f: &DMat3) -> PolarDecomposition {
    let rotation = DMat3::from_quat(extract_rotation(f, DQuat::IDENTITY));
    PolarDecomposition {
        rotation,
        stretch: rotation.transpose() * *f,
    }
}
