//! # Leg kinematics
//!
//! Forward kinematics of a three joint leg (hip abduction, hip, knee) with equal thigh and calf
//! lengths, laid out like a small electric quadruped.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Matrix3, Vector3};

use quad_if::{MOTORS_PER_LEG, NUM_LEGS};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Position of each hip joint relative to the centre of mass.
///
/// Units: meters,
/// Frame: Base
pub const HIP_OFFSETS_M: [[f64; 2]; NUM_LEGS] = [
    [0.1805, -0.047],
    [0.1805, 0.047],
    [-0.1805, -0.047],
    [-0.1805, 0.047],
];

/// Lateral offset from the hip abduction axis to the leg plane, positive for left legs.
///
/// Units: meters
pub const ABAD_LENGTH_M: f64 = 0.0838;

/// Units: meters
pub const THIGH_LENGTH_M: f64 = 0.2;

/// Units: meters
pub const CALF_LENGTH_M: f64 = 0.2;

/// Joint angles of every leg when standing.
///
/// Units: radians
pub const STANDING_JOINT_ANGLES_RAD: [f64; MOTORS_PER_LEG] = [0.0, 0.8, -1.6];

/// Joint angle step used to build the Jacobian.
const JACOBIAN_STEP_RAD: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Position of a foot relative to the centre of mass for the given joint angles.
///
/// Units: meters,
/// Frame: Base
pub fn foot_position(leg: usize, q: &[f64; MOTORS_PER_LEG]) -> Vector3<f64> {
    let side = if leg % 2 == 0 { -1.0 } else { 1.0 };
    let [abad, hip, knee] = *q;

    let leg_length = (THIGH_LENGTH_M.powi(2)
        + CALF_LENGTH_M.powi(2)
        + 2.0 * THIGH_LENGTH_M * CALF_LENGTH_M * knee.cos())
    .sqrt();
    let swing = hip + 0.5 * knee;

    let x = -leg_length * swing.sin();
    let y_leg = side * ABAD_LENGTH_M;
    let z_leg = -leg_length * swing.cos();

    Vector3::new(
        HIP_OFFSETS_M[leg][0] + x,
        HIP_OFFSETS_M[leg][1] + abad.cos() * y_leg - abad.sin() * z_leg,
        abad.sin() * y_leg + abad.cos() * z_leg,
    )
}

/// Jacobian of the foot position with respect to the leg's joint angles.
///
/// Frame: Base
pub fn foot_jacobian(leg: usize, q: &[f64; MOTORS_PER_LEG]) -> Matrix3<f64> {
    let mut jac = Matrix3::zeros();

    for j in 0..MOTORS_PER_LEG {
        let mut q_plus = *q;
        let mut q_minus = *q;
        q_plus[j] += JACOBIAN_STEP_RAD;
        q_minus[j] -= JACOBIAN_STEP_RAD;

        let col = (foot_position(leg, &q_plus) - foot_position(leg, &q_minus))
            / (2.0 * JACOBIAN_STEP_RAD);
        jac.set_column(j, &col);
    }

    jac
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standing_feet() {
        let q = STANDING_JOINT_ANGLES_RAD;

        let fr = foot_position(0, &q);
        let rl = foot_position(3, &q);

        assert_abs_diff_eq!(fr.x, 0.1805, epsilon = 1e-12);
        assert_abs_diff_eq!(fr.y, -0.047 - ABAD_LENGTH_M, epsilon = 1e-12);
        assert_abs_diff_eq!(fr.z, -0.2787, epsilon = 1e-4);
        assert_abs_diff_eq!(rl.y, 0.047 + ABAD_LENGTH_M, epsilon = 1e-12);
        assert_abs_diff_eq!(rl.z, fr.z, epsilon = 1e-12);
    }

    #[test]
    fn test_jacobian_matches_motion() {
        let q = [0.1, 0.7, -1.4];
        let dq = Vector3::new(1e-4, -2e-4, 1.5e-4);

        for leg in 0..NUM_LEGS {
            let jac = foot_jacobian(leg, &q);
            let moved = foot_position(leg, &[q[0] + dq.x, q[1] + dq.y, q[2] + dq.z]);
            let predicted = foot_position(leg, &q) + jac * dq;

            assert!((moved - predicted).norm() < 1e-7);
        }
    }
}
