//! # Robot Interface
//!
//! The robot collaborator provides observation snapshots, including the leg kinematics computed
//! by the robot model for the latest joint angles, and accepts the motor commands for the cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{motor::MotorCommand, NUM_LEGS, NUM_MOTORS};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Observed state of the robot.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RobotState {
    /// Orientation of the base in the world frame, as measured by the IMU.
    pub base_attitude_q: UnitQuaternion<f64>,

    /// Angular rate of the base as measured by the IMU gyro.
    ///
    /// Units: radians/second,
    /// Frame: Base
    pub base_rate_rads: Vector3<f64>,

    /// Joint angles.
    ///
    /// Units: radians
    pub joint_pos_rad: [f64; NUM_MOTORS],

    /// Joint velocities.
    ///
    /// Units: radians/second
    pub joint_vel_rads: [f64; NUM_MOTORS],

    /// Position of each foot relative to the body centre of mass.
    ///
    /// Units: meters,
    /// Frame: Base
    pub foot_pos_m_b: [Vector3<f64>; NUM_LEGS],

    /// Jacobian of each foot position with respect to that leg's joint angles.
    ///
    /// Frame: Base
    pub foot_jacobian: [Matrix3<f64>; NUM_LEGS],

    /// Time the observation was made.
    ///
    /// Units: seconds
    pub timestamp_s: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Robot I/O and model.
pub trait Robot {
    /// The latest observed state of the robot.
    fn state(&self) -> RobotState;

    /// Set the commands to be sent to the motors.
    fn set_cmd(&mut self, cmds: &[MotorCommand; NUM_MOTORS]);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotState {
    /// True if the IMU part of the observation (attitude and rate) is finite.
    pub fn imu_is_finite(&self) -> bool {
        self.base_attitude_q.coords.iter().all(|v| v.is_finite())
            && self.base_rate_rads.iter().all(|v| v.is_finite())
    }

    /// True if the kinematic data for the given leg is finite.
    pub fn leg_is_finite(&self, leg: usize) -> bool {
        self.foot_pos_m_b[leg].iter().all(|v| v.is_finite())
            && self.foot_jacobian[leg].iter().all(|v| v.is_finite())
    }
}

impl Default for RobotState {
    fn default() -> Self {
        Self {
            base_attitude_q: UnitQuaternion::identity(),
            base_rate_rads: Vector3::zeros(),
            joint_pos_rad: [0.0; NUM_MOTORS],
            joint_vel_rads: [0.0; NUM_MOTORS],
            foot_pos_m_b: [Vector3::zeros(); NUM_LEGS],
            foot_jacobian: [Matrix3::identity(); NUM_LEGS],
            timestamp_s: 0.0,
        }
    }
}
