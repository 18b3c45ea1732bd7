//! # Estimator and Planner Interfaces
//!
//! All outputs are delivered as timestamped [`Sample`]s so that consumers can detect stale data.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{Sample, NUM_LEGS};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Estimated velocity of the body.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityEstimate {
    /// Linear velocity of the centre of mass.
    ///
    /// Units: meters/second,
    /// Frame: Control (yaw aligned, z up)
    pub linear_ms: Vector3<f64>,

    /// Angular velocity of the body.
    ///
    /// Units: radians/second,
    /// Frame: Control (yaw aligned, z up)
    pub angular_rads: Vector3<f64>,
}

/// Estimated ground plane under the robot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GroundEstimate {
    /// Rotation taking the control frame's z axis onto the estimated surface normal. The identity
    /// describes flat ground.
    pub attitude_q: UnitQuaternion<f64>,
}

/// An intermediate base pose target.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct BasePose {
    /// Desired roll, pitch and yaw of the base. Yaw is not tracked by stance control.
    ///
    /// Units: radians
    pub rpy_rad: Vector3<f64>,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Estimates the body velocity.
pub trait VelocityEstimator {
    fn velocity(&self) -> Sample<VelocityEstimate>;
}

/// Estimates the ground surface.
pub trait GroundEstimator {
    fn ground(&self) -> Sample<GroundEstimate>;
}

/// Plans the centre of mass position while in position locomotion.
pub trait ComPlanner {
    /// Desired offset of the centre of mass from its current position.
    ///
    /// Units: meters,
    /// Frame: Control
    fn com_offset(&self) -> Sample<Vector3<f64>>;
}

/// Plans the intermediate base pose.
pub trait PosePlanner {
    fn base_pose(&self) -> Sample<BasePose>;
}

/// Plans footholds for the legs.
pub trait FootholdPlanner {
    /// Planned foothold of each leg relative to the current centre of mass.
    ///
    /// Units: meters,
    /// Frame: Control
    fn footholds(&self) -> Sample<[Vector3<f64>; NUM_LEGS]>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelocityEstimate {
    pub fn is_finite(&self) -> bool {
        self.linear_ms.iter().chain(self.angular_rads.iter()).all(|v| v.is_finite())
    }
}

impl GroundEstimate {
    /// Flat ground.
    pub fn flat() -> Self {
        Self {
            attitude_q: UnitQuaternion::identity(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.attitude_q.coords.iter().all(|v| v.is_finite())
    }

    /// Unit normal of the ground plane in the control frame.
    pub fn normal(&self) -> Vector3<f64> {
        self.attitude_q * Vector3::z()
    }
}

impl Default for GroundEstimate {
    fn default() -> Self {
        Self::flat()
    }
}

impl BasePose {
    pub fn is_finite(&self) -> bool {
        self.rpy_rad.iter().all(|v| v.is_finite())
    }
}
