//! # Body acceleration target
//!
//! A PD law on the body pose and velocity error gives the acceleration the
//! stance legs should produce.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Vector3, Vector6};
use serde::Serialize;

use super::{Params, NUM_ACC_AXES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Desired body acceleration.
///
/// Frame: Control (yaw aligned, z up)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BodyAccelerationTarget {
    /// Units: meters/second^2
    pub linear: Vector3<f64>,

    /// Units: radians/second^2
    pub angular: Vector3<f64>,
}

/// Error between the desired and current body state, ordered
/// `[x, y, z, roll, pitch, yaw]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackingError {
    pub pos: Vector6<f64>,
    pub vel: Vector6<f64>,
}

/// The motion requested from the stance legs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DesiredMotion {
    /// Desired body velocity.
    ///
    /// Units: meters/second,
    /// Frame: Control
    pub speed_ms: Vector3<f64>,

    /// Desired yaw rate.
    ///
    /// Units: radians/second
    pub twisting_speed_rads: f64,

    /// Desired height of the body above the ground.
    ///
    /// Units: meters
    pub body_height_m: f64,
}

/// PD law mapping the tracking error onto a clamped acceleration target.
#[derive(Debug, Clone)]
pub struct AccelerationLaw {
    kp: Vector6<f64>,
    kd: Vector6<f64>,
    min_ddq: Vector6<f64>,
    max_ddq: Vector6<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BodyAccelerationTarget {
    pub fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.linear.x, self.linear.y, self.linear.z,
            self.angular.x, self.angular.y, self.angular.z,
        )
    }

    pub fn from_vector(v: &Vector6<f64>) -> Self {
        Self {
            linear: v.fixed_rows::<3>(0).into_owned(),
            angular: v.fixed_rows::<3>(3).into_owned(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|v| v.is_finite())
    }
}

impl TrackingError {
    /// Build the tracking error from the current and desired body state.
    ///
    /// - `com_target_m`: desired COM position relative to the current COM,
    ///   only x and y are used.
    /// - `body_height_m`: current body height above the ground.
    /// - `rpy_rad`: current attitude, `rpy_target_rad` the desired one. Yaw
    ///   is not tracked.
    /// - `velocity_ms`, `rate_rads`: current body velocity in the control
    ///   frame.
    pub fn new(
        desired: &DesiredMotion,
        com_target_m: &Vector3<f64>,
        body_height_m: f64,
        rpy_rad: &Vector3<f64>,
        rpy_target_rad: &Vector3<f64>,
        velocity_ms: &Vector3<f64>,
        rate_rads: &Vector3<f64>,
    ) -> Self {
        let pos = Vector6::new(
            com_target_m.x,
            com_target_m.y,
            desired.body_height_m - body_height_m,
            rpy_target_rad.x - rpy_rad.x,
            rpy_target_rad.y - rpy_rad.y,
            0.0,
        );

        let vel = Vector6::new(
            desired.speed_ms.x - velocity_ms.x,
            desired.speed_ms.y - velocity_ms.y,
            desired.speed_ms.z - velocity_ms.z,
            -rate_rads.x,
            -rate_rads.y,
            desired.twisting_speed_rads - rate_rads.z,
        );

        Self { pos, vel }
    }
}

impl DesiredMotion {
    /// Stand still at the given height.
    pub fn stand(body_height_m: f64) -> Self {
        Self {
            speed_ms: Vector3::zeros(),
            twisting_speed_rads: 0.0,
            body_height_m,
        }
    }
}

impl AccelerationLaw {
    pub fn new(params: &Params) -> Self {
        Self {
            kp: Vector6::from_row_slice(&params.kp),
            kd: Vector6::from_row_slice(&params.kd),
            min_ddq: Vector6::from_row_slice(&params.min_ddq),
            max_ddq: Vector6::from_row_slice(&params.max_ddq),
        }
    }

    /// Compute the acceleration target for a tracking error.
    ///
    /// Also returns which axes were limited by `min_ddq`/`max_ddq`.
    pub fn compute(&self, error: &TrackingError) -> (BodyAccelerationTarget, [bool; NUM_ACC_AXES]) {
        let raw = self.kp.component_mul(&error.pos) + self.kd.component_mul(&error.vel);

        let mut limited = [false; NUM_ACC_AXES];
        let mut acc = Vector6::zeros();

        for i in 0..NUM_ACC_AXES {
            acc[i] = util::maths::clamp(&raw[i], &self.min_ddq[i], &self.max_ddq[i]);
            limited[i] = acc[i] != raw[i];
        }

        (BodyAccelerationTarget::from_vector(&acc), limited)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pd_law() {
        let params = Params::default();
        let law = AccelerationLaw::new(&params);

        let desired = DesiredMotion {
            speed_ms: Vector3::new(0.1, 0.0, 0.0),
            twisting_speed_rads: 0.2,
            body_height_m: 0.30,
        };

        let error = TrackingError::new(
            &desired,
            &Vector3::zeros(),
            0.29,
            &Vector3::new(0.01, 0.0, 1.0),
            &Vector3::zeros(),
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.0, 0.1),
        );

        let (acc, limited) = law.compute(&error);

        assert!((acc.linear.x - 40.0 * 0.1).abs() < 1e-12);
        assert!((acc.linear.z - 100.0 * 0.01).abs() < 1e-9);
        assert!((acc.angular.x - -100.0 * 0.01).abs() < 1e-12);
        // Yaw angle is not tracked, only its rate
        assert!((acc.angular.z - 30.0 * 0.1).abs() < 1e-12);
        assert_eq!(limited, [false; NUM_ACC_AXES]);
    }

    #[test]
    fn test_clamped() {
        let params = Params::default();
        let law = AccelerationLaw::new(&params);

        let error = TrackingError {
            pos: Vector6::new(0.0, 0.0, 1.0, -1.0, 0.0, 0.0),
            vel: Vector6::new(5.0, -5.0, 0.0, 0.0, 0.0, 0.0),
        };

        let (acc, limited) = law.compute(&error);
        let v = acc.to_vector();

        for i in 0..NUM_ACC_AXES {
            assert!(v[i] <= params.max_ddq[i]);
            assert!(v[i] >= params.min_ddq[i]);
        }

        assert_eq!(v[0], params.max_ddq[0]);
        assert_eq!(v[1], params.min_ddq[1]);
        assert_eq!(v[2], params.max_ddq[2]);
        assert_eq!(v[3], params.min_ddq[3]);
        assert_eq!(limited, [true, true, true, true, false, false]);
    }
}
