//! # Quadruped interface crate.
//!
//! Provides the interface types shared between the control modules and the
//! components they collaborate with (robot I/O, gait generator, estimators and
//! planners).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Motor command definitions
pub mod motor;

/// Gait generator interface (contact flags and phase)
pub mod gait;

/// Robot interface (observation snapshots and command sink)
pub mod robot;

/// Estimator and planner interfaces
pub mod plan;

/// Borrowed bundle of all collaborators for a control cycle
pub mod collab;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of legs on the robot.
pub const NUM_LEGS: usize = 4;

/// The number of motors in each leg (hip abduction, hip, knee).
pub const MOTORS_PER_LEG: usize = 3;

/// The total number of motors on the robot.
pub const NUM_MOTORS: usize = NUM_LEGS * MOTORS_PER_LEG;

/// Standard gravitational acceleration.
///
/// Units: meters/second^2
pub const GRAVITY_MSS: f64 = 9.81;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A value produced by a collaborator together with the time it was produced.
///
/// The timestamp uses the same clock as the `current_time_s` passed into the controllers.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sample<T> {
    /// The sampled value.
    pub value: T,

    /// The time at which the value was produced.
    ///
    /// Units: seconds
    pub timestamp_s: f64,
}

impl<T> Sample<T> {
    /// Create a new sample.
    pub fn new(value: T, timestamp_s: f64) -> Self {
        Self { value, timestamp_s }
    }

    /// Age of the sample at `current_time_s`, or `None` if the timestamp is not finite.
    pub fn age_s(&self, current_time_s: f64) -> Option<f64> {
        let age = current_time_s - self.timestamp_s;

        if age.is_finite() {
            Some(age)
        } else {
            None
        }
    }
}
