//! # Collaborators
//!
//! Controllers never own the components they read from. The owner of the control loop lends them
//! out for the duration of a single cycle through this bundle, keeping mutable access to them
//! (for example to refresh the robot observation) between cycles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::{
    gait::GaitGenerator,
    plan::{ComPlanner, FootholdPlanner, GroundEstimator, PosePlanner, VelocityEstimator},
    robot::Robot,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Borrowed handles to every collaborator of a leg controller.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub robot: &'a dyn Robot,
    pub gait_generator: &'a dyn GaitGenerator,
    pub velocity_estimator: &'a dyn VelocityEstimator,
    pub ground_estimator: &'a dyn GroundEstimator,
    pub com_planner: &'a dyn ComPlanner,
    pub pose_planner: &'a dyn PosePlanner,
    pub foothold_planner: &'a dyn FootholdPlanner,
}
