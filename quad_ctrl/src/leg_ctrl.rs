//! # Leg Controller Interface
//!
//! Every leg controller is driven the same way by the control loop: reset once when it takes
//! over the legs, updated once per cycle, and its action read back after the update.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use quad_if::collab::Collaborators;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A controller producing commands for the legs of the robot.
pub trait LegController {
    /// The commands produced by the controller.
    type Action;

    /// A report on each update.
    type Report;

    /// An error which prevents an update.
    type Error;

    /// Reset the controller, restarting its timer at `current_time_s`.
    fn reset(&mut self, current_time_s: f64);

    /// Run one control cycle, reading from the collaborators.
    ///
    /// The collaborators are only borrowed for the duration of the call.
    fn update(
        &mut self,
        current_time_s: f64,
        collab: &Collaborators<'_>,
    ) -> Result<Self::Report, Self::Error>;

    /// The action computed by the last successful update.
    fn get_action(&self) -> Self::Action;
}
