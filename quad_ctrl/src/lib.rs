//! # Quadruped control library.
//!
//! This library allows other crates in the workspace to access the quadruped control modules.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Leg controller interface - the capabilities shared by all leg controllers
pub mod leg_ctrl;

/// Stance leg control module - converts the desired body motion into stance leg torques
pub mod stance_ctrl;

/// Simulation - static collaborators and leg kinematics for offline evaluation
pub mod sim;
