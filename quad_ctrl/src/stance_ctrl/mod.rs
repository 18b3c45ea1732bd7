//! Stance leg control module
//!
//! Computes the ground reaction forces of the legs in contact with the ground
//! each cycle and converts them into joint torque commands:
//!
//! ```text
//! contacts, phase ----> RatioAllocator ---------------+
//!                                                     v
//! estimators, planners --> AccelerationLaw --> StanceForceSolver --> J^T --> MotorCommand[12]
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod body_acc;
mod force_solver;
mod params;
mod ratio;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use body_acc::*;
pub use force_solver::*;
pub use params::*;
pub use ratio::*;
pub use state::*;

use quad_if::NUM_LEGS;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of controlled body acceleration axes (3 linear, 3 angular).
pub const NUM_ACC_AXES: usize = 6;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during StanceCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum StanceCtrlError {
    #[error("Cannot load the stance control parameters: {0}")]
    Config(#[from] util::params::LoadError),

    #[error("Invalid stance control parameters: {0}")]
    InvalidParams(String),

    #[error("StanceCtrl must be reset before it can be updated")]
    NotReset,
}

/// Recoverable conditions raised during a StanceCtrl cycle.
///
/// None of these stop the cycle, they are recorded in the status report and
/// logged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, thiserror::Error)]
pub enum StanceCtrlWarning {
    #[error(
        "Stale or invalid {origin:?} data, holding the last good command for legs {legs:?}"
    )]
    StaleData {
        origin: DataOrigin,
        legs: [bool; NUM_LEGS],
    },

    #[error(
        "Requested body acceleration is not achievable (residual {residual:.4}, \
         converged: {converged}), using the closest feasible forces"
    )]
    InfeasibleSolve {
        residual: f64,
        converged: bool,
    },

    #[error(
        "Only {stance_legs} stance legs, {unresolved_axes} acceleration axes \
         are left uncorrected"
    )]
    DegenerateContact {
        stance_legs: usize,
        unresolved_axes: usize,
    },
}

/// The origin of a piece of input data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataOrigin {
    /// Robot IMU or observation timestamp.
    Robot,
    /// Kinematics of a single leg from the robot model.
    RobotLeg(usize),
    VelocityEstimator,
    GroundEstimator,
    ComPlanner,
    PosePlanner,
    FootholdPlanner,
    /// The computed command itself was not finite.
    Command,
}
