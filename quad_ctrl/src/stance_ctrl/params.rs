//! Parameters structure for StanceCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use super::{StanceCtrlError, NUM_ACC_AXES};
use quad_if::NUM_LEGS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Stance leg control.
///
/// 6-vectors are ordered `[x, y, z, roll, pitch, yaw]` in the control frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {

    // ---- BODY TRACKING ----

    /// Proportional gains on the body position and attitude error.
    pub kp: [f64; NUM_ACC_AXES],

    /// Derivative gains on the body linear and angular velocity error.
    pub kd: [f64; NUM_ACC_AXES],

    /// Maximum demanded body acceleration.
    ///
    /// Units: meters/second^2 (linear), radians/second^2 (angular)
    pub max_ddq: [f64; NUM_ACC_AXES],

    /// Minimum demanded body acceleration.
    ///
    /// Units: meters/second^2 (linear), radians/second^2 (angular)
    pub min_ddq: [f64; NUM_ACC_AXES],

    /// Weight of each acceleration axis in the force optimisation.
    pub acc_weight: [f64; NUM_ACC_AXES],

    // ---- LOAD SHARING ----

    /// Minimum load ratio of each leg while in contact.
    pub f_min_ratio: [f64; NUM_LEGS],

    /// Maximum load ratio of each leg while in contact.
    pub f_max_ratio: [f64; NUM_LEGS],

    /// Fraction of the stance phase, at each end, over which load is ramped
    /// in and out.
    pub ratio_ramp_width: f64,

    /// Fraction of the nominal load applied at touchdown and liftoff.
    pub ratio_ramp_floor: f64,

    // ---- BODY MODEL ----

    /// Mass of the whole robot.
    ///
    /// Units: kilograms
    pub body_mass_kg: f64,

    /// Rotational inertia of the body about the centre of mass, row major.
    ///
    /// Units: kilogram meters^2,
    /// Frame: Base
    pub body_inertia_kgm2: [[f64; 3]; 3],

    // ---- CONTACT ----

    /// Coulomb friction coefficient between the feet and the ground.
    pub friction_coeff: f64,

    /// Largest normal force a single foot may exert.
    ///
    /// Units: newtons
    pub max_normal_force_n: f64,

    // ---- SOLVER ----

    /// Weight of the term keeping each force close to its share of the body
    /// weight.
    pub reg_weight: f64,

    /// Iteration limit of the QP solver.
    pub solver_max_iter: u32,

    /// Achieved acceleration error above which the solve is reported as
    /// infeasible.
    ///
    /// Units: meters/second^2 and radians/second^2 (norm over all axes)
    pub infeasible_residual_tol: f64,

    // ---- COMMANDS ----

    /// Joint damping gain added to the torque commands of stance legs.
    pub stance_joint_kd: f64,

    // ---- DATA VALIDITY ----

    /// Age beyond which collaborator data is considered stale.
    ///
    /// Units: seconds
    pub stale_threshold_s: f64,

    // ---- MOTION ----

    /// Source of the centre of mass position target.
    pub locomotion_mode: LocomotionMode,

    /// Default desired body height above the ground.
    ///
    /// Units: meters
    pub desired_body_height_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Source of the centre of mass position target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocomotionMode {
    /// Walking gaits, the COM is kept over the centroid of the planned
    /// footholds of the stance legs.
    Walk,

    /// Position locomotion, the COM follows the COM planner's offset.
    Position,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {

    /// The body inertia as a matrix.
    pub fn body_inertia(&self) -> Matrix3<f64> {
        let i = &self.body_inertia_kgm2;
        Matrix3::new(
            i[0][0], i[0][1], i[0][2],
            i[1][0], i[1][1], i[1][2],
            i[2][0], i[2][1], i[2][2],
        )
    }

    /// Check that the parameters describe a usable controller.
    pub fn validate(&self) -> Result<(), StanceCtrlError> {
        let invalid = |msg: String| Err(StanceCtrlError::InvalidParams(msg));

        let all_finite = self.kp.iter()
            .chain(self.kd.iter())
            .chain(self.max_ddq.iter())
            .chain(self.min_ddq.iter())
            .chain(self.acc_weight.iter())
            .chain(self.f_min_ratio.iter())
            .chain(self.f_max_ratio.iter())
            .chain(self.body_inertia_kgm2.iter().flatten())
            .chain([
                self.ratio_ramp_width,
                self.ratio_ramp_floor,
                self.body_mass_kg,
                self.friction_coeff,
                self.max_normal_force_n,
                self.reg_weight,
                self.infeasible_residual_tol,
                self.stance_joint_kd,
                self.stale_threshold_s,
                self.desired_body_height_m,
            ].iter())
            .all(|v| v.is_finite());

        if !all_finite {
            return invalid("all parameters must be finite".into());
        }

        for i in 0..NUM_ACC_AXES {
            if self.min_ddq[i] > self.max_ddq[i] {
                return invalid(format!(
                    "min_ddq[{}] ({}) is greater than max_ddq[{}] ({})",
                    i, self.min_ddq[i], i, self.max_ddq[i]
                ));
            }
            if self.acc_weight[i] < 0.0 {
                return invalid(format!("acc_weight[{}] is negative", i));
            }
        }

        for i in 0..NUM_LEGS {
            if self.f_min_ratio[i] < 0.0 || self.f_min_ratio[i] > self.f_max_ratio[i] {
                return invalid(format!(
                    "expected 0 <= f_min_ratio[{}] <= f_max_ratio[{}], found {} and {}",
                    i, i, self.f_min_ratio[i], self.f_max_ratio[i]
                ));
            }
        }

        if !(0.0..=0.5).contains(&self.ratio_ramp_width) {
            return invalid("ratio_ramp_width must be between 0 and 0.5".into());
        }
        if !(0.0..=1.0).contains(&self.ratio_ramp_floor) {
            return invalid("ratio_ramp_floor must be between 0 and 1".into());
        }

        if self.body_mass_kg <= 0.0 {
            return invalid("body_mass_kg must be positive".into());
        }
        if self.body_inertia().try_inverse().is_none() {
            return invalid("body_inertia_kgm2 is not invertible".into());
        }

        if self.friction_coeff <= 0.0 {
            return invalid("friction_coeff must be positive".into());
        }
        if self.max_normal_force_n <= 0.0 {
            return invalid("max_normal_force_n must be positive".into());
        }
        if self.reg_weight <= 0.0 {
            return invalid("reg_weight must be positive".into());
        }
        if self.stale_threshold_s < 0.0 {
            return invalid("stale_threshold_s must not be negative".into());
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            kp: [0.0, 0.0, 100.0, 100.0, 100.0, 0.0],
            kd: [40.0, 30.0, 10.0, 10.0, 10.0, 30.0],
            max_ddq: [10.0, 10.0, 10.0, 20.0, 20.0, 20.0],
            min_ddq: [-10.0, -10.0, -10.0, -20.0, -20.0, -20.0],
            acc_weight: [1.0, 1.0, 1.0, 10.0, 10.0, 1.0],
            f_min_ratio: [0.01; NUM_LEGS],
            f_max_ratio: [1.0; NUM_LEGS],
            ratio_ramp_width: 0.1,
            ratio_ramp_floor: 0.5,
            body_mass_kg: 12.45,
            body_inertia_kgm2: [
                [0.068, 0.0, 0.0],
                [0.0, 0.228, 0.0],
                [0.0, 0.0, 0.256],
            ],
            friction_coeff: 0.45,
            max_normal_force_n: 300.0,
            reg_weight: 1e-4,
            solver_max_iter: 100,
            infeasible_residual_tol: 0.5,
            stance_joint_kd: 0.2,
            stale_threshold_s: 0.05,
            locomotion_mode: LocomotionMode::Walk,
            desired_body_height_m: 0.28,
        }
    }
}
