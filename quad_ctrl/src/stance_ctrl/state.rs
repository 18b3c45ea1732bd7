//! Implementations for the StanceCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use nalgebra::{Matrix3x4, Vector3};
use serde::Serialize;
use std::path::Path;

// Internal
use super::{
    AccelerationLaw, BodyAccelerationTarget, DataOrigin, DesiredMotion, LoadRatio,
    LocomotionMode, Params, RatioAllocator, SolveStatus, StanceCtrlError, StanceCtrlWarning,
    StanceForceSolver, TrackingError, leg_torques, NUM_ACC_AXES,
};
use crate::leg_ctrl::LegController;
use quad_if::{
    collab::Collaborators,
    gait::ContactState,
    motor::MotorCommand,
    plan::{BasePose, GroundEstimate, VelocityEstimate},
    robot::RobotState,
    Sample, MOTORS_PER_LEG, NUM_LEGS, NUM_MOTORS,
};
use util::{
    convert::Convert,
    maths::{all_finite, roll_pitch_only, rpy},
    module::State,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Stance leg control module state
pub struct StanceLegController {
    params: Params,

    ratio_alloc: RatioAllocator,
    acc_law: AccelerationLaw,
    solver: StanceForceSolver,

    desired: DesiredMotion,

    mode: Mode,
    reset_time_s: f64,
    time_since_reset_s: f64,

    /// The last computed action, only ever holds finite commands.
    action: Action,

    report: StatusReport,
}

/// Data needed to initialise the controller.
#[derive(Debug, Clone)]
pub struct InitData {
    pub params: Params,
    pub desired: DesiredMotion,
}

/// Input data to Stance Control, a snapshot of every collaborator's output
/// for one cycle.
#[derive(Debug, Clone)]
pub struct InputData {
    /// Units: seconds
    pub current_time_s: f64,

    pub robot: RobotState,
    pub contact: ContactState,
    pub velocity: Sample<VelocityEstimate>,
    pub ground: Sample<GroundEstimate>,
    pub com_offset: Sample<Vector3<f64>>,
    pub base_pose: Sample<BasePose>,
    pub footholds: Sample<[Vector3<f64>; NUM_LEGS]>,
}

/// Output of Stance Control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Action {
    /// Commands for all motors. Swing legs get the default command, to be
    /// replaced by the swing controller's.
    pub commands: [MotorCommand; NUM_MOTORS],

    /// Desired ground reaction force of each leg, one column per leg.
    ///
    /// Units: newtons,
    /// Frame: Control
    pub contact_forces: Matrix3x4<f64>,

    /// Legs which were treated as stance legs.
    pub stance: [bool; NUM_LEGS],
}

/// Status report for StanceCtrl processing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    pub time_since_reset_s: f64,

    /// Legs the force solve was run for.
    pub solved_legs: [bool; NUM_LEGS],

    /// Legs which kept their previous command this cycle.
    pub held_legs: [bool; NUM_LEGS],

    pub ratio: LoadRatio,

    pub acc_target: BodyAccelerationTarget,
    pub acc_limited: [bool; NUM_ACC_AXES],

    /// `None` if the cycle was skipped.
    pub solve_status: Option<SolveStatus>,
    pub degenerate_axes: usize,
    pub residual: f64,
    pub clamped_legs: [bool; NUM_LEGS],

    pub warnings: Vec<StanceCtrlWarning>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// Constructed but never reset, updates are refused.
    Uninitialised,

    /// Reset, waiting for the first update.
    Ready,

    /// Running.
    Active,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputData {
    /// Read the outputs of all collaborators for this cycle.
    pub fn snapshot(current_time_s: f64, collab: &Collaborators<'_>) -> Self {
        Self {
            current_time_s,
            robot: collab.robot.state(),
            contact: collab.gait_generator.contact_state(),
            velocity: collab.velocity_estimator.velocity(),
            ground: collab.ground_estimator.ground(),
            com_offset: collab.com_planner.com_offset(),
            base_pose: collab.pose_planner.base_pose(),
            footholds: collab.foothold_planner.footholds(),
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Self {
            commands: [MotorCommand::default(); NUM_MOTORS],
            contact_forces: Matrix3x4::zeros(),
            stance: [false; NUM_LEGS],
        }
    }
}

impl Action {
    /// Combine with the commands of a swing controller, which are used for
    /// every leg not in stance.
    pub fn merge_swing(&self, swing: &[MotorCommand; NUM_MOTORS]) -> [MotorCommand; NUM_MOTORS] {
        let mut out = self.commands;

        for leg in 0..NUM_LEGS {
            if !self.stance[leg] {
                let m = leg * MOTORS_PER_LEG;
                out[m..m + MOTORS_PER_LEG].copy_from_slice(&swing[m..m + MOTORS_PER_LEG]);
            }
        }

        out
    }
}

impl State for StanceLegController {
    type InitData = InitData;
    type InitError = StanceCtrlError;

    type InputData = InputData;
    type OutputData = Action;
    type StatusReport = StatusReport;
    type ProcError = StanceCtrlError;

    /// Initialise the StanceCtrl module.
    ///
    /// The parameters are validated and fixed for the life of the
    /// controller.
    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        let params = init_data.params;
        params.validate()?;

        Ok(Self {
            ratio_alloc: RatioAllocator::new(&params),
            acc_law: AccelerationLaw::new(&params),
            solver: StanceForceSolver::new(&params)?,
            desired: init_data.desired,
            mode: Mode::Uninitialised,
            reset_time_s: 0.0,
            time_since_reset_s: 0.0,
            action: Action::default(),
            report: StatusReport::default(),
            params,
        })
    }

    /// Perform cyclic processing of Stance Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if self.mode == Mode::Uninitialised {
            return Err(StanceCtrlError::NotReset);
        }
        if self.mode == Mode::Ready {
            debug!("StanceCtrl active");
            self.mode = Mode::Active;
        }

        self.time_since_reset_s = input_data.current_time_s - self.reset_time_s;

        // Clear the status report
        self.report = StatusReport {
            time_since_reset_s: self.time_since_reset_s,
            ..StatusReport::default()
        };

        let stance = input_data.contact.contacts;

        // Body level data problems hold every leg
        if let Some(origin) = self.invalid_body_data(input_data) {
            self.report.held_legs = [true; NUM_LEGS];
            self.raise(StanceCtrlWarning::StaleData {
                origin,
                legs: [true; NUM_LEGS],
            });

            return Ok((self.action, self.report.clone()));
        }

        // Legs with bad kinematics are left out of the solve and held
        let mut solve_legs = [false; NUM_LEGS];
        for leg in 0..NUM_LEGS {
            if !stance[leg] {
                continue;
            }

            if input_data.robot.leg_is_finite(leg) {
                solve_legs[leg] = true;
            } else {
                let mut legs = [false; NUM_LEGS];
                legs[leg] = true;
                self.report.held_legs[leg] = true;
                self.raise(StanceCtrlWarning::StaleData {
                    origin: DataOrigin::RobotLeg(leg),
                    legs,
                });
            }
        }
        self.report.solved_legs = solve_legs;

        // ---- LOAD RATIOS ----

        // Held legs carry no share of the load
        let legs_in_contact = if solve_legs == stance {
            input_data.contact.legs_in_contact
        } else {
            solve_legs.iter().filter(|s| **s).count()
        };

        self.report.ratio = self.ratio_alloc.compute(
            &solve_legs,
            legs_in_contact,
            input_data.contact.moving_base_phase,
        );

        // ---- ACCELERATION TARGET ----

        let rp_q = roll_pitch_only(&input_data.robot.base_attitude_q);

        let mut foot_pos_m = [Vector3::zeros(); NUM_LEGS];
        for leg in 0..NUM_LEGS {
            if solve_legs[leg] {
                foot_pos_m[leg] = rp_q * input_data.robot.foot_pos_m_b[leg];
            }
        }

        let error = self.tracking_error(input_data, &foot_pos_m, &solve_legs);
        let (acc_target, acc_limited) = self.acc_law.compute(&error);
        self.report.acc_target = acc_target;
        self.report.acc_limited = acc_limited;

        // ---- FORCES ----

        let solution = self.solver.solve(
            &acc_target,
            &input_data.ground.value,
            &self.report.ratio,
            &foot_pos_m,
            &solve_legs,
        );

        self.report.solve_status = Some(solution.status);
        self.report.degenerate_axes = solution.degenerate_axes;
        self.report.residual = solution.residual;
        self.report.clamped_legs = solution.clamped_legs;

        let num_solved = solve_legs.iter().filter(|s| **s).count();

        if solution.infeasible {
            self.raise(StanceCtrlWarning::InfeasibleSolve {
                residual: solution.residual,
                converged: solution.status == SolveStatus::Solved,
            });
        }
        if num_solved > 0 && solution.degenerate_axes > 0 {
            self.raise(StanceCtrlWarning::DegenerateContact {
                stance_legs: num_solved,
                unresolved_axes: solution.degenerate_axes,
            });
        }

        // ---- COMMANDS ----

        let torques = leg_torques(&solution.forces, &rp_q, &input_data.robot.foot_jacobian);
        let mut action = Action {
            commands: [MotorCommand::default(); NUM_MOTORS],
            contact_forces: solution.forces.per_leg.convert(),
            stance,
        };

        for leg in 0..NUM_LEGS {
            let m = leg * MOTORS_PER_LEG;

            if solve_legs[leg] {
                for j in 0..MOTORS_PER_LEG {
                    action.commands[m + j] = MotorCommand::new(
                        0.0, 0.0, 0.0, self.params.stance_joint_kd, torques[leg][j]
                    );
                }
            } else if self.report.held_legs[leg] {
                self.hold_leg(&mut action, leg);
            }
        }

        // Nothing which isn't finite leaves the controller
        for leg in 0..NUM_LEGS {
            let m = leg * MOTORS_PER_LEG;
            let finite = action.commands[m..m + MOTORS_PER_LEG]
                .iter()
                .all(|c| c.is_finite())
                && action.contact_forces.column(leg).iter().all(|f| f.is_finite());

            if !finite {
                let mut legs = [false; NUM_LEGS];
                legs[leg] = true;
                self.hold_leg(&mut action, leg);
                self.report.held_legs[leg] = true;
                self.raise(StanceCtrlWarning::StaleData {
                    origin: DataOrigin::Command,
                    legs,
                });
            }
        }

        trace!(
            "StanceCtrl output:\n    stance: {:?}\n    forces: {:?}\n    torques: {:?}",
            action.stance,
            solution.forces.per_leg,
            torques
        );

        self.action = action;

        Ok((action, self.report.clone()))
    }
}

impl LegController for StanceLegController {
    type Action = Action;
    type Report = StatusReport;
    type Error = StanceCtrlError;

    fn reset(&mut self, current_time_s: f64) {
        debug!("StanceCtrl reset at {:.3} s", current_time_s);

        self.reset_time_s = current_time_s;
        self.time_since_reset_s = 0.0;
        self.mode = Mode::Ready;
    }

    fn update(
        &mut self,
        current_time_s: f64,
        collab: &Collaborators<'_>,
    ) -> Result<Self::Report, Self::Error> {
        if self.mode == Mode::Uninitialised {
            return Err(StanceCtrlError::NotReset);
        }

        let input = InputData::snapshot(current_time_s, collab);
        let (_, report) = self.proc(&input)?;

        Ok(report)
    }

    fn get_action(&self) -> Self::Action {
        self.action
    }
}

impl StanceLegController {
    /// Create a new controller from its parameters.
    pub fn new(params: Params, desired: DesiredMotion) -> Result<Self, StanceCtrlError> {
        Self::init(InitData { params, desired })
    }

    /// Create a new controller, loading the parameters from a file in the
    /// `$QUAD_SW_ROOT/params` directory, for example `"stance_ctrl.toml"`.
    pub fn load(param_file: &str, desired: DesiredMotion) -> Result<Self, StanceCtrlError> {
        let params: Params = util::params::load(param_file)?;

        Self::new(params, desired)
    }

    /// Create a new controller, loading the parameters from a file.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        desired: DesiredMotion,
    ) -> Result<Self, StanceCtrlError> {
        let params: Params = util::params::load_path(path)?;

        Self::new(params, desired)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn time_since_reset_s(&self) -> f64 {
        self.time_since_reset_s
    }

    /// The status report of the last cycle.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn desired(&self) -> &DesiredMotion {
        &self.desired
    }

    pub fn set_desired_speed(&mut self, speed_ms: Vector3<f64>) {
        self.desired.speed_ms = speed_ms;
    }

    pub fn set_desired_twisting_speed(&mut self, twisting_speed_rads: f64) {
        self.desired.twisting_speed_rads = twisting_speed_rads;
    }

    pub fn set_desired_body_height(&mut self, body_height_m: f64) {
        self.desired.body_height_m = body_height_m;
    }

    /// Find the first body level input which is stale or not finite.
    ///
    /// Samples stamped further ahead of the current time than the stale
    /// threshold are treated as stale too.
    fn invalid_body_data(&self, input: &InputData) -> Option<DataOrigin> {
        let now = input.current_time_s;
        let fresh = |timestamp_s: f64| {
            Sample::new((), timestamp_s)
                .age_s(now)
                .map_or(false, |age| age.abs() <= self.params.stale_threshold_s)
        };

        if !input.robot.imu_is_finite() || !fresh(input.robot.timestamp_s) {
            return Some(DataOrigin::Robot);
        }
        if !input.velocity.value.is_finite() || !fresh(input.velocity.timestamp_s) {
            return Some(DataOrigin::VelocityEstimator);
        }
        if !input.ground.value.is_finite() || !fresh(input.ground.timestamp_s) {
            return Some(DataOrigin::GroundEstimator);
        }
        if !input.base_pose.value.is_finite() || !fresh(input.base_pose.timestamp_s) {
            return Some(DataOrigin::PosePlanner);
        }

        match self.params.locomotion_mode {
            LocomotionMode::Position => {
                if !all_finite(input.com_offset.value.as_slice())
                    || !fresh(input.com_offset.timestamp_s)
                {
                    return Some(DataOrigin::ComPlanner);
                }
            }
            LocomotionMode::Walk => {
                let stance_footholds_ok = (0..NUM_LEGS)
                    .filter(|i| input.contact.contacts[*i])
                    .all(|i| all_finite(input.footholds.value[i].as_slice()));

                if !stance_footholds_ok || !fresh(input.footholds.timestamp_s) {
                    return Some(DataOrigin::FootholdPlanner);
                }
            }
        }

        None
    }

    /// Build the body tracking error.
    ///
    /// `foot_pos_m` are the foot positions in the control frame, only valid
    /// for `solve_legs`.
    fn tracking_error(
        &self,
        input: &InputData,
        foot_pos_m: &[Vector3<f64>; NUM_LEGS],
        solve_legs: &[bool; NUM_LEGS],
    ) -> TrackingError {
        let solved: Vec<usize> = (0..NUM_LEGS).filter(|i| solve_legs[*i]).collect();

        // Body height is taken from the feet on the ground, with no feet the
        // height isn't corrected
        let body_height_m = if solved.is_empty() {
            self.desired.body_height_m
        } else {
            -solved.iter().map(|i| foot_pos_m[*i].z).sum::<f64>() / solved.len() as f64
        };

        let com_target_m = match self.params.locomotion_mode {
            LocomotionMode::Position => input.com_offset.value,
            LocomotionMode::Walk => {
                let stance: Vec<usize> = (0..NUM_LEGS)
                    .filter(|i| input.contact.contacts[*i])
                    .collect();

                if stance.is_empty() {
                    Vector3::zeros()
                } else {
                    stance
                        .iter()
                        .map(|i| input.footholds.value[*i])
                        .sum::<Vector3<f64>>() / stance.len() as f64
                }
            }
        };

        TrackingError::new(
            &self.desired,
            &com_target_m,
            body_height_m,
            &rpy(&input.robot.base_attitude_q),
            &input.base_pose.value.rpy_rad,
            &input.velocity.value.linear_ms,
            &input.velocity.value.angular_rads,
        )
    }

    /// Keep the previous command and force of a leg.
    fn hold_leg(&self, action: &mut Action, leg: usize) {
        let m = leg * MOTORS_PER_LEG;

        action.commands[m..m + MOTORS_PER_LEG]
            .copy_from_slice(&self.action.commands[m..m + MOTORS_PER_LEG]);
        action
            .contact_forces
            .set_column(leg, &self.action.contact_forces.column(leg));
    }

    /// Record and log a warning.
    fn raise(&mut self, warning: StanceCtrlWarning) {
        match warning {
            // Raised on every cycle of a two leg gait
            StanceCtrlWarning::DegenerateContact { .. } => debug!("{}", warning),
            _ => warn!("{}", warning),
        }
        self.report.warnings.push(warning);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::StaticWorld;

    fn controller() -> StanceLegController {
        let params = Params::default();
        let desired = DesiredMotion::stand(params.desired_body_height_m);
        StanceLegController::new(params, desired).unwrap()
    }

    #[test]
    fn test_not_reset() {
        let mut ctrl = controller();
        let world = StaticWorld::standing(0.0);

        assert_eq!(ctrl.mode(), Mode::Uninitialised);

        match ctrl.update(0.0, &world.collaborators()) {
            Err(StanceCtrlError::NotReset) => (),
            r => panic!("Expected NotReset, got {:?}", r.map(|_| ())),
        }

        assert_eq!(ctrl.get_action(), Action::default());
    }

    #[test]
    fn test_modes() {
        let mut ctrl = controller();
        let world = StaticWorld::standing(10.0);

        ctrl.reset(9.5);
        assert_eq!(ctrl.mode(), Mode::Ready);

        ctrl.update(10.0, &world.collaborators()).unwrap();
        assert_eq!(ctrl.mode(), Mode::Active);
        assert!((ctrl.time_since_reset_s() - 0.5).abs() < 1e-12);

        // Reset again restarts the timer without losing the last action
        let action = ctrl.get_action();
        ctrl.reset(10.0);
        assert_eq!(ctrl.mode(), Mode::Ready);
        assert_eq!(ctrl.time_since_reset_s(), 0.0);
        assert_eq!(ctrl.get_action(), action);
    }

    #[test]
    fn test_stance_commands() {
        let mut ctrl = controller();
        let mut world = StaticWorld::standing(0.0);
        world.contact = ContactState::from_contacts([true, false, false, true], 0.5);

        ctrl.reset(0.0);
        let report = ctrl.update(0.0, &world.collaborators()).unwrap();
        let action = ctrl.get_action();

        assert_eq!(report.solve_status, Some(SolveStatus::Solved));
        assert_eq!(action.stance, [true, false, false, true]);

        for leg in 0..NUM_LEGS {
            for j in 0..MOTORS_PER_LEG {
                let cmd = action.commands[leg * MOTORS_PER_LEG + j];

                if action.stance[leg] {
                    assert_eq!(cmd.pos_rad(), 0.0);
                    assert_eq!(cmd.kp(), 0.0);
                    assert_eq!(cmd.kd(), ctrl.params().stance_joint_kd);
                } else {
                    assert_eq!(cmd, MotorCommand::default());
                }
            }
        }

        // Swing legs take the swing controller's commands
        let swing = [MotorCommand::position(0.3, 20.0, 0.5); NUM_MOTORS];
        let merged = action.merge_swing(&swing);
        assert_eq!(merged[3], swing[3]);
        assert_eq!(merged[8], swing[8]);
        assert_eq!(merged[0], action.commands[0]);
        assert_eq!(merged[11], action.commands[11]);
    }

    #[test]
    fn test_bad_leg_kinematics_held() {
        let mut ctrl = controller();
        let mut world = StaticWorld::standing(0.0);

        ctrl.reset(0.0);
        ctrl.update(0.0, &world.collaborators()).unwrap();
        let first = ctrl.get_action();

        world.set_time(0.002);
        world.robot.state.foot_jacobian[2][(1, 1)] = f64::NAN;

        let report = ctrl.update(0.002, &world.collaborators()).unwrap();
        let action = ctrl.get_action();

        assert_eq!(report.held_legs, [false, false, true, false]);
        assert_eq!(report.solved_legs, [true, true, false, true]);

        // The remaining legs share the load between them
        assert_eq!(report.ratio.per_leg[2], 0.0);
        for leg in [0, 1, 3].iter() {
            assert!((report.ratio.per_leg[*leg] - 1.0 / 3.0).abs() < 1e-12);
        }
        assert_eq!(&action.commands[6..9], &first.commands[6..9]);
        assert!(action.commands.iter().all(|c| c.is_finite()));
        assert!(report.warnings.contains(&StanceCtrlWarning::StaleData {
            origin: DataOrigin::RobotLeg(2),
            legs: [false, false, true, false],
        }));
    }

    #[test]
    fn test_old_data_held() {
        let mut ctrl = controller();
        let mut world = StaticWorld::standing(0.0);

        ctrl.reset(0.0);
        ctrl.update(0.0, &world.collaborators()).unwrap();
        let first = ctrl.get_action();

        // The ground estimate stops updating
        world.set_time(1.0);
        world.ground.timestamp_s = 0.0;

        let report = ctrl.update(1.0, &world.collaborators()).unwrap();

        assert_eq!(ctrl.get_action(), first);
        assert_eq!(report.held_legs, [true; NUM_LEGS]);
        assert_eq!(report.solve_status, None);
        assert_eq!(report.warnings, vec![StanceCtrlWarning::StaleData {
            origin: DataOrigin::GroundEstimator,
            legs: [true; NUM_LEGS],
        }]);
    }

    #[test]
    fn test_future_data_held() {
        let mut ctrl = controller();
        let mut world = StaticWorld::standing(0.0);

        ctrl.reset(0.0);
        ctrl.update(0.0, &world.collaborators()).unwrap();
        let first = ctrl.get_action();

        // The velocity estimator's clock runs ahead of the controller's
        world.set_time(0.002);
        world.velocity.timestamp_s = 0.002 + 2.0 * ctrl.params().stale_threshold_s;

        let report = ctrl.update(0.002, &world.collaborators()).unwrap();

        assert_eq!(ctrl.get_action(), first);
        assert_eq!(report.warnings, vec![StanceCtrlWarning::StaleData {
            origin: DataOrigin::VelocityEstimator,
            legs: [true; NUM_LEGS],
        }]);

        // A little ahead is within tolerance
        world.velocity.timestamp_s = 0.002 + 0.5 * ctrl.params().stale_threshold_s;

        let report = ctrl.update(0.002, &world.collaborators()).unwrap();

        assert_eq!(report.solve_status, Some(SolveStatus::Solved));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_degenerate_contact_warning() {
        let mut ctrl = controller();
        let mut world = StaticWorld::standing(0.0);
        world.contact = ContactState::from_contacts([false, true, true, false], 0.5);

        ctrl.reset(0.0);
        let report = ctrl.update(0.0, &world.collaborators()).unwrap();

        assert!(report.warnings.contains(&StanceCtrlWarning::DegenerateContact {
            stance_legs: 2,
            unresolved_axes: 1,
        }));
    }

    #[test]
    fn test_invalid_params() {
        let mut params = Params::default();
        params.body_mass_kg = -1.0;

        match StanceLegController::new(params, DesiredMotion::stand(0.28)) {
            Err(StanceCtrlError::InvalidParams(_)) => (),
            Err(e) => panic!("Unexpected error {}", e),
            Ok(_) => panic!("Negative mass accepted"),
        }
    }

    #[test]
    fn test_desired_setters() {
        let mut ctrl = controller();

        ctrl.set_desired_speed(Vector3::new(0.2, 0.0, 0.0));
        ctrl.set_desired_twisting_speed(0.1);
        ctrl.set_desired_body_height(0.3);

        assert_eq!(ctrl.desired().speed_ms, Vector3::new(0.2, 0.0, 0.0));
        assert_eq!(ctrl.desired().twisting_speed_rads, 0.1);
        assert_eq!(ctrl.desired().body_height_m, 0.3);
    }
}
