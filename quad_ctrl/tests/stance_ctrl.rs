//! # Stance control integration tests
//!
//! Drives the stance leg controller through full cycles against the static simulation world.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use approx::assert_abs_diff_eq;
use nalgebra::{UnitQuaternion, Vector3};

use quad_if::{
    gait::ContactState, motor::MotorCommand, robot::Robot, GRAVITY_MSS, MOTORS_PER_LEG,
    NUM_LEGS, NUM_MOTORS,
};
use quad_lib::{
    leg_ctrl::LegController,
    sim::{kinematics, StaticWorld},
    stance_ctrl::{
        DataOrigin, DesiredMotion, LocomotionMode, Params, SolveStatus, StanceCtrlError,
        StanceCtrlWarning, StanceLegController,
    },
};
use util::params::LoadError;

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

/// Height of the body when every joint is at its standing angle.
fn standing_height_m() -> f64 {
    -kinematics::foot_position(0, &kinematics::STANDING_JOINT_ANGLES_RAD).z
}

fn controller(params: Params) -> StanceLegController {
    StanceLegController::new(params, DesiredMotion::stand(standing_height_m())).unwrap()
}

fn assert_all_finite(cmds: &[MotorCommand; NUM_MOTORS]) {
    for (i, c) in cmds.iter().enumerate() {
        assert!(c.is_finite(), "Motor {} command is not finite: {}", i, c);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn test_four_leg_stand() {
    let params = Params::default();
    let mass = params.body_mass_kg;
    let mut ctrl = controller(params);
    let mut world = StaticWorld::standing(0.0);

    ctrl.reset(0.0);
    let report = ctrl.update(0.0, &world.collaborators()).unwrap();
    let action = ctrl.get_action();

    assert_eq!(report.solve_status, Some(SolveStatus::Solved));
    assert!(report.warnings.is_empty());
    assert_eq!(action.stance, [true; NUM_LEGS]);

    for leg in 0..NUM_LEGS {
        let f = action.contact_forces.column(leg);
        assert_abs_diff_eq!(f[0], 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(f[1], 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(f[2], 0.25 * mass * GRAVITY_MSS, epsilon = 0.05);
    }

    // Commands are pure torque plus joint damping
    assert_all_finite(&action.commands);
    for c in action.commands.iter() {
        assert_eq!(c.kp(), 0.0);
        assert_eq!(c.kd(), ctrl.params().stance_joint_kd);
    }

    // Holding the body up loads the knees
    for leg in 0..NUM_LEGS {
        assert!(action.commands[leg * MOTORS_PER_LEG + 2].torque_nm().abs() > 1.0);
    }

    world.robot.set_cmd(&action.commands);
    assert_eq!(world.robot.last_cmd, Some(action.commands));
}

#[test]
fn test_trot_forward() {
    let params = Params::default();
    let mass = params.body_mass_kg;
    let kd_x = params.kd[0];
    let mut ctrl = controller(params);
    let mut world = StaticWorld::standing(0.0);
    world.contact = ContactState::from_contacts([true, false, false, true], 0.5);

    // A small speed error gives a forward acceleration demand
    let speed = 0.02;
    ctrl.set_desired_speed(Vector3::new(speed, 0.0, 0.0));

    ctrl.reset(0.0);
    let report = ctrl.update(0.0, &world.collaborators()).unwrap();
    let action = ctrl.get_action();

    assert_abs_diff_eq!(report.acc_target.linear.x, kd_x * speed, epsilon = 1e-9);
    assert_eq!(report.degenerate_axes, 1);
    assert!(report.warnings.contains(&StanceCtrlWarning::DegenerateContact {
        stance_legs: 2,
        unresolved_axes: 1,
    }));

    // Newton's law holds for the linear axes
    let total: Vector3<f64> = (0..NUM_LEGS)
        .map(|leg| action.contact_forces.column(leg).into_owned())
        .sum();
    assert_abs_diff_eq!(total.x / mass, kd_x * speed, epsilon = 0.05);
    assert_abs_diff_eq!(total.y / mass, 0.0, epsilon = 0.05);
    assert_abs_diff_eq!(total.z / mass, GRAVITY_MSS, epsilon = 0.05);

    // Swing legs are left to the swing controller
    for m in MOTORS_PER_LEG..3 * MOTORS_PER_LEG {
        assert_eq!(action.commands[m], MotorCommand::default());
    }
    let swing = [MotorCommand::position(0.5, 30.0, 1.0); NUM_MOTORS];
    let merged = action.merge_swing(&swing);
    assert_eq!(merged[4], swing[4]);
    assert_eq!(merged[1], action.commands[1]);
}

#[test]
fn test_solver_not_converged() {
    let mut params = Params::default();
    params.solver_max_iter = 1;
    let mass = params.body_mass_kg;
    let mut ctrl = controller(params);
    let world = StaticWorld::standing(0.0);

    ctrl.reset(0.0);
    let report = ctrl.update(0.0, &world.collaborators()).unwrap();
    let action = ctrl.get_action();

    assert_eq!(report.solve_status, Some(SolveStatus::NotConverged));
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        StanceCtrlWarning::InfeasibleSolve { converged: false, .. }
    )));

    // Legs fall back to their share of the weight along the ground normal
    for leg in 0..NUM_LEGS {
        let f = action.contact_forces.column(leg);
        assert_abs_diff_eq!(f[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f[2], 0.25 * mass * GRAVITY_MSS, epsilon = 1e-9);
    }

    assert_all_finite(&action.commands);
    assert_eq!(report.held_legs, [false; NUM_LEGS]);
}

#[test]
fn test_stale_velocity() {
    let mut ctrl = controller(Params::default());
    let mut world = StaticWorld::standing(0.0);

    ctrl.reset(0.0);
    ctrl.update(0.0, &world.collaborators()).unwrap();
    let good = ctrl.get_action();

    // Bad estimate for one cycle
    world.set_time(0.002);
    world.velocity.value.linear_ms.x = f64::NAN;

    let report = ctrl.update(0.002, &world.collaborators()).unwrap();
    let held = ctrl.get_action();

    assert_all_finite(&held.commands);
    assert_eq!(held.commands, good.commands);
    assert_eq!(report.warnings, vec![StanceCtrlWarning::StaleData {
        origin: DataOrigin::VelocityEstimator,
        legs: [true; NUM_LEGS],
    }]);

    // And recovery on the next
    world.set_time(0.004);
    world.velocity.value.linear_ms.x = 0.0;

    let report = ctrl.update(0.004, &world.collaborators()).unwrap();
    assert_eq!(report.solve_status, Some(SolveStatus::Solved));
    assert!(report.warnings.is_empty());
    assert_all_finite(&ctrl.get_action().commands);
}

#[test]
fn test_zero_stance() {
    let mut ctrl = controller(Params::default());
    let mut world = StaticWorld::standing(0.0);
    world.contact = ContactState::from_contacts([false; NUM_LEGS], 0.0);

    ctrl.reset(0.0);

    for i in 0..5 {
        let t = i as f64 * 0.002;
        world.set_time(t);

        let report = ctrl.update(t, &world.collaborators()).unwrap();
        let action = ctrl.get_action();

        assert_eq!(report.solve_status, Some(SolveStatus::NoStance));
        assert_eq!(action.commands, [MotorCommand::default(); NUM_MOTORS]);
        assert_eq!(action.contact_forces, nalgebra::Matrix3x4::<f64>::zeros());
        assert_eq!(report.ratio.per_leg, [0.0; NUM_LEGS]);
    }
}

#[test]
fn test_position_locomotion() {
    let mut params = Params::default();
    params.locomotion_mode = LocomotionMode::Position;
    params.kp[0] = 50.0;
    let mut ctrl = controller(params);
    let mut world = StaticWorld::standing(0.0);
    world.com_offset.value = Vector3::new(0.02, 0.0, 0.0);

    // Footholds are not used while in position locomotion
    world.footholds.value[1].x = f64::NAN;

    ctrl.reset(0.0);
    let report = ctrl.update(0.0, &world.collaborators()).unwrap();

    assert_abs_diff_eq!(report.acc_target.linear.x, 1.0, epsilon = 1e-9);
    assert_eq!(report.solve_status, Some(SolveStatus::Solved));
    assert_all_finite(&ctrl.get_action().commands);

    // But the COM plan is
    world.com_offset.value.y = f64::NAN;
    let report = ctrl.update(0.0, &world.collaborators()).unwrap();
    assert_eq!(report.warnings[0], StanceCtrlWarning::StaleData {
        origin: DataOrigin::ComPlanner,
        legs: [true; NUM_LEGS],
    });
}

#[test]
fn test_tilted_body() {
    let params = Params::default();
    let kp_pitch = params.kp[4];
    let mut ctrl = controller(params);
    let mut world = StaticWorld::standing(0.0);
    world.set_attitude(UnitQuaternion::from_euler_angles(0.0, 0.05, 0.3));

    ctrl.reset(0.0);
    let report = ctrl.update(0.0, &world.collaborators()).unwrap();

    // Pitch is corrected, yaw is not
    assert_abs_diff_eq!(report.acc_target.angular.y, -kp_pitch * 0.05, epsilon = 1e-9);
    assert_abs_diff_eq!(report.acc_target.angular.z, 0.0, epsilon = 1e-12);
    assert_eq!(report.solve_status, Some(SolveStatus::Solved));
    assert_all_finite(&ctrl.get_action().commands);
}

#[test]
fn test_config_errors() {
    let desired = DesiredMotion::stand(0.28);

    match StanceLegController::from_file("/nonexistent/stance_ctrl.toml", desired) {
        Err(StanceCtrlError::Config(LoadError::FileLoadError(_))) => (),
        Err(e) => panic!("Unexpected error: {}", e),
        Ok(_) => panic!("Loaded a missing file"),
    }

    let mut path = std::env::temp_dir();
    path.push("quad_ctrl_malformed_stance_ctrl.toml");
    std::fs::write(&path, "kp = [1.0, 2.0]\nkd = \"fast\"\n").unwrap();

    match StanceLegController::from_file(&path, desired) {
        Err(StanceCtrlError::Config(LoadError::DeserialiseError(_))) => (),
        Err(e) => panic!("Unexpected error: {}", e),
        Ok(_) => panic!("Loaded a malformed file"),
    }

    let shipped = concat!(env!("CARGO_MANIFEST_DIR"), "/../params/stance_ctrl.toml");
    StanceLegController::from_file(shipped, desired).unwrap();
}
