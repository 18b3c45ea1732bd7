//! # Simulation
//!
//! A static world providing every collaborator of the leg controllers from fixed, directly
//! editable values. It is used to evaluate the controllers offline, in tests and in benchmarks,
//! without a robot or a physics engine.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod kinematics;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector3};

use quad_if::{
    collab::Collaborators,
    gait::ContactState,
    motor::MotorCommand,
    plan::{
        BasePose, ComPlanner, FootholdPlanner, GroundEstimate, GroundEstimator, PosePlanner,
        VelocityEstimate, VelocityEstimator,
    },
    robot::{Robot, RobotState},
    Sample, MOTORS_PER_LEG, NUM_LEGS, NUM_MOTORS,
};
use util::maths::roll_pitch_only;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A robot whose state only changes when it is set.
#[derive(Debug, Clone)]
pub struct SimRobot {
    pub state: RobotState,

    /// The last commands sent to the robot, if any.
    pub last_cmd: Option<[MotorCommand; NUM_MOTORS]>,
}

/// Fixed outputs for every collaborator.
#[derive(Debug, Clone)]
pub struct StaticWorld {
    pub robot: SimRobot,
    pub contact: ContactState,
    pub velocity: Sample<VelocityEstimate>,
    pub ground: Sample<GroundEstimate>,
    pub com_offset: Sample<Vector3<f64>>,
    pub base_pose: Sample<BasePose>,
    pub footholds: Sample<[Vector3<f64>; NUM_LEGS]>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimRobot {
    /// A robot standing level with all joints at their standing angles.
    pub fn standing(time_s: f64) -> Self {
        let mut robot = Self {
            state: RobotState {
                timestamp_s: time_s,
                ..RobotState::default()
            },
            last_cmd: None,
        };

        let mut q = [0.0; NUM_MOTORS];
        for leg in 0..NUM_LEGS {
            q[leg * MOTORS_PER_LEG..(leg + 1) * MOTORS_PER_LEG]
                .copy_from_slice(&kinematics::STANDING_JOINT_ANGLES_RAD);
        }
        robot.set_joint_angles(&q);

        robot
    }

    /// Set the joint angles, updating the foot positions and Jacobians.
    pub fn set_joint_angles(&mut self, q: &[f64; NUM_MOTORS]) {
        self.state.joint_pos_rad = *q;

        for leg in 0..NUM_LEGS {
            let m = leg * MOTORS_PER_LEG;
            let q_leg = [q[m], q[m + 1], q[m + 2]];

            self.state.foot_pos_m_b[leg] = kinematics::foot_position(leg, &q_leg);
            self.state.foot_jacobian[leg] = kinematics::foot_jacobian(leg, &q_leg);
        }
    }
}

impl Robot for SimRobot {
    fn state(&self) -> RobotState {
        self.state.clone()
    }

    fn set_cmd(&mut self, cmds: &[MotorCommand; NUM_MOTORS]) {
        self.last_cmd = Some(*cmds);
    }
}

impl StaticWorld {
    /// A world with the robot standing still on flat ground, all legs in mid stance, and every
    /// output produced at `time_s`.
    pub fn standing(time_s: f64) -> Self {
        let robot = SimRobot::standing(time_s);
        let footholds = robot.state.foot_pos_m_b;

        Self {
            robot,
            contact: ContactState::from_contacts([true; NUM_LEGS], 0.5),
            velocity: Sample::new(VelocityEstimate::default(), time_s),
            ground: Sample::new(GroundEstimate::flat(), time_s),
            com_offset: Sample::new(Vector3::zeros(), time_s),
            base_pose: Sample::new(BasePose::default(), time_s),
            footholds: Sample::new(footholds, time_s),
        }
    }

    /// Mark every output as produced at `time_s`.
    pub fn set_time(&mut self, time_s: f64) {
        self.robot.state.timestamp_s = time_s;
        self.velocity.timestamp_s = time_s;
        self.ground.timestamp_s = time_s;
        self.com_offset.timestamp_s = time_s;
        self.base_pose.timestamp_s = time_s;
        self.footholds.timestamp_s = time_s;
    }

    /// Tilt the robot's base, moving the planned footholds with the feet.
    pub fn set_attitude(&mut self, attitude_q: UnitQuaternion<f64>) {
        self.robot.state.base_attitude_q = attitude_q;

        let rp_q = roll_pitch_only(&attitude_q);
        for leg in 0..NUM_LEGS {
            self.footholds.value[leg] = rp_q * self.robot.state.foot_pos_m_b[leg];
        }
    }

    /// Lend out every collaborator for one control cycle.
    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            robot: &self.robot,
            gait_generator: &self.contact,
            velocity_estimator: self,
            ground_estimator: self,
            com_planner: self,
            pose_planner: self,
            foothold_planner: self,
        }
    }
}

impl VelocityEstimator for StaticWorld {
    fn velocity(&self) -> Sample<VelocityEstimate> {
        self.velocity
    }
}

impl GroundEstimator for StaticWorld {
    fn ground(&self) -> Sample<GroundEstimate> {
        self.ground
    }
}

impl ComPlanner for StaticWorld {
    fn com_offset(&self) -> Sample<Vector3<f64>> {
        self.com_offset
    }
}

impl PosePlanner for StaticWorld {
    fn base_pose(&self) -> Sample<BasePose> {
        self.base_pose
    }
}

impl FootholdPlanner for StaticWorld {
    fn footholds(&self) -> Sample<[Vector3<f64>; NUM_LEGS]> {
        self.footholds
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
