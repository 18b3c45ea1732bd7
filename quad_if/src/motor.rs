//! # Motor Commands
//!
//! A motor command blends position, velocity and torque control:
//!
//! ```text
//! tau_out = kp * (pos - q) + kd * (vel - dq) + torque
//! ```
//!
//! Pure position or torque control are special cases of this hybrid form.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{SMatrix, SVector, Vector5};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::NUM_MOTORS;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of scalars in the vector form of a `MotorCommand`.
pub const MOTOR_CMD_LEN: usize = 5;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A hybrid command for a single motor.
///
/// The vector form of the command is always ordered `[pos, kp, vel, kd, torque]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct MotorCommand {
    /// Target position.
    ///
    /// Units: radians
    pos_rad: f64,

    /// Position gain.
    kp: f64,

    /// Target velocity.
    ///
    /// Units: radians/second
    vel_rads: f64,

    /// Velocity gain.
    kd: f64,

    /// Feedforward torque.
    ///
    /// Units: newton meters
    torque_nm: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How a set of raw motor values should be interpreted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorMode {
    /// Values are target positions, tracked with the given position/velocity gains.
    Position,

    /// Values are feedforward torques.
    Torque,

    /// Values are full hybrid commands (5 per motor).
    Hybrid,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotorCommand {
    /// Create a new command from its five components.
    pub const fn new(pos_rad: f64, kp: f64, vel_rads: f64, kd: f64, torque_nm: f64) -> Self {
        Self {
            pos_rad,
            kp,
            vel_rads,
            kd,
            torque_nm,
        }
    }

    /// Create a position command holding the target with the given gains.
    pub const fn position(pos_rad: f64, kp: f64, kd: f64) -> Self {
        Self::new(pos_rad, kp, 0.0, kd, 0.0)
    }

    /// Create a pure torque command.
    pub const fn torque(torque_nm: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, torque_nm)
    }

    /// Create a command from the vector form `[pos, kp, vel, kd, torque]`.
    pub fn from_vector(vector: &Vector5<f64>) -> Self {
        Self::new(vector[0], vector[1], vector[2], vector[3], vector[4])
    }

    /// Get the vector form `[pos, kp, vel, kd, torque]` of this command.
    pub fn to_vector(&self) -> Vector5<f64> {
        Vector5::new(
            self.pos_rad,
            self.kp,
            self.vel_rads,
            self.kd,
            self.torque_nm,
        )
    }

    pub fn pos_rad(&self) -> f64 {
        self.pos_rad
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn vel_rads(&self) -> f64 {
        self.vel_rads
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn torque_nm(&self) -> f64 {
        self.torque_nm
    }

    /// True if every component of the command is finite.
    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|v| v.is_finite())
    }
}

impl From<Vector5<f64>> for MotorCommand {
    fn from(vector: Vector5<f64>) -> Self {
        Self::from_vector(&vector)
    }
}

impl From<[f64; MOTOR_CMD_LEN]> for MotorCommand {
    fn from(values: [f64; MOTOR_CMD_LEN]) -> Self {
        Self::new(values[0], values[1], values[2], values[3], values[4])
    }
}

impl From<MotorCommand> for Vector5<f64> {
    fn from(cmd: MotorCommand) -> Self {
        cmd.to_vector()
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.pos_rad, self.kp, self.vel_rads, self.kd, self.torque_nm
        )
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the commands for all motors from a vector of per-motor values.
///
/// In `Position` mode the values are target angles tracked with `kp` and `kd`. In `Torque` mode
/// they are feedforward torques and the gains are ignored. `Hybrid` values cannot be expressed as
/// a single scalar per motor, use [`hybrid_commands`] instead; `None` is returned in that case.
pub fn motor_commands_from_values(
    values: &SVector<f64, NUM_MOTORS>,
    mode: MotorMode,
    kp: f64,
    kd: f64,
) -> Option<[MotorCommand; NUM_MOTORS]> {
    let mut cmds = [MotorCommand::default(); NUM_MOTORS];

    match mode {
        MotorMode::Position => {
            for (cmd, v) in cmds.iter_mut().zip(values.iter()) {
                *cmd = MotorCommand::position(*v, kp, kd);
            }
        }
        MotorMode::Torque => {
            for (cmd, v) in cmds.iter_mut().zip(values.iter()) {
                *cmd = MotorCommand::torque(*v);
            }
        }
        MotorMode::Hybrid => return None,
    }

    Some(cmds)
}

/// Build the commands for all motors from a hybrid matrix whose columns are the vector form of
/// each motor's command.
pub fn hybrid_commands(values: &SMatrix<f64, MOTOR_CMD_LEN, NUM_MOTORS>) -> [MotorCommand; NUM_MOTORS] {
    let mut cmds = [MotorCommand::default(); NUM_MOTORS];

    for (i, cmd) in cmds.iter_mut().enumerate() {
        *cmd = MotorCommand::from_vector(&values.fixed_columns::<1>(i).into_owned());
    }

    cmds
}

/// Pack all motor commands into a hybrid matrix, the inverse of [`hybrid_commands`].
pub fn hybrid_matrix(cmds: &[MotorCommand; NUM_MOTORS]) -> SMatrix<f64, MOTOR_CMD_LEN, NUM_MOTORS> {
    let mut m = SMatrix::<f64, MOTOR_CMD_LEN, NUM_MOTORS>::zeros();

    for (i, cmd) in cmds.iter().enumerate() {
        m.set_column(i, &cmd.to_vector());
    }

    m
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_vector_round_trip() {
        let samples = [
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [0.1, 100.0, -0.5, 1.0, 3.25],
            [-1.2345678901234, 1e-12, 1e12, -0.0, f64::MIN_POSITIVE],
            [f64::MAX, f64::MIN, 0.3, 0.7, -2.0 / 3.0],
        ];

        for s in samples.iter() {
            let v = Vector5::from_row_slice(s);
            let cmd = MotorCommand::from_vector(&v);

            // Exact equality, no tolerance
            assert_eq!(cmd.to_vector(), v);
            assert_eq!(MotorCommand::from(*s).to_vector(), v);
        }
    }

    #[test]
    fn test_field_order() {
        let cmd = MotorCommand::new(1.0, 2.0, 3.0, 4.0, 5.0);

        assert_eq!(cmd.pos_rad(), 1.0);
        assert_eq!(cmd.kp(), 2.0);
        assert_eq!(cmd.vel_rads(), 3.0);
        assert_eq!(cmd.kd(), 4.0);
        assert_eq!(cmd.torque_nm(), 5.0);
        assert_eq!(cmd.to_string(), "1 2 3 4 5");
        assert_eq!(MotorCommand::torque(-0.5).to_string(), "0 0 0 0 -0.5");
    }

    #[test]
    fn test_is_finite() {
        assert!(MotorCommand::default().is_finite());
        assert!(!MotorCommand::new(0.0, 0.0, f64::NAN, 0.0, 0.0).is_finite());
        assert!(!MotorCommand::torque(f64::INFINITY).is_finite());
    }

    #[test]
    fn test_commands_from_values() {
        let values = SVector::<f64, NUM_MOTORS>::from_fn(|i, _| i as f64);

        let pos = motor_commands_from_values(&values, MotorMode::Position, 100.0, 1.0).unwrap();
        assert_eq!(pos[3], MotorCommand::new(3.0, 100.0, 0.0, 1.0, 0.0));

        let tau = motor_commands_from_values(&values, MotorMode::Torque, 100.0, 1.0).unwrap();
        assert_eq!(tau[11], MotorCommand::torque(11.0));

        assert!(motor_commands_from_values(&values, MotorMode::Hybrid, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_hybrid_matrix() {
        let m = SMatrix::<f64, MOTOR_CMD_LEN, NUM_MOTORS>::from_fn(|r, c| (10 * c + r) as f64);
        let cmds = hybrid_commands(&m);

        assert_eq!(cmds[2], MotorCommand::new(20.0, 21.0, 22.0, 23.0, 24.0));
        assert_eq!(hybrid_matrix(&cmds), m);
    }
}
