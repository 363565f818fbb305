// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Interfaces to the robot middleware.
//!
//! Drivers implement these traits; the reader and writer modules only ever see
//! scalars going in and out. Failures are reported as
//! [`SensorimotorError::Hardware`](crate::SensorimotorError::Hardware).

use crate::devices::skin_reader::SkinSection;
use crate::devices::ArmSide;
use crate::error::SensorimotorResult;
use std::fmt::Debug;

/// Control mode of a single joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    Position,
    Velocity,
}

impl std::str::FromStr for ControlMode {
    type Err = crate::SensorimotorError;

    /// Case-insensitive `"position"` / `"velocity"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "position" => Ok(ControlMode::Position),
            "velocity" => Ok(ControlMode::Velocity),
            _ => Err(crate::SensorimotorError::InvalidControlMode(s.to_string())),
        }
    }
}

/// Joint encoders and limits of one robot part.
pub trait JointEncoders: Debug + Send {
    fn joint_count(&self) -> usize;

    /// Hardware limits `(min, max)` of a joint in degrees
    fn joint_limits(&self, joint: usize) -> SensorimotorResult<(f64, f64)>;

    /// All joint angles, or `None` if no frame is available yet
    fn read_encoders(&mut self) -> SensorimotorResult<Option<Vec<f64>>>;

    /// One joint angle, or `None` if no frame is available yet
    fn read_encoder(&mut self, joint: usize) -> SensorimotorResult<Option<f64>>;
}

/// Motor control of one robot part.
///
/// Every motion command addresses the joints listed in `joints`, with one value per joint.
pub trait JointActuator: JointEncoders {
    fn position_move(&mut self, joints: &[usize], targets: &[f64]) -> SensorimotorResult<()>;

    fn relative_move(&mut self, joints: &[usize], deltas: &[f64]) -> SensorimotorResult<()>;

    fn velocity_move(&mut self, joints: &[usize], velocities: &[f64]) -> SensorimotorResult<()>;

    fn set_ref_speed(&mut self, joint: usize, speed: f64) -> SensorimotorResult<()>;

    fn set_ref_acceleration(&mut self, joint: usize, acceleration: f64) -> SensorimotorResult<()>;

    fn set_control_mode(&mut self, joint: usize, mode: ControlMode) -> SensorimotorResult<()>;

    fn stop(&mut self, joint: usize) -> SensorimotorResult<()>;

    fn check_motion_done(&mut self) -> SensorimotorResult<bool>;
}

/// Raw taxel readings of the skin patches on one arm.
pub trait TactileSource: Debug + Send {
    /// Raw values in `[0, 255]`, or `None` if the section delivered no frame
    fn read_section(&mut self, side: ArmSide, section: SkinSection) -> SensorimotorResult<Option<Vec<f64>>>;
}
