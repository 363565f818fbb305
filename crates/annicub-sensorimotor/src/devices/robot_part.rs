// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::SensorimotorError;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Kinematic chain of the robot addressed by a joint module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotPart {
    Head,
    Torso,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
}

impl RobotPart {
    pub const ALL: [RobotPart; 6] = [
        RobotPart::Head,
        RobotPart::Torso,
        RobotPart::RightArm,
        RobotPart::LeftArm,
        RobotPart::RightLeg,
        RobotPart::LeftLeg,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            RobotPart::Head => "head",
            RobotPart::Torso => "torso",
            RobotPart::RightArm => "right_arm",
            RobotPart::LeftArm => "left_arm",
            RobotPart::RightLeg => "right_leg",
            RobotPart::LeftLeg => "left_leg",
        }
    }
}

impl Display for RobotPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for RobotPart {
    type Err = SensorimotorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RobotPart::ALL
            .into_iter()
            .find(|part| part.as_key() == s)
            .ok_or_else(|| SensorimotorError::InvalidPartKey(s.to_string()))
    }
}

/// Arm carrying a skin patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmSide {
    Right,
    Left,
}

impl ArmSide {
    /// Accepts `'r'` / `'l'` in either case
    pub fn from_char(side: char) -> Result<Self, SensorimotorError> {
        match side.to_ascii_lowercase() {
            'r' => Ok(ArmSide::Right),
            'l' => Ok(ArmSide::Left),
            _ => Err(SensorimotorError::InvalidPartKey(side.to_string())),
        }
    }
}

impl Display for ArmSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArmSide::Right => f.write_str("right"),
            ArmSide::Left => f.write_str("left"),
        }
    }
}
