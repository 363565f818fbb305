// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::devices::hardware::{ControlMode, JointActuator};
use crate::devices::{poll_frame, resolve_joint_ranges, RobotPart};
use crate::error::{SensorimotorError, SensorimotorResult};
use crate::population_coding::{decode_population, CodingResolution, JointCoding, RangeModel};
use crate::transport::{check_joints, split_populations, JointSelection};
use annicub_config::{AnnIcubConfig, JointWriterConfig};
use serde::Serialize;
use serde_json::json;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

const MOTION_POLL_INTERVAL: Duration = Duration::from_millis(1);

//region Settings and modes

/// Reference speed and acceleration applied at construction, and their upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WriterSettings {
    pub speed: f64,
    pub acceleration: f64,
    pub velocity_max: f64,
    pub acceleration_max: f64,
}

impl Default for WriterSettings {
    fn default() -> Self {
        WriterSettings {
            speed: 10.0,
            acceleration: 50.0,
            velocity_max: 100.0,
            acceleration_max: 100.0,
        }
    }
}

impl From<&JointWriterConfig> for WriterSettings {
    fn from(config: &JointWriterConfig) -> Self {
        WriterSettings {
            speed: config.speed,
            acceleration: config.acceleration,
            velocity_max: config.velocity_max,
            acceleration_max: config.acceleration_max,
        }
    }
}

/// How written values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// Target angle
    Absolute,
    /// Displacement from the current angle
    Relative,
    /// Joint velocity, requires velocity control
    Velocity,
}

impl MotionMode {
    pub fn as_key(&self) -> &'static str {
        match self {
            MotionMode::Absolute => "abs",
            MotionMode::Relative => "rel",
            MotionMode::Velocity => "vel",
        }
    }
}

impl Display for MotionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for MotionMode {
    type Err = SensorimotorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abs" => Ok(MotionMode::Absolute),
            "rel" => Ok(MotionMode::Relative),
            "vel" => Ok(MotionMode::Velocity),
            _ => Err(SensorimotorError::InvalidMotionMode(s.to_string())),
        }
    }
}

/// Motion modes that can carry a population code. Velocities are never population coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationMotion {
    Absolute,
    Relative,
}

impl From<PopulationMotion> for MotionMode {
    fn from(motion: PopulationMotion) -> Self {
        match motion {
            PopulationMotion::Absolute => MotionMode::Absolute,
            PopulationMotion::Relative => MotionMode::Relative,
        }
    }
}

impl TryFrom<MotionMode> for PopulationMotion {
    type Error = SensorimotorError;

    fn try_from(mode: MotionMode) -> Result<Self, Self::Error> {
        match mode {
            MotionMode::Absolute => Ok(PopulationMotion::Absolute),
            MotionMode::Relative => Ok(PopulationMotion::Relative),
            MotionMode::Velocity => Err(SensorimotorError::InvalidMotionMode(format!(
                "{} cannot be population coded",
                mode
            ))),
        }
    }
}

/// Joints addressed by a settings call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointTarget {
    All,
    One(usize),
}

//endregion

/// Moves the joints of one robot part from plain values or population codes.
///
/// Every joint carries a [`JointCoding`], so absolute and relative populations are
/// decoded against their own layouts.
#[derive(Debug)]
pub struct JointWriter {
    part: RobotPart,
    resolution: CodingResolution,
    settings: WriterSettings,
    codings: Vec<JointCoding>,
    control_modes: Vec<ControlMode>,
    actuator: Box<dyn JointActuator>,
}

impl JointWriter {
    /// Sets reference accelerations and speeds of all joints and switches them to position control.
    pub fn new(
        part: RobotPart,
        resolution: CodingResolution,
        settings: WriterSettings,
        actuator: Box<dyn JointActuator>,
    ) -> SensorimotorResult<Self> {
        Self::build(part, resolution, settings, actuator, None)
    }

    /// Validates `config`, then takes the resolution from `[population]` and the motion settings from `[joint_writer]`
    pub fn from_config(
        part: RobotPart,
        config: &AnnIcubConfig,
        actuator: Box<dyn JointActuator>,
    ) -> SensorimotorResult<Self> {
        annicub_config::validate_config(config)?;
        let resolution = CodingResolution::from_selectors(
            config.population.population_size,
            config.population.deg_per_neuron,
        )?;
        let settings = WriterSettings::from(&config.joint_writer);
        Self::build(part, resolution, settings, actuator, Some(config))
    }

    fn build(
        part: RobotPart,
        resolution: CodingResolution,
        settings: WriterSettings,
        mut actuator: Box<dyn JointActuator>,
        fallback: Option<&AnnIcubConfig>,
    ) -> SensorimotorResult<Self> {
        if settings.velocity_max <= 0.0 || settings.acceleration_max <= 0.0 {
            return Err(SensorimotorError::InvalidParameter(
                "velocity_max and acceleration_max must be positive".to_string(),
            ));
        }
        check_bound("speed", settings.speed, settings.velocity_max)?;
        check_bound("acceleration", settings.acceleration, settings.acceleration_max)?;

        let ranges = resolve_joint_ranges(part, &*actuator, fallback)?;
        let codings = ranges
            .iter()
            .map(|range| JointCoding::derive(*range, resolution))
            .collect::<SensorimotorResult<Vec<_>>>()?;

        for joint in 0..codings.len() {
            actuator.set_ref_acceleration(joint, settings.acceleration)?;
            actuator.set_ref_speed(joint, settings.speed)?;
            actuator.set_control_mode(joint, ControlMode::Position)?;
        }

        tracing::info!(
            %part,
            joints = codings.len(),
            %resolution,
            speed = settings.speed,
            "joint writer initialized"
        );

        Ok(JointWriter {
            part,
            resolution,
            settings,
            control_modes: vec![ControlMode::Position; codings.len()],
            codings,
            actuator,
        })
    }

    pub fn identifier(&self) -> String {
        format!("JointWriter: {}", self.part)
    }

    pub fn part(&self) -> RobotPart {
        self.part
    }

    pub fn joint_count(&self) -> usize {
        self.codings.len()
    }

    pub fn settings(&self) -> &WriterSettings {
        &self.settings
    }

    pub fn joint_coding(&self, joint: usize) -> SensorimotorResult<&JointCoding> {
        self.codings.get(joint).ok_or(SensorimotorError::JointOutOfRange {
            joint,
            joints: self.codings.len(),
        })
    }

    /// Achieved resolution of the absolute layouts, in degrees per neuron
    pub fn joints_deg_res(&self) -> Vec<f64> {
        self.codings.iter().map(|coding| coding.absolute().step_size()).collect()
    }

    /// Neuron count of the absolute layouts
    pub fn neurons_per_joint(&self) -> Vec<usize> {
        self.neurons_per_joint_for(PopulationMotion::Absolute)
    }

    pub fn neurons_per_joint_for(&self, motion: PopulationMotion) -> Vec<usize> {
        self.codings
            .iter()
            .map(|coding| match motion {
                PopulationMotion::Absolute => coding.absolute().neuron_count(),
                PopulationMotion::Relative => coding.relative().neuron_count(),
            })
            .collect()
    }

    pub fn control_mode(&self, joint: usize) -> SensorimotorResult<ControlMode> {
        self.control_modes
            .get(joint)
            .copied()
            .ok_or(SensorimotorError::JointOutOfRange {
                joint,
                joints: self.control_modes.len(),
            })
    }

    //region Joint settings

    /// Reference speed used by position moves, in `(0, velocity_max]`
    pub fn set_joint_velocity(&mut self, speed: f64, target: JointTarget) -> SensorimotorResult<()> {
        check_bound("speed", speed, self.settings.velocity_max)?;
        for joint in self.target_joints(target)? {
            self.actuator.set_ref_speed(joint, speed)?;
        }
        Ok(())
    }

    /// Reference acceleration, in `(0, acceleration_max]`
    pub fn set_joint_acceleration(&mut self, acceleration: f64, target: JointTarget) -> SensorimotorResult<()> {
        check_bound("acceleration", acceleration, self.settings.acceleration_max)?;
        for joint in self.target_joints(target)? {
            self.actuator.set_ref_acceleration(joint, acceleration)?;
        }
        Ok(())
    }

    /// Switch control mode. Joints are stopped on the way in and out of velocity control.
    pub fn set_joint_control_mode(&mut self, mode: ControlMode, target: JointTarget) -> SensorimotorResult<()> {
        for joint in self.target_joints(target)? {
            match mode {
                ControlMode::Position => {
                    if self.control_modes[joint] == ControlMode::Velocity {
                        self.actuator.stop(joint)?;
                    }
                    self.actuator.set_control_mode(joint, ControlMode::Position)?;
                }
                ControlMode::Velocity => {
                    self.actuator.set_control_mode(joint, ControlMode::Velocity)?;
                    self.actuator.stop(joint)?;
                }
            }
            self.control_modes[joint] = mode;
            tracing::debug!(part = %self.part, joint, ?mode, "control mode changed");
        }
        Ok(())
    }

    fn target_joints(&self, target: JointTarget) -> SensorimotorResult<Vec<usize>> {
        match target {
            JointTarget::All => Ok((0..self.joint_count()).collect()),
            JointTarget::One(joint) => {
                check_joints(&[joint], self.joint_count())?;
                Ok(vec![joint])
            }
        }
    }

    //endregion

    //region Plain values

    pub fn write_double_all(&mut self, values: &[f64], mode: MotionMode, blocking: bool) -> SensorimotorResult<()> {
        if values.len() != self.joint_count() {
            return Err(SensorimotorError::JointCountMismatch {
                expected: self.joint_count(),
                actual: values.len(),
            });
        }
        let joints: Vec<usize> = (0..self.joint_count()).collect();
        self.move_joints(&joints, values, mode, blocking)
    }

    pub fn write_double_multiple(
        &mut self,
        values: &[f64],
        joints: &[usize],
        mode: MotionMode,
        blocking: bool,
    ) -> SensorimotorResult<()> {
        check_joints(joints, self.joint_count())?;
        if values.len() != joints.len() {
            return Err(SensorimotorError::JointCountMismatch {
                expected: joints.len(),
                actual: values.len(),
            });
        }
        self.move_joints(joints, values, mode, blocking)
    }

    pub fn write_double_one(&mut self, value: f64, joint: usize, mode: MotionMode, blocking: bool) -> SensorimotorResult<()> {
        check_joints(&[joint], self.joint_count())?;
        self.move_joints(&[joint], &[value], mode, blocking)
    }

    //endregion

    //region Population codes

    pub fn write_pop_all(
        &mut self,
        populations: &[Vec<f64>],
        motion: PopulationMotion,
        blocking: bool,
    ) -> SensorimotorResult<()> {
        if populations.len() != self.joint_count() {
            return Err(SensorimotorError::JointCountMismatch {
                expected: self.joint_count(),
                actual: populations.len(),
            });
        }
        let joints: Vec<usize> = (0..self.joint_count()).collect();
        let values = self.decode_selection(populations, &joints, motion)?;
        self.move_joints(&joints, &values, motion.into(), blocking)
    }

    pub fn write_pop_multiple(
        &mut self,
        populations: &[Vec<f64>],
        joints: &[usize],
        motion: PopulationMotion,
        blocking: bool,
    ) -> SensorimotorResult<()> {
        check_joints(joints, self.joint_count())?;
        if populations.len() != joints.len() {
            return Err(SensorimotorError::JointCountMismatch {
                expected: joints.len(),
                actual: populations.len(),
            });
        }
        let values = self.decode_selection(populations, joints, motion)?;
        self.move_joints(joints, &values, motion.into(), blocking)
    }

    pub fn write_pop_one(
        &mut self,
        population: &[f64],
        joint: usize,
        motion: PopulationMotion,
        blocking: bool,
    ) -> SensorimotorResult<()> {
        check_joints(&[joint], self.joint_count())?;
        let value = self.decode(population, joint, motion)?;
        self.move_joints(&[joint], &[value], motion.into(), blocking)
    }

    /// Decode an absolute population of `joint` into an angle, without moving anything
    pub fn decode_absolute(&self, population: &[f64], joint: usize) -> SensorimotorResult<f64> {
        self.decode(population, joint, PopulationMotion::Absolute)
    }

    /// Decode a relative population of `joint` into a displacement, without moving anything
    pub fn decode_relative(&self, population: &[f64], joint: usize) -> SensorimotorResult<f64> {
        self.decode(population, joint, PopulationMotion::Relative)
    }

    fn decode(&self, population: &[f64], joint: usize, motion: PopulationMotion) -> SensorimotorResult<f64> {
        let coding = self.joint_coding(joint)?;
        let value = match motion {
            PopulationMotion::Absolute => decode_population(population, coding.absolute())?,
            PopulationMotion::Relative => decode_population(population, coding.relative())?,
        };
        if value.is_nan() {
            tracing::warn!(part = %self.part, joint, "invalid joint angle in population code");
            return Err(SensorimotorError::InvalidPopulationCode { joint });
        }
        Ok(value)
    }

    fn decode_selection(
        &self,
        populations: &[Vec<f64>],
        joints: &[usize],
        motion: PopulationMotion,
    ) -> SensorimotorResult<Vec<f64>> {
        populations
            .iter()
            .zip(joints)
            .map(|(population, joint)| self.decode(population, *joint, motion))
            .collect()
    }

    //endregion

    /// Apply a flat transport payload to the selected joints
    ///
    /// With `encoded`, `values` holds the populations of the selection concatenated
    /// in order, each as long as the joint's layout for `mode`.
    pub fn accept(
        &mut self,
        selection: &JointSelection,
        values: &[f64],
        encoded: bool,
        mode: MotionMode,
        blocking: bool,
    ) -> SensorimotorResult<()> {
        let joints = selection.resolve(self.joint_count())?;
        if !encoded {
            return match selection {
                JointSelection::All => self.write_double_all(values, mode, blocking),
                _ => self.write_double_multiple(values, &joints, mode, blocking),
            };
        }

        let motion = PopulationMotion::try_from(mode)?;
        let counts = self.neurons_per_joint_for(motion);
        let lengths: Vec<usize> = joints.iter().map(|joint| counts[*joint]).collect();
        let populations = split_populations(values, &lengths)?;
        self.write_pop_multiple(&populations, &joints, motion, blocking)
    }

    /// Whether the last position move has finished
    pub fn motion_done(&mut self) -> SensorimotorResult<bool> {
        self.actuator.check_motion_done()
    }

    fn move_joints(&mut self, joints: &[usize], values: &[f64], mode: MotionMode, blocking: bool) -> SensorimotorResult<()> {
        if let Some(index) = values.iter().position(|value| value.is_nan()) {
            tracing::warn!(part = %self.part, joint = joints[index], %mode, "rejecting NaN joint value");
            return Err(SensorimotorError::InvalidParameter(format!(
                "value for joint {} is NaN",
                joints[index]
            )));
        }
        let required = match mode {
            MotionMode::Velocity => ControlMode::Velocity,
            MotionMode::Absolute | MotionMode::Relative => ControlMode::Position,
        };
        if let Some(joint) = joints.iter().find(|joint| self.control_modes[**joint] != required) {
            tracing::warn!(part = %self.part, joint, %mode, "motion mode does not fit control mode");
            return Err(SensorimotorError::ControlModeMismatch { joint: *joint });
        }

        match mode {
            MotionMode::Absolute => {
                let targets: Vec<f64> = joints
                    .iter()
                    .zip(values)
                    .map(|(joint, value)| self.codings[*joint].range().clamp(*value))
                    .collect();
                self.actuator.position_move(joints, &targets)?;
            }
            MotionMode::Relative => {
                let identifier = self.identifier();
                let actuator = &mut self.actuator;
                let current = poll_frame(&identifier, || actuator.read_encoders())?;
                if current.len() != self.codings.len() {
                    return Err(SensorimotorError::JointCountMismatch {
                        expected: self.codings.len(),
                        actual: current.len(),
                    });
                }
                let deltas: Vec<f64> = joints
                    .iter()
                    .zip(values)
                    .map(|(joint, delta)| self.codings[*joint].range().clamp_displacement(current[*joint], *delta))
                    .collect();
                self.actuator.relative_move(joints, &deltas)?;
            }
            MotionMode::Velocity => {
                let limit = self.settings.velocity_max;
                let velocities: Vec<f64> = values.iter().map(|value| value.clamp(-limit, limit)).collect();
                self.actuator.velocity_move(joints, &velocities)?;
            }
        }

        if blocking {
            self.wait_for_motion()?;
        }
        Ok(())
    }

    fn wait_for_motion(&mut self) -> SensorimotorResult<()> {
        while !self.actuator.check_motion_done().map_err(|err| {
            tracing::error!(part = %self.part, %err, "communication error while moving");
            err
        })? {
            std::thread::sleep(MOTION_POLL_INTERVAL);
        }
        Ok(())
    }

    /// Construction parameters, as stored when saving a robot description
    pub fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "JointWriter",
            "part": self.part,
            "resolution": self.resolution,
            "settings": self.settings,
            "neurons_per_joint": self.neurons_per_joint(),
        })
    }
}

fn check_bound(name: &str, value: f64, max: f64) -> SensorimotorResult<()> {
    if value > 0.0 && value <= max {
        Ok(())
    } else {
        Err(SensorimotorError::InvalidParameter(format!(
            "{} {} is outside (0, {}]",
            name, value, max
        )))
    }
}
