//! In-memory robot part shared by the integration tests

#![allow(dead_code)]

use annicub_sensorimotor::devices::{ControlMode, JointActuator, JointEncoders};
use annicub_sensorimotor::{SensorimotorError, SensorimotorResult};
use std::sync::{Arc, Mutex};

/// Route module logs through the test harness; repeated calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Position(Vec<usize>, Vec<f64>),
    Relative(Vec<usize>, Vec<f64>),
    Velocity(Vec<usize>, Vec<f64>),
    Stop(usize),
    Mode(usize, ControlMode),
}

#[derive(Debug, Default)]
pub struct PartState {
    pub limits: Vec<(f64, f64)>,
    pub angles: Vec<f64>,
    pub commands: Vec<Command>,
    pub ref_speeds: Vec<f64>,
    pub ref_accelerations: Vec<f64>,
    /// Encoder reads answered with "no frame" before data arrives
    pub missing_frames: usize,
    /// `check_motion_done` calls answered with `false` before the motion finishes
    pub motion_polls: usize,
    pub motion_checks: usize,
    pub limits_unavailable: bool,
    pub motion_fails: bool,
}

#[derive(Debug, Clone)]
pub struct FakePart {
    pub state: Arc<Mutex<PartState>>,
}

impl FakePart {
    pub fn new(limits: &[(f64, f64)]) -> Self {
        let state = PartState {
            limits: limits.to_vec(),
            angles: limits.iter().map(|(min, max)| (min + max) / 2.0).collect(),
            ref_speeds: vec![0.0; limits.len()],
            ref_accelerations: vec![0.0; limits.len()],
            ..PartState::default()
        };
        FakePart {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Six joints of a head with the usual simulator limits
    pub fn head() -> Self {
        Self::new(&[(-40.0, 30.0), (-70.0, 60.0), (-55.0, 55.0), (-35.0, 15.0), (-50.0, 52.0), (0.0, 90.0)])
    }

    pub fn set_angles(&self, angles: &[f64]) {
        self.state.lock().unwrap().angles = angles.to_vec();
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn last_command(&self) -> Option<Command> {
        self.state.lock().unwrap().commands.last().cloned()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut PartState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

impl JointEncoders for FakePart {
    fn joint_count(&self) -> usize {
        self.state.lock().unwrap().limits.len()
    }

    fn joint_limits(&self, joint: usize) -> SensorimotorResult<(f64, f64)> {
        let state = self.state.lock().unwrap();
        if state.limits_unavailable {
            return Err(SensorimotorError::Hardware("limits not available".to_string()));
        }
        Ok(state.limits[joint])
    }

    fn read_encoders(&mut self) -> SensorimotorResult<Option<Vec<f64>>> {
        let mut state = self.state.lock().unwrap();
        if state.missing_frames > 0 {
            state.missing_frames -= 1;
            return Ok(None);
        }
        Ok(Some(state.angles.clone()))
    }

    fn read_encoder(&mut self, joint: usize) -> SensorimotorResult<Option<f64>> {
        let mut state = self.state.lock().unwrap();
        if state.missing_frames > 0 {
            state.missing_frames -= 1;
            return Ok(None);
        }
        Ok(Some(state.angles[joint]))
    }
}

impl JointActuator for FakePart {
    fn position_move(&mut self, joints: &[usize], targets: &[f64]) -> SensorimotorResult<()> {
        let mut state = self.state.lock().unwrap();
        for (joint, target) in joints.iter().zip(targets) {
            state.angles[*joint] = *target;
        }
        state.commands.push(Command::Position(joints.to_vec(), targets.to_vec()));
        Ok(())
    }

    fn relative_move(&mut self, joints: &[usize], deltas: &[f64]) -> SensorimotorResult<()> {
        let mut state = self.state.lock().unwrap();
        for (joint, delta) in joints.iter().zip(deltas) {
            state.angles[*joint] += *delta;
        }
        state.commands.push(Command::Relative(joints.to_vec(), deltas.to_vec()));
        Ok(())
    }

    fn velocity_move(&mut self, joints: &[usize], velocities: &[f64]) -> SensorimotorResult<()> {
        let mut state = self.state.lock().unwrap();
        state.commands.push(Command::Velocity(joints.to_vec(), velocities.to_vec()));
        Ok(())
    }

    fn set_ref_speed(&mut self, joint: usize, speed: f64) -> SensorimotorResult<()> {
        self.state.lock().unwrap().ref_speeds[joint] = speed;
        Ok(())
    }

    fn set_ref_acceleration(&mut self, joint: usize, acceleration: f64) -> SensorimotorResult<()> {
        self.state.lock().unwrap().ref_accelerations[joint] = acceleration;
        Ok(())
    }

    fn set_control_mode(&mut self, joint: usize, mode: ControlMode) -> SensorimotorResult<()> {
        self.state.lock().unwrap().commands.push(Command::Mode(joint, mode));
        Ok(())
    }

    fn stop(&mut self, joint: usize) -> SensorimotorResult<()> {
        self.state.lock().unwrap().commands.push(Command::Stop(joint));
        Ok(())
    }

    fn check_motion_done(&mut self) -> SensorimotorResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.motion_fails {
            return Err(SensorimotorError::Hardware("communication error".to_string()));
        }
        state.motion_checks += 1;
        if state.motion_polls > 0 {
            state.motion_polls -= 1;
            return Ok(false);
        }
        Ok(true)
    }
}
