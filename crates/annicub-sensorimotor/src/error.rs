// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by the population coding core and the device modules.

/// Errors raised by population coding and the reader/writer modules.
///
/// Configuration errors (`InvalidRange`, `InvalidResolution`, `InvalidSigma`,
/// `EmptyPopulation`, `InvalidPartKey`, `InvalidConfiguration`) are only produced while a module is
/// constructed. Everything else is reported per call and leaves the module usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SensorimotorError {
    #[error("Invalid range [{min}, {max}]: {reason}")]
    InvalidRange { min: f64, max: f64, reason: String },

    #[error("Invalid population resolution: {0}")]
    InvalidResolution(String),

    #[error("Invalid sigma {0}: must be a positive, finite number")]
    InvalidSigma(f64),

    #[error("Population layout for span {span} with {resolution} yields no neurons")]
    EmptyPopulation { span: f64, resolution: String },

    #[error("Population length mismatch: expected {expected} neurons, got {actual}")]
    PopulationLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid joint angle in population code for joint {joint}")]
    InvalidPopulationCode { joint: usize },

    #[error("Selected joint <{joint}> is out of range (joint count {joints})")]
    JointOutOfRange { joint: usize, joints: usize },

    #[error("Joint count mismatch: expected {expected} values, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    #[error("'{0}' is an invalid robot part key")]
    InvalidPartKey(String),

    #[error("'{0}' is not a valid motion mode")]
    InvalidMotionMode(String),

    #[error("'{0}' is not a valid control mode")]
    InvalidControlMode(String),

    #[error("Motion mode does not fit with control mode of joint {joint}; use velocity control for velocity motion")]
    ControlModeMismatch { joint: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Module '{0}' is already registered")]
    ModuleAlreadyRegistered(String),

    #[error("Module '{0}' is not registered")]
    ModuleNotFound(String),

    #[error("Module '{name}' is not a {expected}")]
    ModuleKindMismatch { name: String, expected: &'static str },

    #[error("Hardware error: {0}")]
    Hardware(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SensorimotorError {
    fn from(err: serde_json::Error) -> Self {
        SensorimotorError::Serialization(err.to_string())
    }
}

impl From<annicub_config::ConfigError> for SensorimotorError {
    fn from(err: annicub_config::ConfigError) -> Self {
        SensorimotorError::InvalidConfiguration(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type SensorimotorResult<T> = Result<T, SensorimotorError>;
