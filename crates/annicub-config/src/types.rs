// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `annicub_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnIcubConfig {
    pub general: GeneralConfig,
    pub population: PopulationConfig,
    pub joint_writer: JointWriterConfig,
    pub skin: SkinConfig,
    pub logging: LoggingConfig,
    /// Fallback joint limits per robot part, keyed `joint_<i>_min` / `joint_<i>_max`
    pub joint_limits: BTreeMap<String, BTreeMap<String, f64>>,
}

impl AnnIcubConfig {
    /// Look up the configured limits of one joint of a robot part.
    ///
    /// Returns `None` if either bound is missing.
    pub fn joint_limits_for(&self, part: &str, joint: usize) -> Option<(f64, f64)> {
        let table = self.joint_limits.get(part)?;
        let min = table.get(&format!("joint_{}_min", joint))?;
        let max = table.get(&format!("joint_{}_max", joint))?;
        Some((*min, *max))
    }
}

/// Robot and port naming
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub simulator: bool,
    pub robot_port_prefix: String,
    pub client_port_prefix: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            simulator: true,
            robot_port_prefix: "/icubSim".to_string(),
            client_port_prefix: "/client".to_string(),
        }
    }
}

/// Population coding parameters shared by readers and writers
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Tuning width of every receptive field
    pub sigma: f64,
    /// Neurons per population; 0 means "use `deg_per_neuron`"
    pub population_size: u32,
    /// Degrees per neuron; 0.0 means "use `population_size`"
    pub deg_per_neuron: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            sigma: 1.5,
            population_size: 0,
            deg_per_neuron: 1.0,
        }
    }
}

/// Motion parameters for joint writers
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JointWriterConfig {
    pub speed: f64,
    pub acceleration: f64,
    pub velocity_max: f64,
    pub acceleration_max: f64,
    pub blocking: bool,
}

impl Default for JointWriterConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            acceleration: 50.0,
            velocity_max: 100.0,
            acceleration_max: 100.0,
            blocking: false,
        }
    }
}

/// Tactile sensor settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SkinConfig {
    /// Scale raw taxel values from [0, 255] to [0, 1]
    pub norm_data: bool,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self { norm_data: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
