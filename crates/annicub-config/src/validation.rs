// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are within valid ranges and that the
//! population coding selectors describe a usable neuron layout.

use crate::{AnnIcubConfig, ConfigError, ConfigResult};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Population coding selectors (sigma, population size / resolution)
/// - Joint writer motion limits
/// - Required fields
/// - Joint limit tables
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &AnnIcubConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_population(config, &mut errors);
    validate_joint_writer(config, &mut errors);
    validate_required_fields(config, &mut errors);
    validate_joint_limits(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_population(config: &AnnIcubConfig, errors: &mut Vec<ConfigValidationError>) {
    let population = &config.population;

    if !(population.sigma.is_finite() && population.sigma > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "population.sigma".to_string(),
            reason: "must be a positive number".to_string(),
        });
    }

    if population.deg_per_neuron.is_nan() || population.deg_per_neuron < 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "population.deg_per_neuron".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    if population.population_size == 0 && !(population.deg_per_neuron > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "population".to_string(),
            reason: "either population_size or deg_per_neuron must be positive".to_string(),
        });
    }
}

fn validate_joint_writer(config: &AnnIcubConfig, errors: &mut Vec<ConfigValidationError>) {
    let writer = &config.joint_writer;

    if !(writer.velocity_max > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "joint_writer.velocity_max".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if !(writer.acceleration_max > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "joint_writer.acceleration_max".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if !(writer.speed > 0.0 && writer.speed <= writer.velocity_max) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "joint_writer.speed".to_string(),
            reason: format!("must be in (0, {}]", writer.velocity_max),
        });
    }
    if !(writer.acceleration > 0.0 && writer.acceleration <= writer.acceleration_max) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "joint_writer.acceleration".to_string(),
            reason: format!("must be in (0, {}]", writer.acceleration_max),
        });
    }
}

fn validate_required_fields(config: &AnnIcubConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.general.robot_port_prefix.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "general.robot_port_prefix".to_string(),
        });
    }
    if config.general.client_port_prefix.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "general.client_port_prefix".to_string(),
        });
    }

    if !VALID_LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", VALID_LOG_LEVELS.join(", ")),
        });
    }
}

/// Every configured joint needs both bounds, and they must differ
fn validate_joint_limits(config: &AnnIcubConfig, errors: &mut Vec<ConfigValidationError>) {
    for (part, table) in &config.joint_limits {
        for key in table.keys() {
            let Some(joint) = key
                .strip_prefix("joint_")
                .and_then(|rest| rest.strip_suffix("_min").or_else(|| rest.strip_suffix("_max")))
                .and_then(|index| index.parse::<usize>().ok())
            else {
                errors.push(ConfigValidationError::InvalidValue {
                    field: format!("joint_limits.{}.{}", part, key),
                    reason: "expected key of the form joint_<i>_min or joint_<i>_max".to_string(),
                });
                continue;
            };

            match config.joint_limits_for(part, joint) {
                None => errors.push(ConfigValidationError::MissingRequired {
                    field: format!("joint_limits.{}.joint_{}_min/max", part, joint),
                }),
                Some((min, max)) if min == max => {
                    // Reported once, on the `_min` key
                    if key.ends_with("_min") {
                        errors.push(ConfigValidationError::InvalidValue {
                            field: format!("joint_limits.{}.joint_{}", part, joint),
                            reason: "min and max must differ".to_string(),
                        });
                    }
                }
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnnIcubConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_sigma() {
        let mut config = AnnIcubConfig::default();
        config.population.sigma = 0.0;

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("population.sigma"));
        }
    }

    #[test]
    fn test_no_usable_selector() {
        let mut config = AnnIcubConfig::default();
        config.population.population_size = 0;
        config.population.deg_per_neuron = 0.0;

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("population_size or deg_per_neuron"));
        }
    }

    #[test]
    fn test_population_size_without_resolution_is_valid() {
        let mut config = AnnIcubConfig::default();
        config.population.population_size = 90;
        config.population.deg_per_neuron = 0.0;

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_speed_above_velocity_max() {
        let mut config = AnnIcubConfig::default();
        config.joint_writer.speed = 150.0;

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("joint_writer.speed"));
        }
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AnnIcubConfig::default();
        config.logging.level = "verbose".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("logging.level"));
        }
    }

    #[test]
    fn test_joint_limits_need_both_bounds() {
        let mut config = AnnIcubConfig::default();
        config
            .joint_limits
            .entry("head".to_string())
            .or_default()
            .insert("joint_0_min".to_string(), -40.0);

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("joint_limits.head.joint_0"));
        }
    }

    #[test]
    fn test_joint_limits_must_differ() {
        let mut config = AnnIcubConfig::default();
        let table = config.joint_limits.entry("torso".to_string()).or_default();
        table.insert("joint_2_min".to_string(), 10.0);
        table.insert("joint_2_max".to_string(), 10.0);

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("min and max must differ"));
        }
    }
}
