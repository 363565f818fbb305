// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ANN iCub Interface Configuration
//!
//! Type-safe configuration loader for the interface modules with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use annicub_config::{load_config, AnnIcubConfig};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//!
//! println!("Sigma: {}", config.population.sigma);
//! println!("Robot prefix: {}", config.general.robot_port_prefix);
//! ```
//!
//! The population coding selectors `population_size` and `deg_per_neuron`
//! are mutually exclusive: a non-zero population size wins, a zero population
//! size falls back to the per-neuron resolution.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Name of the configuration file searched for on disk
pub const CONFIG_FILE_NAME: &str = "annicub_configuration.toml";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_types_compile() {
        let config = AnnIcubConfig::default();
        assert_eq!(config.population.population_size, 0);
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: ConfigError = toml::from_str::<AnnIcubConfig>("[population")
            .unwrap_err()
            .into();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
