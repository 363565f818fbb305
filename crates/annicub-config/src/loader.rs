// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{AnnIcubConfig, ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the configuration file
///
/// Search order:
/// 1. `ANNICUB_CONFIG_PATH` environment variable
/// 2. Current working directory: `./annicub_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("ANNICUB_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by ANNICUB_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet ANNICUB_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<AnnIcubConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: AnnIcubConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `ANNICUB_SIGMA` -> `population.sigma`
/// - `ANNICUB_POPULATION_SIZE` -> `population.population_size`
/// - `ANNICUB_DEG_PER_NEURON` -> `population.deg_per_neuron`
/// - `ANNICUB_ROBOT_PORT_PREFIX` -> `general.robot_port_prefix`
/// - `ANNICUB_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut AnnIcubConfig) {
    if let Ok(value) = env::var("ANNICUB_SIGMA") {
        if let Ok(sigma) = value.parse::<f64>() {
            config.population.sigma = sigma;
        }
    }
    if let Ok(value) = env::var("ANNICUB_POPULATION_SIZE") {
        if let Ok(size) = value.parse::<u32>() {
            config.population.population_size = size;
        }
    }
    if let Ok(value) = env::var("ANNICUB_DEG_PER_NEURON") {
        if let Ok(resolution) = value.parse::<f64>() {
            config.population.deg_per_neuron = resolution;
        }
    }

    if let Ok(value) = env::var("ANNICUB_ROBOT_PORT_PREFIX") {
        config.general.robot_port_prefix = value;
    }

    if let Ok(value) = env::var("ANNICUB_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys use the dotted `section.field` form, e.g.
/// `{"population.sigma": "2.0", "joint_writer.speed": "20"}`.
/// Unparseable values are ignored.
pub fn apply_cli_overrides(config: &mut AnnIcubConfig, cli_args: &HashMap<String, String>) {
    // Population coding
    if let Some(value) = cli_args.get("population.sigma") {
        if let Ok(sigma) = value.parse::<f64>() {
            config.population.sigma = sigma;
        }
    }
    if let Some(value) = cli_args.get("population.population_size") {
        if let Ok(size) = value.parse::<u32>() {
            config.population.population_size = size;
        }
    }
    if let Some(value) = cli_args.get("population.deg_per_neuron") {
        if let Ok(resolution) = value.parse::<f64>() {
            config.population.deg_per_neuron = resolution;
        }
    }

    // Joint writer
    if let Some(value) = cli_args.get("joint_writer.speed") {
        if let Ok(speed) = value.parse::<f64>() {
            config.joint_writer.speed = speed;
        }
    }
    if let Some(value) = cli_args.get("joint_writer.blocking") {
        config.joint_writer.blocking = value.to_lowercase() == "true" || value == "1";
    }

    // General
    if let Some(value) = cli_args.get("general.robot_port_prefix") {
        config.general.robot_port_prefix = value.clone();
    }
    if let Some(value) = cli_args.get("skin.norm_data") {
        config.skin.norm_data = value.to_lowercase() == "true" || value == "1";
    }

    if let Some(value) = cli_args.get("logging.level") {
        config.logging.level = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("ANNICUB_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("ANNICUB_CONFIG_PATH");

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing_file() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("does_not_exist.toml");

        env::set_var("ANNICUB_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("ANNICUB_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::remove_var("ANNICUB_SIGMA");
        env::remove_var("ANNICUB_POPULATION_SIZE");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[population]").unwrap();
        writeln!(file, "sigma = 5.0").unwrap();
        writeln!(file, "population_size = 90").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.population.sigma, 5.0);
        assert_eq!(config.population.population_size, 90);
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = AnnIcubConfig::default();

        env::set_var("ANNICUB_SIGMA", "3.5");
        env::set_var("ANNICUB_POPULATION_SIZE", "not-a-number");
        env::set_var("ANNICUB_ROBOT_PORT_PREFIX", "/icub");

        apply_environment_overrides(&mut config);

        env::remove_var("ANNICUB_SIGMA");
        env::remove_var("ANNICUB_POPULATION_SIZE");
        env::remove_var("ANNICUB_ROBOT_PORT_PREFIX");

        assert_eq!(config.population.sigma, 3.5);
        assert_eq!(config.population.population_size, 0);
        assert_eq!(config.general.robot_port_prefix, "/icub");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = AnnIcubConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("population.deg_per_neuron".to_string(), "2.0".to_string());
        cli_args.insert("joint_writer.blocking".to_string(), "true".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.population.deg_per_neuron, 2.0);
        assert!(config.joint_writer.blocking);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[population]").unwrap();
        writeln!(file, "sigma = 1.0").unwrap();
        writeln!(file, "population_size = 10").unwrap();

        env::set_var("ANNICUB_SIGMA", "2.0");
        env::set_var("ANNICUB_POPULATION_SIZE", "20");

        let mut cli_args = HashMap::new();
        cli_args.insert("population.sigma".to_string(), "4.0".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("ANNICUB_SIGMA");
        env::remove_var("ANNICUB_POPULATION_SIZE");

        // CLI wins for sigma, env wins for population size (no CLI override)
        assert_eq!(config.population.sigma, 4.0);
        assert_eq!(config.population.population_size, 20);
    }
}
