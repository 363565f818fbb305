// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization
//!
//! Console logging is always available. With the `file-logging` feature,
//! [`init_logging`] additionally writes JSON logs into a timestamped run folder
//! with daily rotation and a retention policy.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingOptions};

/// Build the `EnvFilter` for the given flags and base level
pub fn build_env_filter(debug_flags: &CrateDebugFlags, base_level: &str) -> Result<EnvFilter> {
    let filter = debug_flags.to_filter_string(base_level);
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Initialize console-only logging on stderr
///
/// Fails if a global subscriber is already installed.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<()> {
    let env_filter = build_env_filter(debug_flags, &options.level)?;

    let console_layer = match options.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    };

    Registry::default()
        .with(console_layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    Ok(())
}

#[cfg(feature = "file-logging")]
pub use file::{init_logging, LoggingGuard};

#[cfg(feature = "file-logging")]
mod file {
    use super::*;
    use chrono::{NaiveDateTime, Utc};
    use std::path::{Path, PathBuf};
    use tracing_appender::rolling;

    /// Logging initialization result
    pub struct LoggingGuard {
        _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// Get the log directory path
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Initialize logging with file output and console output
    ///
    /// Creates a timestamped folder structure:
    /// ```text
    /// ./logs/
    ///   └── run_20250101_120000/
    ///       ├── annicub-sensorimotor.log
    ///       ├── annicub-config.log
    ///       └── annicub.log (combined)
    /// ```
    pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let run_folder = options.log_dir.join(format!("run_{}", timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(&options.log_dir, options.retention_days, options.retention_runs)?;

        let env_filter = build_env_filter(debug_flags, &options.level)?;

        let mut layers = Vec::new();
        let mut file_guards = Vec::new();

        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(env_filter.clone());
        layers.push(console_layer.boxed());

        // One file per crate
        for crate_name in crate::KNOWN_CRATES {
            let file_appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            file_guards.push(guard);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::new(format!("{}=debug", crate::crate_target(crate_name))))
                .boxed();

            layers.push(file_layer);
        }

        let combined_appender = rolling::daily(&run_folder, "annicub.log");
        let (combined_non_blocking, combined_guard) = tracing_appender::non_blocking(combined_appender);

        let combined_layer = tracing_subscriber::fmt::layer()
            .with_writer(combined_non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(env_filter)
            .boxed();

        layers.push(combined_layer);

        Registry::default()
            .with(layers)
            .try_init()
            .context("Failed to install global tracing subscriber")?;

        // Guards flush logs on drop
        file_guards.push(combined_guard);

        Ok(LoggingGuard {
            _file_guards: file_guards,
            log_dir: run_folder,
        })
    }

    /// Clean up old run folders based on retention policy
    pub(crate) fn cleanup_old_logs(base_log_dir: &Path, retention_days: u64, retention_runs: usize) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }

        let cutoff_date = Utc::now().naive_utc() - chrono::Duration::days(retention_days as i64);

        let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(timestamp_str) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix("run_"))
            else {
                continue;
            };
            if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp_str, "%Y%m%d_%H%M%S") {
                runs.push((path, dt));
            }
        }

        // Oldest first
        runs.sort_by_key(|(_, dt)| *dt);

        let (expired, mut kept): (Vec<_>, Vec<_>) = runs.into_iter().partition(|(_, dt)| *dt < cutoff_date);
        for (path, _) in &expired {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e);
            }
        }

        if kept.len() > retention_runs {
            let to_remove = kept.len() - retention_runs;
            for (path, _) in kept.drain(..to_remove) {
                if let Err(e) = std::fs::remove_dir_all(&path) {
                    eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e);
                }
            }
        }

        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_env_filter_accepts_flags() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-annicub-sensorimotor".to_string()]);
        assert!(build_env_filter(&flags, "warn").is_ok());
    }

    #[test]
    fn test_console_logging_installs_once() {
        let options = LoggingOptions::default();
        let flags = CrateDebugFlags::default();
        let first = init_console_logging(&flags, &options);
        let second = init_console_logging(&flags, &options);
        assert!(first.is_ok());
        assert!(second.is_err());
    }
}
