// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # annicub-observability
//!
//! Logging infrastructure for the ANN iCub interface crates.
//!
//! Provides consistent `tracing` setup across all crates with per-crate
//! debug flag support.
//!
//! ## Features
//! - `file-logging`: Per-run log folders with daily rotation and retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "annicub",
    "annicub-config",
    "annicub-sensorimotor",
    "annicub-observability",
];

/// Convert a crate name into the target used by `tracing` (`-` becomes `_`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
