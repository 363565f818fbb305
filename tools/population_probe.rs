// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Population layout probe.
//!
//! Derives the absolute and relative layouts of one quantity, encodes a value,
//! decodes it again and prints the result as JSON. Sigma and resolution default
//! to the `[population]` section of the configuration file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use annicub::config::{load_config, validate_config, AnnIcubConfig};
use annicub::observability::{init_console_logging, CrateDebugFlags, LogFormat, LoggingOptions};
use annicub::probe::{run_probe, ProbeRequest};
use annicub::sensorimotor::population_coding::CodingResolution;

/// Print the population layout and round-trip error of one quantity
#[derive(Parser, Debug)]
#[command(name = "population_probe", version, author, long_about = None)]
struct Args {
    /// Lower bound of the quantity
    #[arg(long, allow_hyphen_values = true)]
    min: f64,

    /// Upper bound of the quantity
    #[arg(long, allow_hyphen_values = true)]
    max: f64,

    /// Value to encode
    #[arg(long, allow_hyphen_values = true)]
    value: f64,

    /// Neuron count per quantity (overrides the configured selectors)
    #[arg(long)]
    population_size: Option<u32>,

    /// Degrees per neuron (used when no population size is given)
    #[arg(long)]
    deg_per_neuron: Option<f64>,

    /// Tuning width
    #[arg(long)]
    sigma: Option<f64>,

    /// Configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Per-crate debug flags, e.g. --debug-annicub-sensorimotor or --debug-all
    #[arg(long = "debug", value_name = "CRATE")]
    debug: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let config = load_config(Some(path), None)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            validate_config(&config).context("invalid configuration")?;
            config
        }
        None => AnnIcubConfig::default(),
    };

    let flags = CrateDebugFlags::from_args(args.debug.iter().map(|name| format!("--debug-{}", name)));
    let options = LoggingOptions {
        level: config.logging.level.clone(),
        format: if args.json_logs { LogFormat::Json } else { LogFormat::Text },
        ..LoggingOptions::default()
    };
    init_console_logging(&flags, &options)?;

    let resolution = match (args.population_size, args.deg_per_neuron) {
        (Some(size), _) => CodingResolution::from_selectors(size, 0.0)?,
        (None, Some(deg_per_neuron)) => CodingResolution::from_selectors(0, deg_per_neuron)?,
        (None, None) => CodingResolution::from_selectors(
            config.population.population_size,
            config.population.deg_per_neuron,
        )?,
    };

    let request = ProbeRequest {
        min: args.min,
        max: args.max,
        resolution,
        sigma: args.sigma.unwrap_or(config.population.sigma),
        value: args.value,
    };
    tracing::info!(?request, "probing population layout");

    let report = run_probe(&request)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
