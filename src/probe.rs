// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Layout and round-trip report for a single quantity, used by the `population_probe` tool.

use crate::sensorimotor::population_coding::{
    CodingResolution, JointCoding, PopulationCodec, QuantityRange, RangeModel,
};
use crate::sensorimotor::SensorimotorResult;
use serde::Serialize;

/// Quantity and coding parameters to probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRequest {
    pub min: f64,
    pub max: f64,
    pub resolution: CodingResolution,
    pub sigma: f64,
    /// Encoded as an angle against the absolute layout and as a displacement against the relative one
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    pub neuron_count: usize,
    pub step_size: f64,
    pub first_preferred: f64,
    pub last_preferred: f64,
    /// Index of the most active neuron
    pub peak_neuron: usize,
    pub peak_rate: f64,
    pub decoded: f64,
    pub error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub range: QuantityRange,
    pub span: f64,
    pub resolution: CodingResolution,
    pub sigma: f64,
    pub value: f64,
    pub absolute: LayoutReport,
    pub relative: LayoutReport,
}

pub fn run_probe(request: &ProbeRequest) -> SensorimotorResult<ProbeReport> {
    let range = QuantityRange::new(request.min, request.max)?;
    let coding = JointCoding::derive(range, request.resolution)?;
    let codec = PopulationCodec::with_sigma(request.sigma)?;

    Ok(ProbeReport {
        range,
        span: range.span(),
        resolution: request.resolution,
        sigma: request.sigma,
        value: request.value,
        absolute: layout_report(&codec, coding.absolute(), request.value)?,
        relative: layout_report(&codec, coding.relative(), request.value)?,
    })
}

fn layout_report<R: RangeModel>(codec: &PopulationCodec, model: &R, value: f64) -> SensorimotorResult<LayoutReport> {
    let population = codec.encode(value, model);
    let (peak_neuron, peak_rate) = population
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::MIN), |best, (i, rate)| if rate > best.1 { (i, rate) } else { best });
    let decoded = codec.decode(&population, model)?;
    let preferred = model.preferred_values();

    Ok(LayoutReport {
        neuron_count: model.neuron_count(),
        step_size: model.step_size(),
        first_preferred: preferred.first().copied().unwrap_or(f64::NAN),
        last_preferred: preferred.last().copied().unwrap_or(f64::NAN),
        peak_neuron,
        peak_rate,
        decoded,
        error: decoded - value,
    })
}
