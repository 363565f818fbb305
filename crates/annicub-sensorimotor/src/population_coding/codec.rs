// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Gaussian population encoder and weighted-centroid decoder.

use super::range_model::RangeModel;
use crate::error::{SensorimotorError, SensorimotorResult};
use serde::Serialize;

pub const DEFAULT_SIGMA: f64 = 1.5;

/// Tuning width (sigma) shared by every neuron of a population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TuningWidth(f64);

impl TuningWidth {
    pub fn new(sigma: f64) -> SensorimotorResult<Self> {
        if sigma.is_finite() && sigma > 0.0 {
            Ok(TuningWidth(sigma))
        } else {
            Err(SensorimotorError::InvalidSigma(sigma))
        }
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Default for TuningWidth {
    fn default() -> Self {
        TuningWidth(DEFAULT_SIGMA)
    }
}

/// Unnormalized Gaussian tuning curve, peaking at exactly 1.0 when `value == preferred`.
#[inline]
pub fn gaussian_response(preferred: f64, value: f64, sigma: f64) -> f64 {
    let a = (preferred - value) / sigma;
    (-0.5 * a * a).exp()
}

/// Firing-rate weighted centroid of the preferred values of `model`.
///
/// An all-zero population yields `NaN` (0 / 0). Callers must check the result with
/// [`f64::is_nan`] and reject the command; there is no fallback value.
///
/// # Errors
/// [`SensorimotorError::PopulationLengthMismatch`] if `population` does not have one
/// entry per neuron of `model`.
pub fn decode_population<R: RangeModel + ?Sized>(population: &[f64], model: &R) -> SensorimotorResult<f64> {
    let preferred = model.preferred_values();
    if population.len() != preferred.len() {
        return Err(SensorimotorError::PopulationLengthMismatch {
            expected: preferred.len(),
            actual: population.len(),
        });
    }

    let mut sum_weighted: f64 = 0.0;
    let mut sum_rates: f64 = 0.0;
    for (rate, value) in population.iter().zip(preferred) {
        sum_weighted += rate * value;
        sum_rates += rate;
    }
    Ok(sum_weighted / sum_rates)
}

/// Encodes scalars into populations and back, for one fixed tuning width.
///
/// Stateless: a single codec may be shared across threads and used with any
/// number of range models.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct PopulationCodec {
    sigma: TuningWidth,
}

impl PopulationCodec {
    pub fn new(sigma: TuningWidth) -> Self {
        PopulationCodec { sigma }
    }

    pub fn with_sigma(sigma: f64) -> SensorimotorResult<Self> {
        Ok(PopulationCodec::new(TuningWidth::new(sigma)?))
    }

    pub fn sigma(&self) -> TuningWidth {
        self.sigma
    }

    /// One Gaussian response per neuron of `model`
    pub fn encode<R: RangeModel + ?Sized>(&self, value: f64, model: &R) -> Vec<f64> {
        let mut population = Vec::with_capacity(model.neuron_count());
        self.encode_into(value, model, &mut population);
        population
    }

    /// Like [`encode`](Self::encode), reusing `target`'s allocation. `target` gets cleared.
    pub fn encode_into<R: RangeModel + ?Sized>(&self, value: f64, model: &R, target: &mut Vec<f64>) {
        let sigma = self.sigma.get();
        target.clear();
        target.extend(
            model
                .preferred_values()
                .iter()
                .map(|preferred| gaussian_response(*preferred, value, sigma)),
        );
    }

    /// See [`decode_population`]; the tuning width does not affect decoding.
    pub fn decode<R: RangeModel + ?Sized>(&self, population: &[f64], model: &R) -> SensorimotorResult<f64> {
        decode_population(population, model)
    }
}
