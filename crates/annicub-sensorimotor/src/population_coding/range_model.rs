// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron layouts for population coding.
//!
//! A [`QuantityRange`] plus a [`CodingResolution`] determine how many neurons
//! a population has and which value each neuron prefers. The span of a range is
//! `max - min + 1`, treating the range as inclusive of both endpoints at unit
//! granularity. Existing populations were trained against this layout, so it is
//! kept as is.
//!
//! Absolute and relative layouts are separate types so a population decoded for
//! a relative motion can never be read against the absolute layout by accident.

use crate::error::{SensorimotorError, SensorimotorResult};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Upper bound on the neuron count of a single population
pub const MAX_NEURONS: usize = 1 << 20;

/// How the size of a population is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CodingResolution {
    /// Fixed number of neurons, resolution follows from the span
    PopulationSize(u32),
    /// Fixed degrees (units) per neuron, neuron count follows from the span
    DegreesPerNeuron(f64),
}

impl CodingResolution {
    /// Build from the two mutually exclusive configuration selectors.
    ///
    /// A non-zero `population_size` takes precedence over `deg_per_neuron`.
    pub fn from_selectors(population_size: u32, deg_per_neuron: f64) -> SensorimotorResult<Self> {
        if population_size > 0 {
            Ok(CodingResolution::PopulationSize(population_size))
        } else if deg_per_neuron.is_finite() && deg_per_neuron > 0.0 {
            Ok(CodingResolution::DegreesPerNeuron(deg_per_neuron))
        } else {
            Err(SensorimotorError::InvalidResolution(format!(
                "population_size = {}, deg_per_neuron = {}; one of them must be positive",
                population_size, deg_per_neuron
            )))
        }
    }
}

impl Display for CodingResolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodingResolution::PopulationSize(size) => write!(f, "population size {}", size),
            CodingResolution::DegreesPerNeuron(resolution) => {
                write!(f, "{} degrees per neuron", resolution)
            }
        }
    }
}

/// The physical operating range of one coded quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantityRange {
    min: f64,
    max: f64,
}

impl QuantityRange {
    pub fn new(min: f64, max: f64) -> SensorimotorResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(SensorimotorError::InvalidRange {
                min,
                max,
                reason: "bounds must be finite".to_string(),
            });
        }
        if min == max {
            return Err(SensorimotorError::InvalidRange {
                min,
                max,
                reason: "min and max must differ".to_string(),
            });
        }
        if min > max {
            return Err(SensorimotorError::InvalidRange {
                min,
                max,
                reason: "min must be below max".to_string(),
            });
        }
        // Relative layouts cover twice the span
        if !(2.0 * (max - min + 1.0)).is_finite() {
            return Err(SensorimotorError::InvalidRange {
                min,
                max,
                reason: "span is not representable".to_string(),
            });
        }
        Ok(QuantityRange { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Inclusive span at unit granularity: `max - min + 1`
    pub fn span(&self) -> f64 {
        self.max - self.min + 1.0
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Limit a displacement so that `current + delta` stays inside the range
    pub fn clamp_displacement(&self, current: f64, delta: f64) -> f64 {
        let target = current + delta;
        if target > self.max {
            self.max - current
        } else if target < self.min {
            self.min - current
        } else {
            delta
        }
    }
}

/// Neuron count, achieved resolution and preferred values of one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeuronLayout {
    neuron_count: usize,
    step_size: f64,
    preferred_values: Vec<f64>,
}

impl NeuronLayout {
    /// Lay out neurons starting at `origin` across `span`.
    fn derive(origin: f64, span: f64, resolution: CodingResolution) -> SensorimotorResult<Self> {
        let (neuron_count, step_size) = match resolution {
            CodingResolution::PopulationSize(size) => {
                if size == 0 {
                    return Err(SensorimotorError::InvalidResolution(
                        "population size must be positive".to_string(),
                    ));
                }
                if size as usize > MAX_NEURONS {
                    return Err(SensorimotorError::InvalidResolution(format!(
                        "population size {} exceeds {} neurons",
                        size, MAX_NEURONS
                    )));
                }
                (size as usize, span / size as f64)
            }
            CodingResolution::DegreesPerNeuron(deg_per_neuron) => {
                if !(deg_per_neuron.is_finite() && deg_per_neuron > 0.0) {
                    return Err(SensorimotorError::InvalidResolution(format!(
                        "degrees per neuron must be positive, got {}",
                        deg_per_neuron
                    )));
                }
                let count = (span / deg_per_neuron).floor();
                if !count.is_finite() || count > MAX_NEURONS as f64 {
                    return Err(SensorimotorError::InvalidResolution(format!(
                        "{} degrees per neuron over span {} exceeds {} neurons",
                        deg_per_neuron, span, MAX_NEURONS
                    )));
                }
                if count < 1.0 {
                    return Err(SensorimotorError::EmptyPopulation {
                        span,
                        resolution: resolution.to_string(),
                    });
                }
                (count as usize, deg_per_neuron)
            }
        };

        let preferred_values = (0..neuron_count)
            .map(|i| origin + i as f64 * step_size)
            .collect();

        Ok(NeuronLayout {
            neuron_count,
            step_size,
            preferred_values,
        })
    }

    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    /// Effective resolution; may differ from the requested one
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn preferred_values(&self) -> &[f64] {
        &self.preferred_values
    }
}

mod private {
    pub trait Sealed {}
}

/// Read access to a neuron layout. Implemented only by [`AbsoluteRange`] and [`RelativeRange`].
pub trait RangeModel: private::Sealed + Send + Sync {
    fn layout(&self) -> &NeuronLayout;

    fn neuron_count(&self) -> usize {
        self.layout().neuron_count()
    }

    fn step_size(&self) -> f64 {
        self.layout().step_size()
    }

    fn preferred_values(&self) -> &[f64] {
        self.layout().preferred_values()
    }
}

/// Layout spanning `[min, max]` of the quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsoluteRange {
    layout: NeuronLayout,
}

impl AbsoluteRange {
    pub fn derive(range: QuantityRange, resolution: CodingResolution) -> SensorimotorResult<Self> {
        let layout = NeuronLayout::derive(range.min(), range.span(), resolution)?;
        tracing::debug!(
            min = range.min(),
            max = range.max(),
            neurons = layout.neuron_count(),
            step = layout.step_size(),
            "derived absolute population layout"
        );
        Ok(AbsoluteRange { layout })
    }
}

impl private::Sealed for AbsoluteRange {}

impl RangeModel for AbsoluteRange {
    fn layout(&self) -> &NeuronLayout {
        &self.layout
    }
}

/// Layout for displacements, spanning `[-span, +span]` of the quantity.
///
/// Uses twice the span of the absolute layout; zero displacement lies inside
/// the layout but not necessarily on a neuron.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeRange {
    layout: NeuronLayout,
}

impl RelativeRange {
    pub fn derive(range: QuantityRange, resolution: CodingResolution) -> SensorimotorResult<Self> {
        let span = range.span();
        let layout = NeuronLayout::derive(-span, 2.0 * span, resolution)?;
        tracing::debug!(
            span,
            neurons = layout.neuron_count(),
            step = layout.step_size(),
            "derived relative population layout"
        );
        Ok(RelativeRange { layout })
    }
}

impl private::Sealed for RelativeRange {}

impl RangeModel for RelativeRange {
    fn layout(&self) -> &NeuronLayout {
        &self.layout
    }
}

/// Absolute and relative layouts of one joint, built from the same range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointCoding {
    range: QuantityRange,
    absolute: AbsoluteRange,
    relative: RelativeRange,
}

impl JointCoding {
    pub fn derive(range: QuantityRange, resolution: CodingResolution) -> SensorimotorResult<Self> {
        Ok(JointCoding {
            range,
            absolute: AbsoluteRange::derive(range, resolution)?,
            relative: RelativeRange::derive(range, resolution)?,
        })
    }

    pub fn range(&self) -> &QuantityRange {
        &self.range
    }

    pub fn absolute(&self) -> &AbsoluteRange {
        &self.absolute
    }

    pub fn relative(&self) -> &RelativeRange {
        &self.relative
    }
}
