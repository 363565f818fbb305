// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Population coding of scalar quantities.
//!
//! - **[`AbsoluteRange`]** / **[`RelativeRange`]** - neuron layouts derived from a
//!   [`QuantityRange`] and a [`CodingResolution`]
//! - **[`PopulationCodec`]** - Gaussian encoding and weighted-centroid decoding

mod codec;
mod range_model;

pub use codec::{decode_population, gaussian_response, PopulationCodec, TuningWidth, DEFAULT_SIGMA};
pub use range_model::{
    AbsoluteRange, CodingResolution, JointCoding, NeuronLayout, QuantityRange, RangeModel,
    RelativeRange, MAX_NEURONS,
};
