// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::devices::hardware::JointEncoders;
use crate::devices::{poll_frame, resolve_joint_ranges, timestamp_ms, RobotPart};
use crate::error::{SensorimotorError, SensorimotorResult};
use crate::population_coding::{AbsoluteRange, CodingResolution, PopulationCodec, QuantityRange, RangeModel};
use crate::transport::{check_joints, flatten_populations, JointSelection, ProvidedData};
use annicub_config::AnnIcubConfig;
use rayon::prelude::*;
use serde_json::json;

/// Reads joint angles of one robot part, as plain values or population codes.
///
/// One [`AbsoluteRange`] per joint is derived from the driver's joint limits when
/// the reader is built and stays fixed for the reader's lifetime.
#[derive(Debug)]
pub struct JointReader {
    part: RobotPart,
    codec: PopulationCodec,
    resolution: CodingResolution,
    ranges: Vec<QuantityRange>,
    models: Vec<AbsoluteRange>,
    encoders: Box<dyn JointEncoders>,
}

impl JointReader {
    pub fn new(
        part: RobotPart,
        sigma: f64,
        resolution: CodingResolution,
        encoders: Box<dyn JointEncoders>,
    ) -> SensorimotorResult<Self> {
        Self::build(part, sigma, resolution, encoders, None)
    }

    /// Validates `config`, then takes sigma and resolution from `[population]`; `[joint_limits]` backs up the driver limits
    pub fn from_config(
        part: RobotPart,
        config: &AnnIcubConfig,
        encoders: Box<dyn JointEncoders>,
    ) -> SensorimotorResult<Self> {
        annicub_config::validate_config(config)?;
        let resolution = CodingResolution::from_selectors(
            config.population.population_size,
            config.population.deg_per_neuron,
        )?;
        Self::build(part, config.population.sigma, resolution, encoders, Some(config))
    }

    fn build(
        part: RobotPart,
        sigma: f64,
        resolution: CodingResolution,
        encoders: Box<dyn JointEncoders>,
        fallback: Option<&AnnIcubConfig>,
    ) -> SensorimotorResult<Self> {
        let codec = PopulationCodec::with_sigma(sigma)?;
        let ranges = resolve_joint_ranges(part, &*encoders, fallback)?;
        let models = ranges
            .iter()
            .map(|range| AbsoluteRange::derive(*range, resolution))
            .collect::<SensorimotorResult<Vec<_>>>()?;

        tracing::info!(
            %part,
            joints = models.len(),
            sigma,
            %resolution,
            "joint reader initialized"
        );

        Ok(JointReader {
            part,
            codec,
            resolution,
            ranges,
            models,
            encoders,
        })
    }

    pub fn identifier(&self) -> String {
        format!("JointReader: {}", self.part)
    }

    pub fn part(&self) -> RobotPart {
        self.part
    }

    pub fn joint_count(&self) -> usize {
        self.models.len()
    }

    /// Achieved resolution per joint, in degrees per neuron
    pub fn joints_deg_res(&self) -> Vec<f64> {
        self.models.iter().map(|model| model.step_size()).collect()
    }

    pub fn neurons_per_joint(&self) -> Vec<usize> {
        self.models.iter().map(|model| model.neuron_count()).collect()
    }

    pub fn range_model(&self, joint: usize) -> SensorimotorResult<&AbsoluteRange> {
        self.models.get(joint).ok_or(SensorimotorError::JointOutOfRange {
            joint,
            joints: self.models.len(),
        })
    }

    pub fn joint_range(&self, joint: usize) -> SensorimotorResult<&QuantityRange> {
        self.ranges.get(joint).ok_or(SensorimotorError::JointOutOfRange {
            joint,
            joints: self.ranges.len(),
        })
    }

    /// Population code of `angle` for `joint`, without touching the hardware
    pub fn encode(&self, angle: f64, joint: usize) -> SensorimotorResult<Vec<f64>> {
        Ok(self.codec.encode(angle, self.range_model(joint)?))
    }

    //region Plain values

    pub fn read_double_all(&mut self) -> SensorimotorResult<Vec<f64>> {
        let identifier = self.identifier();
        let encoders = &mut self.encoders;
        let angles = poll_frame(&identifier, || encoders.read_encoders())?;
        if angles.len() != self.models.len() {
            return Err(SensorimotorError::JointCountMismatch {
                expected: self.models.len(),
                actual: angles.len(),
            });
        }
        Ok(angles)
    }

    /// Timestamp in milliseconds followed by all joint angles
    pub fn read_double_all_timed(&mut self) -> SensorimotorResult<Vec<f64>> {
        let angles = self.read_double_all()?;
        Ok(with_timestamp(angles))
    }

    pub fn read_double_multiple(&mut self, joints: &[usize]) -> SensorimotorResult<Vec<f64>> {
        check_joints(joints, self.joint_count())?;
        let angles = self.read_double_all()?;
        Ok(joints.iter().map(|joint| angles[*joint]).collect())
    }

    /// Timestamp in milliseconds followed by the selected joint angles
    pub fn read_double_multiple_timed(&mut self, joints: &[usize]) -> SensorimotorResult<Vec<f64>> {
        let angles = self.read_double_multiple(joints)?;
        Ok(with_timestamp(angles))
    }

    pub fn read_double_one(&mut self, joint: usize) -> SensorimotorResult<f64> {
        check_joints(&[joint], self.joint_count())?;
        let identifier = self.identifier();
        let encoders = &mut self.encoders;
        poll_frame(&identifier, || encoders.read_encoder(joint))
    }

    /// `[timestamp_ms, angle]`
    pub fn read_double_one_timed(&mut self, joint: usize) -> SensorimotorResult<Vec<f64>> {
        let angle = self.read_double_one(joint)?;
        Ok(with_timestamp(vec![angle]))
    }

    //endregion

    //region Population codes

    pub fn read_pop_all(&mut self) -> SensorimotorResult<Vec<Vec<f64>>> {
        let angles = self.read_double_all()?;
        let codec = &self.codec;
        Ok(angles
            .par_iter()
            .zip(self.models.par_iter())
            .map(|(angle, model)| codec.encode(*angle, model))
            .collect())
    }

    pub fn read_pop_multiple(&mut self, joints: &[usize]) -> SensorimotorResult<Vec<Vec<f64>>> {
        let angles = self.read_double_multiple(joints)?;
        let codec = &self.codec;
        let models = &self.models;
        Ok(angles
            .par_iter()
            .zip(joints.par_iter())
            .map(|(angle, joint)| codec.encode(*angle, &models[*joint]))
            .collect())
    }

    pub fn read_pop_one(&mut self, joint: usize) -> SensorimotorResult<Vec<f64>> {
        let angle = self.read_double_one(joint)?;
        self.encode(angle, joint)
    }

    //endregion

    /// Read the selected joints for the transport layer
    ///
    /// With `encoded`, populations are concatenated joint by joint in selection order.
    pub fn provide(&mut self, selection: &JointSelection, encoded: bool) -> SensorimotorResult<ProvidedData> {
        let provided = match selection {
            JointSelection::One(joint) => {
                let values = if encoded {
                    self.read_pop_one(*joint)?
                } else {
                    vec![self.read_double_one(*joint)?]
                };
                ProvidedData::One { joint: *joint, values }
            }
            JointSelection::Multiple(joints) => {
                let values = if encoded {
                    flatten_populations(&self.read_pop_multiple(joints)?)
                } else {
                    self.read_double_multiple(joints)?
                };
                ProvidedData::Multiple {
                    joints: joints.clone(),
                    values,
                }
            }
            JointSelection::All => {
                let values = if encoded {
                    flatten_populations(&self.read_pop_all()?)
                } else {
                    self.read_double_all()?
                };
                ProvidedData::All { values }
            }
        };
        Ok(provided)
    }

    /// Construction parameters, as stored when saving a robot description
    pub fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "JointReader",
            "part": self.part,
            "sigma": self.codec.sigma().get(),
            "resolution": self.resolution,
            "neurons_per_joint": self.neurons_per_joint(),
        })
    }
}

fn with_timestamp(values: Vec<f64>) -> Vec<f64> {
    let mut stamped = Vec::with_capacity(values.len() + 1);
    stamped.push(timestamp_ms());
    stamped.extend(values);
    stamped
}
