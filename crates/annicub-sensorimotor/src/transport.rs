// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Flat vector framing between the modules and the simulator-facing transport.
//!
//! Multi-joint populations travel as one flat sequence, concatenated joint by
//! joint in selection order. The receiving side splits it again using the known
//! neuron count of every selected joint.

use crate::error::{SensorimotorError, SensorimotorResult};
use serde::Serialize;

/// Which joints of a part a request addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JointSelection {
    One(usize),
    Multiple(Vec<usize>),
    All,
}

impl JointSelection {
    /// Expand into explicit joint indexes, checking each against `joint_count`
    pub fn resolve(&self, joint_count: usize) -> SensorimotorResult<Vec<usize>> {
        let joints = match self {
            JointSelection::One(joint) => vec![*joint],
            JointSelection::Multiple(joints) => joints.clone(),
            JointSelection::All => (0..joint_count).collect(),
        };
        check_joints(&joints, joint_count)?;
        Ok(joints)
    }
}

/// Every index in `joints` must address an existing joint
pub fn check_joints(joints: &[usize], joint_count: usize) -> SensorimotorResult<()> {
    match joints.iter().find(|joint| **joint >= joint_count) {
        Some(joint) => Err(SensorimotorError::JointOutOfRange {
            joint: *joint,
            joints: joint_count,
        }),
        None => Ok(()),
    }
}

/// Data handed to the transport by a reader module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ProvidedData {
    One { joint: usize, values: Vec<f64> },
    Multiple { joints: Vec<usize>, values: Vec<f64> },
    All { values: Vec<f64> },
}

impl ProvidedData {
    pub fn values(&self) -> &[f64] {
        match self {
            ProvidedData::One { values, .. }
            | ProvidedData::Multiple { values, .. }
            | ProvidedData::All { values } => values,
        }
    }

    pub fn into_values(self) -> Vec<f64> {
        match self {
            ProvidedData::One { values, .. }
            | ProvidedData::Multiple { values, .. }
            | ProvidedData::All { values } => values,
        }
    }
}

/// Concatenate populations in order
pub fn flatten_populations(populations: &[Vec<f64>]) -> Vec<f64> {
    let total = populations.iter().map(Vec::len).sum();
    let mut flat = Vec::with_capacity(total);
    for population in populations {
        flat.extend_from_slice(population);
    }
    flat
}

/// Split a flat sequence into chunks of exactly `lengths[i]` values
///
/// # Errors
/// [`SensorimotorError::PopulationLengthMismatch`] if the lengths do not add up to `flat.len()`.
pub fn split_populations(flat: &[f64], lengths: &[usize]) -> SensorimotorResult<Vec<Vec<f64>>> {
    let expected: usize = lengths.iter().sum();
    if expected != flat.len() {
        return Err(SensorimotorError::PopulationLengthMismatch {
            expected,
            actual: flat.len(),
        });
    }

    let mut populations = Vec::with_capacity(lengths.len());
    let mut offset = 0;
    for length in lengths {
        populations.push(flat[offset..offset + length].to_vec());
        offset += length;
    }
    Ok(populations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_keeps_selection_order() {
        let flat = flatten_populations(&[vec![1.0, 2.0], vec![3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_split_uneven_lengths() {
        let flat = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let populations = split_populations(&flat, &[2, 1, 3]).unwrap();
        assert_eq!(populations, vec![vec![1.0, 2.0], vec![3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_split_length_mismatch() {
        let flat = [1.0, 2.0, 3.0];
        assert_eq!(
            split_populations(&flat, &[2, 2]),
            Err(SensorimotorError::PopulationLengthMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_selection_resolution() {
        assert_eq!(JointSelection::All.resolve(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(JointSelection::Multiple(vec![2, 0]).resolve(3).unwrap(), vec![2, 0]);
        assert_eq!(
            JointSelection::One(3).resolve(3),
            Err(SensorimotorError::JointOutOfRange { joint: 3, joints: 3 })
        );
    }
}
