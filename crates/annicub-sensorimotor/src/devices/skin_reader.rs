// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::devices::hardware::TactileSource;
use crate::devices::ArmSide;
use crate::error::{SensorimotorError, SensorimotorResult};
use serde::Serialize;
use serde_json::json;
use std::fmt::{Display, Formatter};

const RAW_TAXEL_MAX: f64 = 255.0;

/// Skin patch of one arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinSection {
    Arm,
    Forearm,
    Hand,
}

impl SkinSection {
    pub const ALL: [SkinSection; 3] = [SkinSection::Arm, SkinSection::Forearm, SkinSection::Hand];

    /// Transport section numbers: 1 arm, 2 forearm, 3 hand
    pub fn from_index(index: u32) -> SensorimotorResult<Self> {
        match index {
            1 => Ok(SkinSection::Arm),
            2 => Ok(SkinSection::Forearm),
            3 => Ok(SkinSection::Hand),
            _ => Err(SensorimotorError::InvalidParameter(format!(
                "undefined skin section {}",
                index
            ))),
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            SkinSection::Arm => "arm",
            SkinSection::Forearm => "forearm",
            SkinSection::Hand => "hand",
        }
    }

    fn slot(&self) -> usize {
        match self {
            SkinSection::Arm => 0,
            SkinSection::Forearm => 1,
            SkinSection::Hand => 2,
        }
    }
}

impl Display for SkinSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Reads the tactile sensors of one arm and keeps the history of every read.
#[derive(Debug)]
pub struct SkinReader {
    name: String,
    side: ArmSide,
    norm_data: bool,
    norm_factor: f64,
    taxel_masks: [Option<Vec<bool>>; 3],
    history: [Vec<Vec<f64>>; 3],
    source: Box<dyn TactileSource>,
}

impl SkinReader {
    /// With `norm_data`, raw taxel values in `0..=255` are scaled to `0..=1`.
    pub fn new(name: impl Into<String>, side: ArmSide, norm_data: bool, source: Box<dyn TactileSource>) -> Self {
        let name = name.into();
        tracing::info!(name = %name, %side, norm_data, "skin reader initialized");
        SkinReader {
            name,
            side,
            norm_data,
            norm_factor: if norm_data { 1.0 / RAW_TAXEL_MAX } else { 1.0 },
            taxel_masks: [None, None, None],
            history: [Vec::new(), Vec::new(), Vec::new()],
            source,
        }
    }

    /// Keep only taxels whose mask entry is `true`; raw frames must be as long as the mask
    pub fn with_taxel_mask(mut self, section: SkinSection, mask: Vec<bool>) -> Self {
        self.taxel_masks[section.slot()] = Some(mask);
        self
    }

    pub fn identifier(&self) -> String {
        format!("SkinReader: {}", self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> ArmSide {
        self.side
    }

    /// Number of taxels delivered for `section`, if a mask fixes it
    pub fn section_size(&self, section: SkinSection) -> Option<usize> {
        self.taxel_masks[section.slot()]
            .as_ref()
            .map(|mask| mask.iter().filter(|valid| **valid).count())
    }

    /// Read all sections and append them to the history
    ///
    /// Sections that were read are stored even if another section failed. The
    /// first failure is returned afterwards.
    pub fn read_tactile(&mut self) -> SensorimotorResult<()> {
        let mut first_error = None;
        for section in [SkinSection::Hand, SkinSection::Forearm, SkinSection::Arm] {
            match self.read_section(section) {
                Ok(values) => self.history[section.slot()].push(values),
                Err(err) => {
                    tracing::warn!(name = %self.name, %section, %err, "error in reading tactile data");
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Read one section without touching the history
    pub fn read_section(&mut self, section: SkinSection) -> SensorimotorResult<Vec<f64>> {
        let raw = self.source.read_section(self.side, section)?.ok_or_else(|| {
            SensorimotorError::Hardware(format!("[{}] no {} tactile data", self.identifier(), section))
        })?;

        let values = match &self.taxel_masks[section.slot()] {
            Some(mask) => {
                if mask.len() != raw.len() {
                    return Err(SensorimotorError::PopulationLengthMismatch {
                        expected: mask.len(),
                        actual: raw.len(),
                    });
                }
                raw.iter()
                    .zip(mask)
                    .filter(|(_, valid)| **valid)
                    .map(|(value, _)| value * self.norm_factor)
                    .collect()
            }
            None => raw.iter().map(|value| value * self.norm_factor).collect(),
        };
        Ok(values)
    }

    pub fn tactile_section(&self, section: SkinSection) -> &[Vec<f64>] {
        &self.history[section.slot()]
    }

    pub fn tactile_arm(&self) -> &[Vec<f64>] {
        self.tactile_section(SkinSection::Arm)
    }

    pub fn tactile_forearm(&self) -> &[Vec<f64>] {
        self.tactile_section(SkinSection::Forearm)
    }

    pub fn tactile_hand(&self) -> &[Vec<f64>] {
        self.tactile_section(SkinSection::Hand)
    }

    pub fn latest(&self, section: SkinSection) -> Option<&[f64]> {
        self.history[section.slot()].last().map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        for section in self.history.iter_mut() {
            section.clear();
        }
    }

    pub fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "SkinReader",
            "name": self.name,
            "side": self.side,
            "norm_data": self.norm_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct ConstantSkin {
        raw: Vec<f64>,
        missing: Option<SkinSection>,
    }

    impl TactileSource for ConstantSkin {
        fn read_section(&mut self, _side: ArmSide, section: SkinSection) -> SensorimotorResult<Option<Vec<f64>>> {
            if self.missing == Some(section) {
                return Ok(None);
            }
            Ok(Some(self.raw.clone()))
        }
    }

    fn reader(norm_data: bool, missing: Option<SkinSection>) -> SkinReader {
        let source = ConstantSkin {
            raw: vec![0.0, 51.0, 255.0],
            missing,
        };
        SkinReader::new("skin_right", ArmSide::Right, norm_data, Box::new(source))
    }

    #[test]
    fn test_normalized_values() {
        let mut skin = reader(true, None);
        skin.read_tactile().unwrap();
        let hand = skin.latest(SkinSection::Hand).unwrap();
        assert_eq!(hand[0], 0.0);
        assert!((hand[1] - 0.2).abs() < 1e-12);
        assert!((hand[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_raw_values_without_normalization() {
        let mut skin = reader(false, None);
        skin.read_tactile().unwrap();
        assert_eq!(skin.tactile_arm(), &[vec![0.0, 51.0, 255.0]]);
    }

    #[test]
    fn test_missing_section_keeps_the_others() {
        let mut skin = reader(true, Some(SkinSection::Forearm));
        assert!(matches!(skin.read_tactile(), Err(SensorimotorError::Hardware(_))));
        assert_eq!(skin.tactile_arm().len(), 1);
        assert_eq!(skin.tactile_hand().len(), 1);
        assert!(skin.tactile_forearm().is_empty());
    }

    #[test]
    fn test_taxel_mask_filters_invalid_taxels() {
        let mut skin = reader(false, None).with_taxel_mask(SkinSection::Arm, vec![true, false, true]);
        assert_eq!(skin.section_size(SkinSection::Arm), Some(2));
        assert_eq!(skin.read_section(SkinSection::Arm).unwrap(), vec![0.0, 255.0]);
        assert_eq!(skin.read_section(SkinSection::Hand).unwrap().len(), 3);
    }

    #[test]
    fn test_history_and_clear() {
        let mut skin = reader(true, None);
        skin.read_tactile().unwrap();
        skin.read_tactile().unwrap();
        assert_eq!(skin.tactile_hand().len(), 2);
        skin.clear();
        assert!(skin.tactile_hand().is_empty());
        assert!(skin.latest(SkinSection::Arm).is_none());
    }

    #[test]
    fn test_section_index() {
        assert_eq!(SkinSection::from_index(2).unwrap(), SkinSection::Forearm);
        assert!(SkinSection::from_index(4).is_err());
    }
}
