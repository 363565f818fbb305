// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ANN iCub interface
//!
//! Bridges the joints and skin of an iCub robot and a rate-coded neural simulator.
//! Joint angles are turned into Gaussian population codes on the way in and decoded
//! back into motor commands on the way out.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! annicub = "0.1"  # Default: core + console logging
//! ```
//!
//! ## Feature Flags
//! - **`observability`** (default): console logging with per-crate debug flags
//! - **`file-logging`**: per-run log folders with retention cleanup
//!
//! ## Usage
//!
//! ```rust
//! use annicub::prelude::*;
//!
//! let range = QuantityRange::new(0.0, 89.0)?;
//! let model = AbsoluteRange::derive(range, CodingResolution::PopulationSize(90))?;
//! let codec = PopulationCodec::with_sigma(5.0)?;
//!
//! let population = codec.encode(45.0, &model);
//! assert_eq!(population[45], 1.0);
//! assert!((codec.decode(&population, &model)? - 45.0).abs() < 0.1);
//! # Ok::<(), annicub::sensorimotor::SensorimotorError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: annicub-config                             │
//! │  (TOML file, environment and CLI overrides)             │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Core: annicub-sensorimotor::population_coding          │
//! │  (range models, Gaussian encode, centroid decode)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Modules: joint reader/writer, skin reader, registry    │
//! │  (hardware behind driver traits)                        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub use annicub_config as config;
pub use annicub_sensorimotor as sensorimotor;

#[cfg(feature = "observability")]
pub use annicub_observability as observability;

pub mod probe;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, validate_config, AnnIcubConfig};
    pub use crate::sensorimotor::devices::{
        ArmSide, ControlMode, JointActuator, JointEncoders, JointReader, JointTarget, JointWriter, MotionMode,
        PopulationMotion, RobotPart, SkinReader, SkinSection, TactileSource, WriterSettings,
    };
    pub use crate::sensorimotor::population_coding::{
        AbsoluteRange, CodingResolution, JointCoding, PopulationCodec, QuantityRange, RangeModel, RelativeRange,
    };
    pub use crate::sensorimotor::transport::{JointSelection, ProvidedData};
    pub use crate::sensorimotor::{ModuleRegistry, RegisteredModule, SensorimotorError, SensorimotorResult};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_covers_a_round_trip() {
        let range = QuantityRange::new(-40.0, 30.0).unwrap();
        let coding = JointCoding::derive(range, CodingResolution::DegreesPerNeuron(1.0)).unwrap();
        let codec = PopulationCodec::default();

        let population = codec.encode(-12.0, coding.absolute());
        let decoded = codec.decode(&population, coding.absolute()).unwrap();
        assert!((decoded + 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(validate_config(&AnnIcubConfig::default()).is_ok());
    }
}
