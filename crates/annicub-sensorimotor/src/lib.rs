// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Population coding of joint angles and the modules that read and write them.
//!
//! Readers turn hardware scalars into population codes for a neural simulator,
//! writers decode the simulator's populations back into motor commands.

mod error;
pub mod population_coding;
pub mod devices;
pub mod transport;
mod module_registry;

pub use error::{SensorimotorError, SensorimotorResult};
pub use module_registry::{ModuleRegistry, RegisteredModule};
