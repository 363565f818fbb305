// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::devices::{JointReader, JointWriter, SkinReader};
use crate::error::{SensorimotorError, SensorimotorResult};
use std::collections::BTreeMap;

/// A reader or writer module owned by a [`ModuleRegistry`]
#[derive(Debug)]
pub enum RegisteredModule {
    JointReader(JointReader),
    JointWriter(JointWriter),
    SkinReader(SkinReader),
}

impl RegisteredModule {
    pub fn kind(&self) -> &'static str {
        match self {
            RegisteredModule::JointReader(_) => "JointReader",
            RegisteredModule::JointWriter(_) => "JointWriter",
            RegisteredModule::SkinReader(_) => "SkinReader",
        }
    }

    pub fn identifier(&self) -> String {
        match self {
            RegisteredModule::JointReader(module) => module.identifier(),
            RegisteredModule::JointWriter(module) => module.identifier(),
            RegisteredModule::SkinReader(module) => module.identifier(),
        }
    }

    pub fn parameters(&self) -> serde_json::Value {
        match self {
            RegisteredModule::JointReader(module) => module.parameters(),
            RegisteredModule::JointWriter(module) => module.parameters(),
            RegisteredModule::SkinReader(module) => module.parameters(),
        }
    }
}

impl From<JointReader> for RegisteredModule {
    fn from(module: JointReader) -> Self {
        RegisteredModule::JointReader(module)
    }
}

impl From<JointWriter> for RegisteredModule {
    fn from(module: JointWriter) -> Self {
        RegisteredModule::JointWriter(module)
    }
}

impl From<SkinReader> for RegisteredModule {
    fn from(module: SkinReader) -> Self {
        RegisteredModule::SkinReader(module)
    }
}

/// Named modules of one robot setup, owned by the caller
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, RegisteredModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names are unique; registering a taken name fails and keeps the existing module.
    pub fn register(&mut self, name: impl Into<String>, module: impl Into<RegisteredModule>) -> SensorimotorResult<()> {
        let name = name.into();
        if self.modules.contains_key(&name) {
            return Err(SensorimotorError::ModuleAlreadyRegistered(name));
        }
        let module = module.into();
        tracing::debug!(name = %name, kind = module.kind(), "module registered");
        self.modules.insert(name, module);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> SensorimotorResult<RegisteredModule> {
        self.modules
            .remove(name)
            .ok_or_else(|| SensorimotorError::ModuleNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> SensorimotorResult<&RegisteredModule> {
        self.modules
            .get(name)
            .ok_or_else(|| SensorimotorError::ModuleNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> SensorimotorResult<&mut RegisteredModule> {
        self.modules
            .get_mut(name)
            .ok_or_else(|| SensorimotorError::ModuleNotFound(name.to_string()))
    }

    pub fn joint_reader_mut(&mut self, name: &str) -> SensorimotorResult<&mut JointReader> {
        match self.get_mut(name)? {
            RegisteredModule::JointReader(module) => Ok(module),
            _ => Err(kind_mismatch(name, "JointReader")),
        }
    }

    pub fn joint_writer_mut(&mut self, name: &str) -> SensorimotorResult<&mut JointWriter> {
        match self.get_mut(name)? {
            RegisteredModule::JointWriter(module) => Ok(module),
            _ => Err(kind_mismatch(name, "JointWriter")),
        }
    }

    pub fn skin_reader_mut(&mut self, name: &str) -> SensorimotorResult<&mut SkinReader> {
        match self.get_mut(name)? {
            RegisteredModule::SkinReader(module) => Ok(module),
            _ => Err(kind_mismatch(name, "SkinReader")),
        }
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Construction parameters of every module keyed by name, for saving a robot setup
    pub fn export_parameters_as_json(&self) -> SensorimotorResult<String> {
        let parameters: BTreeMap<&str, serde_json::Value> = self
            .modules
            .iter()
            .map(|(name, module)| (name.as_str(), module.parameters()))
            .collect();
        Ok(serde_json::to_string_pretty(&parameters)?)
    }
}

fn kind_mismatch(name: &str, expected: &'static str) -> SensorimotorError {
    SensorimotorError::ModuleKindMismatch {
        name: name.to_string(),
        expected,
    }
}
