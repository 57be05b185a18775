//! Enum Registry
//!
//! Two placement policies with different conflict semantics:
//!
//! - **Inline**: the enum is nested in its owning class. The registry is
//!   keyed by the enum name alone and a later registration under the same
//!   name replaces the earlier one without any conflict check.
//! - **Separate**: the enum is a top-level type keyed by `(package, name)`.
//!   An identical value set reuses the existing enum; a different one is a
//!   fatal [`CodegenError::EnumConflict`].

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConflictKey, ConflictTable, Registration};
use crate::error::{CodegenError, Result};
use crate::resolver::types::EnumDescriptor;

/// Where generated enums are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EnumPlacement {
    /// Nested inside the class that owns the enum-typed field
    #[default]
    Inline,
    /// Top-level type in the package
    Separate,
}

/// Outcome of a separate-placement registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRegistration {
    Inserted,
    /// An enum with the same values already exists under this key
    Reused,
}

#[derive(Debug, Default)]
pub struct EnumRegistry {
    table: ConflictTable,
    /// Constant identifiers seen per key
    constants: HashMap<ConflictKey, Vec<String>>,
    separate: IndexMap<ConflictKey, EnumDescriptor>,
    inline: IndexMap<String, EnumDescriptor>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a nested enum. Last write wins; returns the replaced enum.
    pub fn register_inline(&mut self, descriptor: EnumDescriptor) -> Option<EnumDescriptor> {
        let key = ConflictKey::new(&descriptor.package, &descriptor.name);
        self.table.overwrite(key.clone(), descriptor.fingerprint.clone());
        self.constants.insert(key, descriptor.constant_names());

        let replaced = self.inline.insert(descriptor.name.clone(), descriptor);
        if let Some(previous) = &replaced {
            debug!(name = %previous.name, "inline enum replaced by a later registration");
        }
        replaced
    }

    /// Register a top-level enum
    pub fn register_separate(&mut self, descriptor: EnumDescriptor) -> Result<EnumRegistration> {
        let key = ConflictKey::new(&descriptor.package, &descriptor.name);
        match self.table.register(key.clone(), descriptor.fingerprint.clone()) {
            Registration::Inserted => {
                self.constants.insert(key.clone(), descriptor.constant_names());
                self.separate.insert(key, descriptor);
                Ok(EnumRegistration::Inserted)
            }
            Registration::Unchanged => Ok(EnumRegistration::Reused),
            Registration::Conflict { .. } => Err(CodegenError::EnumConflict {
                existing: self.constants.get(&key).cloned().unwrap_or_default(),
                incoming: descriptor.constant_names(),
                package: key.package,
                name: key.name,
            }),
        }
    }

    pub fn has_conflict(&self, descriptor: &EnumDescriptor) -> bool {
        self.table.has_conflict(
            &ConflictKey::new(&descriptor.package, &descriptor.name),
            &descriptor.fingerprint,
        )
    }

    /// Constant identifiers last registered under `(package, name)`
    pub fn constants(&self, package: &str, name: &str) -> Option<&[String]> {
        self.constants
            .get(&ConflictKey::new(package, name))
            .map(Vec::as_slice)
    }

    pub fn inline(&self, name: &str) -> Option<&EnumDescriptor> {
        self.inline.get(name)
    }

    pub fn separate(&self, package: &str, name: &str) -> Option<&EnumDescriptor> {
        self.separate.get(&ConflictKey::new(package, name))
    }

    /// Top-level enums in registration order
    pub fn separate_enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.separate.values()
    }

    /// Nested enums in registration order
    pub fn inline_enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.inline.values()
    }

    pub fn len(&self) -> usize {
        self.separate.len() + self.inline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
