//! Type registries
//!
//! Structural conflict detection for generated classes and enums. Both
//! registries share one shape: a [`ConflictTable`] mapping
//! `(package, name)` to the last fingerprint registered under it.
//!
//! The registries never invent names. When a name is held by a different
//! structure the caller picks the next candidate and registers again.
//!
//! A [`TypeRegistries`] value is created per generation run and threaded
//! through every resolution call by `&mut`, so independent runs never share
//! state.

pub mod classes;
pub mod enums;

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::fingerprint::Fingerprint;

pub use classes::{ClassRegistry, NameClaim};
pub use enums::{EnumPlacement, EnumRegistry};

// =============================================================================
// Conflict Key
// =============================================================================

/// `(package, simple name)` of a generated type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictKey {
    pub package: String,
    pub name: String,
}

impl ConflictKey {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ConflictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

// =============================================================================
// Conflict Table
// =============================================================================

/// Outcome of registering a fingerprint under a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The key was free and now holds the fingerprint
    Inserted,
    /// The key already held the same fingerprint
    Unchanged,
    /// The key holds a different fingerprint; nothing was changed
    Conflict { existing: Fingerprint },
}

/// Key -> last seen structural fingerprint
#[derive(Debug, Default, Clone)]
pub struct ConflictTable {
    entries: HashMap<ConflictKey, Fingerprint>,
}

impl ConflictTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// True only if a *different* fingerprint is registered under `key`
    pub fn has_conflict(&self, key: &ConflictKey, fingerprint: &Fingerprint) -> bool {
        self.entries
            .get(key)
            .is_some_and(|existing| existing != fingerprint)
    }

    pub fn contains(&self, key: &ConflictKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn fingerprint(&self, key: &ConflictKey) -> Option<&Fingerprint> {
        self.entries.get(key)
    }

    /// Register `fingerprint` under `key`. A conflicting key is left untouched.
    pub fn register(&mut self, key: ConflictKey, fingerprint: Fingerprint) -> Registration {
        match self.entries.get(&key) {
            None => {
                self.entries.insert(key, fingerprint);
                Registration::Inserted
            }
            Some(existing) if *existing == fingerprint => Registration::Unchanged,
            Some(existing) => Registration::Conflict {
                existing: existing.clone(),
            },
        }
    }

    /// Replace whatever is registered under `key`, returning the previous fingerprint
    pub fn overwrite(&mut self, key: ConflictKey, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.entries.insert(key, fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Per-run Registries
// =============================================================================

/// Every registry one generation run needs
#[derive(Debug, Default)]
pub struct TypeRegistries {
    pub classes: ClassRegistry,
    pub enums: EnumRegistry,
}

impl TypeRegistries {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `name` in `package` is held by a class, an alias or a
    /// top-level enum. Each of those becomes its own output file.
    pub fn is_type_name_taken(&self, package: &str, name: &str) -> bool {
        self.classes.is_registered(package, name) || self.enums.separate(package, name).is_some()
    }

    /// [`ClassRegistry::claim`], skipping candidates held by top-level enums
    pub fn claim_class_name<I>(
        &mut self,
        package: &str,
        candidates: I,
        fingerprint: &Fingerprint,
    ) -> Option<NameClaim>
    where
        I: IntoIterator<Item = String>,
    {
        let enums = &self.enums;
        let candidates = candidates.into_iter().filter(|name| {
            let held = enums.separate(package, name).is_some();
            if held {
                debug!(package, name = %name, "class name held by an enum");
            }
            !held
        });
        self.classes.claim(package, candidates, fingerprint)
    }
}
