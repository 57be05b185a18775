//! Class Registry
//!
//! Classes and type aliases share one namespace per package: an alias named
//! `Rgb` and a class named `Rgb` would collide in the output, so both are
//! registered in the same conflict table.

use indexmap::IndexMap;
use tracing::debug;

use super::{ConflictKey, ConflictTable, Registration};
use crate::fingerprint::Fingerprint;
use crate::resolver::types::{AliasDescriptor, ClassDescriptor};

/// Result of walking a list of candidate names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameClaim {
    pub name: String,
    /// The first candidate was held by a different structure
    pub renamed: bool,
    /// The name already held this exact structure
    pub existing: bool,
}

#[derive(Debug, Default)]
pub struct ClassRegistry {
    table: ConflictTable,
    classes: IndexMap<ConflictKey, ClassDescriptor>,
    aliases: IndexMap<ConflictKey, AliasDescriptor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_conflict(&self, package: &str, name: &str, fingerprint: &Fingerprint) -> bool {
        self.table
            .has_conflict(&ConflictKey::new(package, name), fingerprint)
    }

    pub fn is_registered(&self, package: &str, name: &str) -> bool {
        self.table.contains(&ConflictKey::new(package, name))
    }

    pub fn register(&mut self, package: &str, name: &str, fingerprint: Fingerprint) -> Registration {
        self.table
            .register(ConflictKey::new(package, name), fingerprint)
    }

    /// Register under the first candidate that is free or already holds
    /// `fingerprint`. Returns `None` only if `candidates` runs out.
    pub fn claim<I>(&mut self, package: &str, candidates: I, fingerprint: &Fingerprint) -> Option<NameClaim>
    where
        I: IntoIterator<Item = String>,
    {
        let mut renamed = false;
        for name in candidates {
            match self.register(package, &name, fingerprint.clone()) {
                Registration::Inserted => {
                    return Some(NameClaim {
                        name,
                        renamed,
                        existing: false,
                    })
                }
                Registration::Unchanged => {
                    return Some(NameClaim {
                        name,
                        renamed,
                        existing: true,
                    })
                }
                Registration::Conflict { existing } => {
                    debug!(
                        package,
                        name = %name,
                        existing = existing.short(),
                        incoming = fingerprint.short(),
                        "class name held by a different structure"
                    );
                    renamed = true;
                }
            }
        }
        None
    }

    /// Store the descriptor of a registered class, replacing any previous one
    pub fn insert_class(&mut self, descriptor: ClassDescriptor) {
        let key = ConflictKey::new(&descriptor.package, &descriptor.name);
        self.classes.insert(key, descriptor);
    }

    pub fn insert_alias(&mut self, descriptor: AliasDescriptor) {
        let key = ConflictKey::new(&descriptor.package, &descriptor.name);
        self.aliases.insert(key, descriptor);
    }

    pub fn class(&self, package: &str, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(&ConflictKey::new(package, name))
    }

    pub fn class_mut(&mut self, package: &str, name: &str) -> Option<&mut ClassDescriptor> {
        self.classes.get_mut(&ConflictKey::new(package, name))
    }

    pub fn alias(&self, package: &str, name: &str) -> Option<&AliasDescriptor> {
        self.aliases.get(&ConflictKey::new(package, name))
    }

    /// Classes in registration order
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// Aliases in registration order
    pub fn aliases(&self) -> impl Iterator<Item = &AliasDescriptor> {
        self.aliases.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::types::{ClassKind, TypeName};
    use crate::resolver::Role;

    fn fp(s: &str) -> Fingerprint {
        Fingerprint::from_canonical(s)
    }

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_claim_first_free() {
        let mut registry = ClassRegistry::new();
        let claim = registry
            .claim("p", candidates(&["Status", "LampStatus"]), &fp("a"))
            .unwrap();
        assert_eq!(
            claim,
            NameClaim {
                name: "Status".to_string(),
                renamed: false,
                existing: false
            }
        );
    }

    #[test]
    fn test_claim_reuses_identical_structure() {
        let mut registry = ClassRegistry::new();
        registry.claim("p", candidates(&["Status"]), &fp("a"));
        let claim = registry
            .claim("p", candidates(&["Status", "LampStatus"]), &fp("a"))
            .unwrap();
        assert_eq!(claim.name, "Status");
        assert!(claim.existing);
        assert!(!claim.renamed);
    }

    #[test]
    fn test_claim_skips_conflicts() {
        let mut registry = ClassRegistry::new();
        registry.claim("p", candidates(&["Status"]), &fp("a"));
        let claim = registry
            .claim("p", candidates(&["Status", "LampStatus"]), &fp("b"))
            .unwrap();
        assert_eq!(claim.name, "LampStatus");
        assert!(claim.renamed);
        assert!(!claim.existing);
    }

    #[test]
    fn test_claim_exhausted() {
        let mut registry = ClassRegistry::new();
        registry.claim("p", candidates(&["Status"]), &fp("a"));
        assert!(registry.claim("p", candidates(&["Status"]), &fp("b")).is_none());
    }

    #[test]
    fn test_descriptors_keep_registration_order() {
        let mut registry = ClassRegistry::new();
        for name in ["B", "A", "C"] {
            let type_name = TypeName::new("p", name);
            registry.register("p", name, fp(name));
            registry.insert_class(ClassDescriptor::new(&type_name, fp(name), ClassKind::Plain, Role::Other));
        }
        let names: Vec<&str> = registry.classes().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert!(registry.class("p", "A").is_some());
        assert!(registry.is_registered("p", "C"));
    }
}
