//! Naming context threaded through type resolution

use super::types::TypeName;

/// Structural role of the schema currently being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The root object of a feature
    Feature,
    /// A direct property of a feature
    FeatureProperty,
    /// A Thing-level attribute
    Attribute,
    Other,
}

impl Role {
    /// One step down the nesting: Feature -> FeatureProperty -> Other,
    /// Attribute -> Other. Other is terminal.
    pub fn descend(self) -> Self {
        match self {
            Role::Feature => Role::FeatureProperty,
            Role::FeatureProperty | Role::Attribute | Role::Other => Role::Other,
        }
    }
}

/// `(parent class, role, enclosing feature)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub parent: Option<TypeName>,
    pub role: Role,
    pub feature: Option<String>,
}

impl NamingContext {
    pub fn new(role: Role, feature: Option<String>) -> Self {
        Self {
            parent: None,
            role,
            feature,
        }
    }

    /// Context at the root of an independent schema (actions, ad-hoc calls)
    pub fn root() -> Self {
        Self::new(Role::Other, None)
    }

    /// Context for the children of `parent`
    pub fn descend(&self, parent: Option<TypeName>) -> Self {
        Self {
            parent: parent.or_else(|| self.parent.clone()),
            role: self.role.descend(),
            feature: self.feature.clone(),
        }
    }

    /// Same role, different parent
    pub fn with_parent(&self, parent: TypeName) -> Self {
        Self {
            parent: Some(parent),
            role: self.role,
            feature: self.feature.clone(),
        }
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.name.as_str())
    }

    pub fn feature_name(&self) -> Option<&str> {
        self.feature.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_transitions() {
        assert_eq!(Role::Feature.descend(), Role::FeatureProperty);
        assert_eq!(Role::FeatureProperty.descend(), Role::Other);
        assert_eq!(Role::Attribute.descend(), Role::Other);
        assert_eq!(Role::Other.descend(), Role::Other);
        assert_eq!(Role::Other.descend().descend(), Role::Other);
    }

    #[test]
    fn test_descend_keeps_feature_and_replaces_parent() {
        let ctx = NamingContext::new(Role::Feature, Some("Lamp".to_string()));
        let child = ctx.descend(Some(TypeName::new("org.example", "Lamp")));
        assert_eq!(child.role, Role::FeatureProperty);
        assert_eq!(child.parent_name(), Some("Lamp"));
        assert_eq!(child.feature_name(), Some("Lamp"));

        let grandchild = child.descend(None);
        assert_eq!(grandchild.role, Role::Other);
        assert_eq!(grandchild.parent_name(), Some("Lamp"));
    }
}
