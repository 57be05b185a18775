//! Resolved type graph
//!
//! The output of type resolution. Everything an emitter needs is here; no
//! raw JSON reaches the emitter.

use std::fmt;

use serde_json::Value;

use super::context::Role;
use crate::fingerprint::Fingerprint;
use crate::naming::to_property_name;
use crate::schema::{ScalarKind, SchemaNode};

// =============================================================================
// Type References
// =============================================================================

/// Fully qualified name of a generated type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub package: String,
    pub name: String,
    /// Owning class for types nested in another class
    pub owner: Option<String>,
}

impl TypeName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            owner: None,
        }
    }

    pub fn nested(package: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            owner: Some(owner.into()),
        }
    }

    /// Name as seen from inside the package (`Owner.Name` for nested types)
    pub fn local_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{owner}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// The top-level type that carries this one
    pub fn top_level(&self) -> &str {
        self.owner.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.local_name())
        } else {
            write!(f, "{}.{}", self.package, self.local_name())
        }
    }
}

/// A resolved reference to a type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Primitive(ScalarKind),
    Class(TypeName),
    Enum(TypeName),
    Alias(TypeName),
    List(Box<TypeRef>),
    /// Map from string keys to the boxed value type
    Map(Box<TypeRef>),
    /// The nullable no-value type
    Unit,
}

impl TypeRef {
    /// Language-neutral signature, used in member fingerprints
    pub fn signature(&self) -> String {
        match self {
            TypeRef::Primitive(kind) => kind.json_type().to_string(),
            TypeRef::Class(name) => format!("class:{name}"),
            TypeRef::Enum(name) => format!("enum:{name}"),
            TypeRef::Alias(name) => format!("alias:{name}"),
            TypeRef::List(item) => format!("list<{}>", item.signature()),
            TypeRef::Map(item) => format!("map<{}>", item.signature()),
            TypeRef::Unit => "unit".to_string(),
        }
    }

    /// Generated types this reference mentions, innermost first
    pub fn referenced_names(&self) -> Vec<&TypeName> {
        match self {
            TypeRef::Class(name) | TypeRef::Enum(name) | TypeRef::Alias(name) => vec![name],
            TypeRef::List(item) | TypeRef::Map(item) => item.referenced_names(),
            TypeRef::Primitive(_) | TypeRef::Unit => Vec::new(),
        }
    }
}

// =============================================================================
// Classes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// No fields
    Plain,
    /// At least one field
    Data,
    /// Wraps a string-keyed map
    MapWrapper,
    /// Closed hierarchy over oneOf alternatives
    Sealed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Key in the JSON document
    pub json_name: String,
    /// Sanitized property name
    pub name: String,
    pub ty: TypeRef,
    pub required: bool,
    pub nullable: bool,
    pub deprecated: bool,
    pub category: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
}

impl FieldDescriptor {
    pub fn new(json_name: &str, ty: TypeRef, required: bool) -> Self {
        let nullable = !required || ty == TypeRef::Unit;
        Self {
            json_name: json_name.to_string(),
            name: to_property_name(json_name),
            ty,
            required,
            nullable,
            deprecated: false,
            category: None,
            description: None,
            format: None,
        }
    }

    /// Field backed by a schema node; descriptive metadata is copied over
    pub fn from_schema(json_name: &str, ty: TypeRef, required: bool, schema: &SchemaNode) -> Self {
        Self {
            deprecated: schema.deprecated,
            category: schema.category.clone(),
            description: schema.description.clone(),
            format: schema.format.clone(),
            ..Self::new(json_name, ty, required)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub package: String,
    pub name: String,
    pub fingerprint: Fingerprint,
    pub fields: Vec<FieldDescriptor>,
    pub kind: ClassKind,
    pub role: Role,
    pub title: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Sealed hierarchies this class is an alternative of
    pub sealed_parents: Vec<TypeName>,
    /// Alternatives of a sealed class
    pub variants: Vec<TypeRef>,
    /// Value type of a map wrapper
    pub map_value: Option<TypeRef>,
    /// Enums nested in this class
    pub nested_enums: Vec<EnumDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: &TypeName, fingerprint: Fingerprint, kind: ClassKind, role: Role) -> Self {
        Self {
            package: name.package.clone(),
            name: name.name.clone(),
            fingerprint,
            fields: Vec::new(),
            kind,
            role,
            title: None,
            description: None,
            deprecated: false,
            sealed_parents: Vec::new(),
            variants: Vec::new(),
            map_value: None,
            nested_enums: Vec::new(),
        }
    }

    pub fn with_schema_metadata(mut self, schema: &SchemaNode) -> Self {
        self.title = schema.title.clone();
        self.description = schema.description.clone();
        self.deprecated = schema.deprecated;
        self
    }

    pub fn type_name(&self) -> TypeName {
        TypeName::new(&self.package, &self.name)
    }

    pub fn field(&self, json_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.json_name == json_name)
    }

    pub fn nested_enum(&self, name: &str) -> Option<&EnumDescriptor> {
        self.nested_enums.iter().find(|e| e.name == name)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// JSON type of enum values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumBacking {
    String,
    Integer,
    Number,
    Boolean,
    /// Every value is a record of named fields
    Object,
}

impl EnumBacking {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumBacking::String => "string",
            EnumBacking::Integer => "integer",
            EnumBacking::Number => "number",
            EnumBacking::Boolean => "boolean",
            EnumBacking::Object => "object",
        }
    }
}

impl From<ScalarKind> for EnumBacking {
    fn from(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Boolean => EnumBacking::Boolean,
            ScalarKind::Integer => EnumBacking::Integer,
            ScalarKind::Number => EnumBacking::Number,
            ScalarKind::String => EnumBacking::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: String,
    pub value: Value,
}

/// A record field of an object-valued enum
#[derive(Debug, Clone, PartialEq)]
pub struct EnumField {
    pub json_name: String,
    pub name: String,
    pub kind: ScalarKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub package: String,
    pub name: String,
    /// Owning class under inline placement
    pub owner: Option<String>,
    pub constants: Vec<EnumConstant>,
    pub backing: EnumBacking,
    pub fields: Vec<EnumField>,
    pub fingerprint: Fingerprint,
    pub description: Option<String>,
}

impl EnumDescriptor {
    pub fn type_name(&self) -> TypeName {
        match &self.owner {
            Some(owner) => TypeName::nested(&self.package, owner, &self.name),
            None => TypeName::new(&self.package, &self.name),
        }
    }

    pub fn constant_names(&self) -> Vec<String> {
        self.constants.iter().map(|c| c.name.clone()).collect()
    }
}

// =============================================================================
// Aliases
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDescriptor {
    pub package: String,
    pub name: String,
    pub target: TypeRef,
    pub sealed_parent: Option<TypeName>,
    pub fingerprint: Fingerprint,
}

impl AliasDescriptor {
    pub fn type_name(&self) -> TypeName {
        TypeName::new(&self.package, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_display() {
        assert_eq!(TypeName::new("org.example", "Lamp").to_string(), "org.example.Lamp");
        assert_eq!(
            TypeName::nested("org.example", "Lamp", "Mode").to_string(),
            "org.example.Lamp.Mode"
        );
        assert_eq!(TypeName::nested("p", "Lamp", "Mode").top_level(), "Lamp");
    }

    #[test]
    fn test_signature() {
        let ty = TypeRef::List(Box::new(TypeRef::Map(Box::new(TypeRef::Primitive(
            ScalarKind::Integer,
        )))));
        assert_eq!(ty.signature(), "list<map<integer>>");
    }

    #[test]
    fn test_field_nullability() {
        let optional = FieldDescriptor::new("battery-level", TypeRef::Primitive(ScalarKind::Integer), false);
        assert_eq!(optional.name, "batteryLevel");
        assert!(optional.nullable);

        let unit = FieldDescriptor::new("nothing", TypeRef::Unit, true);
        assert!(unit.nullable);

        let required = FieldDescriptor::new("on", TypeRef::Primitive(ScalarKind::Boolean), true);
        assert!(!required.nullable);
    }
}
