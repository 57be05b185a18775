//! Schema graph
//!
//! The normalized in-memory form of one JSON-Schema-like node as it appears
//! in a Thing Model. Parsing is strict: anything the compiler cannot map to a
//! type is rejected here, so later stages can match exhaustively on
//! [`SchemaKind`] without fallbacks.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::error::{CodegenError, Result};
use crate::fingerprint::Fingerprint;

/// Marker key of an embedded model reference (`"tm:ref": "<doc>#<pointer>"`)
pub const MODEL_REF_KEY: &str = "tm:ref";

/// Opaque grouping label attached to a property
pub const CATEGORY_KEY: &str = "ditto:category";

// =============================================================================
// Types
// =============================================================================

/// JSON scalar types that map onto host-language primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Boolean,
    Integer,
    Number,
    String,
}

impl ScalarKind {
    /// The JSON Schema type name
    pub fn json_type(&self) -> &'static str {
        match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::String => "string",
        }
    }

    /// Infer the scalar kind of a JSON value, if it is a scalar
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(_) => Some(ScalarKind::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(ScalarKind::Integer),
            Value::Number(_) => Some(ScalarKind::Number),
            Value::String(_) => Some(ScalarKind::String),
            _ => None,
        }
    }
}

/// One schema node
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub deprecated: bool,
    /// Value of the `ditto:category` tag
    pub category: Option<String>,
    /// Declared `enum` values, kept verbatim
    pub enumeration: Option<Vec<Value>>,
    pub kind: SchemaKind,
}

/// The variant a node resolves as. A node is exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Boolean,
    Integer,
    Number,
    String,
    Null,
    Object(ObjectSchema),
    Array(ArraySchema),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Properties in document order
    pub properties: IndexMap<String, SchemaNode>,
    pub required: Vec<String>,
    pub one_of: Option<Vec<SchemaNode>>,
    pub map_values: Option<MapValues>,
    /// A model reference that was not inlined
    pub model_ref: Option<String>,
}

/// Value schema of a map-shaped object
#[derive(Debug, Clone, PartialEq)]
pub enum MapValues {
    Pattern { pattern: String, schema: Box<SchemaNode> },
    Additional(Box<SchemaNode>),
}

impl MapValues {
    pub fn schema(&self) -> &SchemaNode {
        match self {
            MapValues::Pattern { schema, .. } => schema,
            MapValues::Additional(schema) => schema,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            MapValues::Pattern { .. } => "patternProperties",
            MapValues::Additional(_) => "additionalProperties",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
}

// =============================================================================
// Construction
// =============================================================================

impl SchemaNode {
    /// A node with no metadata
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            title: None,
            description: None,
            format: None,
            deprecated: false,
            category: None,
            enumeration: None,
            kind,
        }
    }

    /// Synthesize an object node from already parsed properties
    pub fn object(properties: IndexMap<String, SchemaNode>, required: Vec<String>) -> Self {
        Self::new(SchemaKind::Object(ObjectSchema {
            properties,
            required,
            ..ObjectSchema::default()
        }))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_enumeration(mut self, values: Vec<Value>) -> Self {
        self.enumeration = Some(values);
        self
    }

    /// Parse a schema node. `path` locates the node in its document and is
    /// only used for error reporting.
    pub fn from_json(value: &Value, path: &str) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| CodegenError::malformed(path, "schema must be a JSON object"))?;

        let kind = parse_kind(map, path)?;

        let enumeration = match map.get("enum") {
            None => None,
            Some(Value::Array(values)) => Some(values.clone()),
            Some(_) => return Err(CodegenError::malformed(path, "'enum' must be an array")),
        };

        Ok(Self {
            title: string_field(map, "title", path)?,
            description: string_field(map, "description", path)?,
            format: string_field(map, "format", path)?,
            deprecated: map.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
            category: string_field(map, CATEGORY_KEY, path)?,
            enumeration,
            kind,
        })
    }
}

fn parse_kind(map: &Map<String, Value>, path: &str) -> Result<SchemaKind> {
    let declared = match map.get("type") {
        None => {
            return Err(CodegenError::MissingType {
                path: path.to_string(),
            })
        }
        Some(Value::String(declared)) => declared.as_str(),
        Some(Value::Array(_)) => {
            return Err(CodegenError::unsupported(path, "multiple types in 'type'"))
        }
        Some(other) => {
            return Err(CodegenError::UnknownType {
                path: path.to_string(),
                declared: other.to_string(),
            })
        }
    };

    if declared != "object" && map.contains_key("oneOf") {
        return Err(CodegenError::unsupported(
            path,
            format!("'oneOf' on a schema of type '{declared}'"),
        ));
    }

    let kind = match declared {
        "boolean" => SchemaKind::Boolean,
        "integer" => SchemaKind::Integer,
        "number" => SchemaKind::Number,
        "string" => SchemaKind::String,
        "null" => SchemaKind::Null,
        "object" => SchemaKind::Object(parse_object(map, path)?),
        "array" => SchemaKind::Array(parse_array(map, path)?),
        other => {
            return Err(CodegenError::UnknownType {
                path: path.to_string(),
                declared: other.to_string(),
            })
        }
    };
    Ok(kind)
}

fn parse_object(map: &Map<String, Value>, path: &str) -> Result<ObjectSchema> {
    let mut properties = IndexMap::new();
    match map.get("properties") {
        None => {}
        Some(Value::Object(props)) => {
            for (name, schema) in props {
                let child = SchemaNode::from_json(schema, &format!("{path}/properties/{name}"))?;
                properties.insert(name.clone(), child);
            }
        }
        Some(_) => return Err(CodegenError::malformed(path, "'properties' must be an object")),
    }

    let required = match map.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| CodegenError::malformed(path, "'required' must list strings"))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(CodegenError::malformed(path, "'required' must be an array")),
    };

    let one_of = match map.get("oneOf") {
        None => None,
        Some(Value::Array(alternatives)) => Some(
            alternatives
                .iter()
                .enumerate()
                .map(|(i, alt)| SchemaNode::from_json(alt, &format!("{path}/oneOf/{i}")))
                .collect::<Result<Vec<_>>>()?,
        ),
        Some(_) => return Err(CodegenError::malformed(path, "'oneOf' must be an array")),
    };

    Ok(ObjectSchema {
        properties,
        required,
        one_of,
        map_values: parse_map_values(map, path)?,
        model_ref: map.get(MODEL_REF_KEY).map(|r| match r {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
    })
}

fn parse_map_values(map: &Map<String, Value>, path: &str) -> Result<Option<MapValues>> {
    // pattern-keyed maps win over additionalProperties
    if let Some(patterns) = map.get("patternProperties") {
        let patterns = patterns
            .as_object()
            .ok_or_else(|| CodegenError::malformed(path, "'patternProperties' must be an object"))?;
        if patterns.len() > 1 {
            return Err(CodegenError::unsupported(
                path,
                format!("{} patterns in 'patternProperties'", patterns.len()),
            ));
        }
        if let Some((pattern, schema)) = patterns.iter().next() {
            let schema = SchemaNode::from_json(schema, &format!("{path}/patternProperties/{pattern}"))?;
            return Ok(Some(MapValues::Pattern {
                pattern: pattern.clone(),
                schema: Box::new(schema),
            }));
        }
    }

    match map.get("additionalProperties") {
        Some(schema @ Value::Object(_)) => {
            let schema = SchemaNode::from_json(schema, &format!("{path}/additionalProperties"))?;
            Ok(Some(MapValues::Additional(Box::new(schema))))
        }
        _ => Ok(None),
    }
}

fn parse_array(map: &Map<String, Value>, path: &str) -> Result<ArraySchema> {
    match map.get("items") {
        Some(items @ Value::Object(_)) => Ok(ArraySchema {
            items: Box::new(SchemaNode::from_json(items, &format!("{path}/items"))?),
        }),
        Some(Value::Array(_)) => Err(CodegenError::unsupported(path, "tuple-typed 'items'")),
        Some(_) => Err(CodegenError::malformed(path, "'items' must be a schema object")),
        None => Err(CodegenError::malformed(path, "array schema without 'items'")),
    }
}

fn string_field(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CodegenError::malformed(path, format!("'{key}' must be a string"))),
    }
}

// =============================================================================
// Queries
// =============================================================================

impl SchemaNode {
    /// The scalar kind for primitive nodes
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.kind {
            SchemaKind::Boolean => Some(ScalarKind::Boolean),
            SchemaKind::Integer => Some(ScalarKind::Integer),
            SchemaKind::Number => Some(ScalarKind::Number),
            SchemaKind::String => Some(ScalarKind::String),
            _ => None,
        }
    }

    /// Non-empty enum value set, if declared
    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enumeration
            .as_deref()
            .filter(|values| !values.is_empty())
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            SchemaKind::Boolean => "boolean",
            SchemaKind::Integer => "integer",
            SchemaKind::Number => "number",
            SchemaKind::String => "string",
            SchemaKind::Null => "null",
            SchemaKind::Object(_) => "object",
            SchemaKind::Array(_) => "array",
        }
    }

    /// The structural part of the node: everything that affects the shape of
    /// the generated type, and nothing descriptive (title, description,
    /// deprecation, category).
    pub fn structure(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.type_name()));
        if let Some(format) = &self.format {
            out.insert("format".into(), json!(format));
        }
        if let Some(values) = &self.enumeration {
            out.insert("enum".into(), Value::Array(values.clone()));
        }
        match &self.kind {
            SchemaKind::Object(object) => {
                let properties: Map<String, Value> = object
                    .properties
                    .iter()
                    .map(|(name, node)| (name.clone(), node.structure()))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                if !object.required.is_empty() {
                    out.insert("required".into(), json!(object.required));
                }
                if let Some(alternatives) = &object.one_of {
                    let alternatives: Vec<Value> =
                        alternatives.iter().map(SchemaNode::structure).collect();
                    out.insert("oneOf".into(), Value::Array(alternatives));
                }
                if let Some(values) = &object.map_values {
                    out.insert(values.keyword().into(), values.schema().structure());
                }
            }
            SchemaKind::Array(array) => {
                out.insert("items".into(), array.items.structure());
            }
            _ => {}
        }
        Value::Object(out)
    }

    /// Structural fingerprint of this node
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_json(&self.structure())
    }
}

impl ObjectSchema {
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// The only property, if there is exactly one
    pub fn sole_property(&self) -> Option<(&String, &SchemaNode)> {
        if self.properties.len() == 1 {
            self.properties.iter().next()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: Value) -> Result<SchemaNode> {
        SchemaNode::from_json(&value, "#")
    }

    #[test]
    fn test_parse_object_preserves_property_order() {
        let node = parse(json!({
            "type": "object",
            "title": "Status",
            "properties": {
                "zeta": {"type": "string"},
                "alpha": {"type": "integer"},
                "mid": {"type": "boolean"}
            },
            "required": ["alpha"]
        }))
        .unwrap();

        let object = node.as_object().unwrap();
        let names: Vec<&str> = object.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(object.is_required("alpha"));
        assert!(!object.is_required("zeta"));
        assert_eq!(node.title.as_deref(), Some("Status"));
    }

    #[test]
    fn test_missing_type_is_fatal() {
        let err = parse(json!({"properties": {"a": {"title": "no type"}}, "type": "object"})).unwrap_err();
        match err {
            CodegenError::MissingType { path } => assert_eq!(path, "#/properties/a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let err = parse(json!({"type": "decimal"})).unwrap_err();
        assert!(matches!(err, CodegenError::UnknownType { declared, .. } if declared == "decimal"));
    }

    #[test]
    fn test_one_of_outside_object_is_unsupported() {
        let err = parse(json!({"type": "string", "oneOf": []})).unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedShape { .. }));
    }

    #[test]
    fn test_pattern_properties_win_over_additional() {
        let node = parse(json!({
            "type": "object",
            "patternProperties": {"^[a-z]+$": {"type": "integer"}},
            "additionalProperties": {"type": "string"}
        }))
        .unwrap();

        match &node.as_object().unwrap().map_values {
            Some(MapValues::Pattern { pattern, schema }) => {
                assert_eq!(pattern, "^[a-z]+$");
                assert_eq!(schema.scalar_kind(), Some(ScalarKind::Integer));
            }
            other => panic!("expected pattern map, got {other:?}"),
        }
    }

    #[test]
    fn test_boolean_additional_properties_is_not_a_map() {
        let node = parse(json!({"type": "object", "additionalProperties": false})).unwrap();
        assert!(node.as_object().unwrap().map_values.is_none());
    }

    #[test]
    fn test_several_patterns_are_unsupported() {
        let err = parse(json!({
            "type": "object",
            "patternProperties": {"^a": {"type": "string"}, "^b": {"type": "string"}}
        }))
        .unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedShape { .. }));
    }

    #[test]
    fn test_array_requires_items() {
        assert!(matches!(
            parse(json!({"type": "array"})).unwrap_err(),
            CodegenError::MalformedSchema { .. }
        ));
        assert!(matches!(
            parse(json!({"type": "array", "items": [{"type": "string"}]})).unwrap_err(),
            CodegenError::UnsupportedShape { .. }
        ));
    }

    #[test]
    fn test_category_and_metadata() {
        let node = parse(json!({
            "type": "number",
            "ditto:category": "status",
            "deprecated": true,
            "format": "float"
        }))
        .unwrap();
        assert_eq!(node.category.as_deref(), Some("status"));
        assert!(node.deprecated);
        assert_eq!(node.format.as_deref(), Some("float"));
    }

    #[test]
    fn test_fingerprint_ignores_descriptive_metadata() {
        let a = parse(json!({
            "type": "object",
            "title": "A",
            "properties": {"x": {"type": "string", "description": "one"}}
        }))
        .unwrap();
        let b = parse(json!({
            "type": "object",
            "title": "B",
            "properties": {"x": {"type": "string", "ditto:category": "misc"}}
        }))
        .unwrap();
        let c = parse(json!({
            "type": "object",
            "properties": {"x": {"type": "integer"}}
        }))
        .unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_empty_enum_is_ignored() {
        let node = parse(json!({"type": "string", "enum": []})).unwrap();
        assert!(node.enum_values().is_none());
    }
}
