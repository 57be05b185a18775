//! Render Profile
//!
//! Target-language settings consumed by the emitter: scalar type mappings,
//! container spelling and file layout. Type resolution never reads this.

use serde::{Deserialize, Serialize};

use crate::schema::ScalarKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderProfile {
    pub types: TypeMappings,

    /// File extension of generated sources
    pub extension: String,

    /// One level of indentation
    pub indent: String,
}

/// Target types of the JSON scalars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMappings {
    pub string: String,
    pub integer: String,
    pub number: String,
    pub boolean: String,
    /// Untyped JSON, also used for `null` schemas
    pub any: String,
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self::kotlin()
    }
}

impl RenderProfile {
    /// Kotlin with kotlinx-serialization
    pub fn kotlin() -> Self {
        Self {
            types: TypeMappings {
                string: "String".to_string(),
                integer: "Long".to_string(),
                number: "Double".to_string(),
                boolean: "Boolean".to_string(),
                any: "kotlinx.serialization.json.JsonElement".to_string(),
            },
            extension: "kt".to_string(),
            indent: "    ".to_string(),
        }
    }

    pub fn scalar_type(&self, kind: ScalarKind) -> &str {
        match kind {
            ScalarKind::String => &self.types.string,
            ScalarKind::Integer => &self.types.integer,
            ScalarKind::Number => &self.types.number,
            ScalarKind::Boolean => &self.types.boolean,
        }
    }

    pub fn wrap_nullable(&self, type_str: &str) -> String {
        if type_str.ends_with('?') {
            type_str.to_string()
        } else {
            format!("{type_str}?")
        }
    }

    pub fn wrap_list(&self, type_str: &str) -> String {
        format!("List<{type_str}>")
    }

    pub fn wrap_map(&self, value_type: &str) -> String {
        format!("Map<String, {value_type}>")
    }

    /// A string literal with quotes, backslashes and templates escaped
    pub fn string_literal(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('"');
        for c in value.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '$' => out.push_str("\\$"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                other => out.push(other),
            }
        }
        out.push('"');
        out
    }

    pub fn indent(&self, level: usize) -> String {
        self.indent.repeat(level)
    }
}
