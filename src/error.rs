//! Error types for the Thing Model compiler

use thiserror::Error;

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Fatal generation errors.
///
/// A generation run is all-or-nothing: any of these aborts the run and the
/// output directory must be treated as unusable.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Malformed model reference: {value:?} (expected exactly one '#')")]
    MalformedReference { value: String },

    #[error("Model reference {reference:?} does not resolve in {document}")]
    UnresolvedReference { reference: String, document: String },

    #[error("Reference inlining exceeded {limit} passes at {path} (cyclic model references?)")]
    ReferenceDepthExceeded { path: String, limit: usize },

    #[error("Schema at {path} has no declared type")]
    MissingType { path: String },

    #[error("Schema at {path} declares unknown type {declared:?}")]
    UnknownType { path: String, declared: String },

    #[error("Malformed schema at {path}: {reason}")]
    MalformedSchema { path: String, reason: String },

    #[error("Unsupported schema shape at {path}: {construct}")]
    UnsupportedShape { path: String, construct: String },

    #[error("Schema nesting at {path} exceeds the maximum depth of {limit}")]
    SchemaTooDeep { path: String, limit: usize },

    #[error(
        "Enum conflict for {package}.{name}: existing values [{existing}] differ from [{incoming}]",
        existing = .existing.join(", "),
        incoming = .incoming.join(", ")
    )]
    EnumConflict {
        package: String,
        name: String,
        existing: Vec<String>,
        incoming: Vec<String>,
    },

    #[error("Thing Model {model} declares {count} 'tm:extends' links, at most one is supported")]
    MultipleExtends { model: String, count: usize },

    #[error("Invalid Thing Model {location}: {reason}")]
    InvalidModel { location: String, reason: String },

    #[error("Invalid package name: {0}")]
    InvalidPackage(String),

    #[error("Failed to load {location}: {reason}")]
    Load { location: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl CodegenError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(path: &str, construct: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            path: path.to_string(),
            construct: construct.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_conflict_lists_both_sets() {
        let err = CodegenError::EnumConflict {
            package: "org.example.actions".to_string(),
            name: "Mode".to_string(),
            existing: vec!["ON".to_string(), "OFF".to_string()],
            incoming: vec!["AUTO".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("org.example.actions.Mode"));
        assert!(msg.contains("[ON, OFF]"));
        assert!(msg.contains("[AUTO]"));
    }

    #[test]
    fn test_malformed_reference_cites_value() {
        let err = CodegenError::MalformedReference {
            value: "a.json#/x#/y".to_string(),
        };
        assert!(err.to_string().contains("a.json#/x#/y"));
    }
}
