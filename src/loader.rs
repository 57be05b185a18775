//! Model loading
//!
//! Thing Models and referenced fragments are fetched through [`ModelLoader`].
//! Loads are the only suspension points of a generation run; the pipeline
//! awaits them one at a time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{CodegenError, Result};

#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Load the JSON document at `location`
    async fn load(&self, location: &str) -> Result<Value>;

    /// Resolve `href` found in the document at `base`
    fn resolve_location(&self, base: &str, href: &str) -> String {
        resolve_relative(base, href)
    }

    /// Inverse of [`ModelLoader::resolve_location`]: an href that resolves
    /// to `target` from the document at `base`
    fn relative_location(&self, base: &str, target: &str) -> String {
        relative_location(base, target)
    }
}

/// Resolve `href` relative to the directory of `base`.
///
/// Absolute paths and URLs are returned unchanged; `.` and `..` segments
/// are normalized.
pub fn resolve_relative(base: &str, href: &str) -> String {
    if href.contains("://") || href.starts_with('/') {
        return href.to_string();
    }

    let (scheme, base_path) = match base.find("://") {
        Some(index) => base.split_at(index + 3),
        None => ("", base),
    };
    let dir = base_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let joined = if dir.is_empty() {
        href.to_string()
    } else {
        format!("{dir}/{href}")
    };
    format!("{scheme}{}", normalize_path(&joined))
}

/// Express `target` relative to the directory of `base`, so that
/// `resolve_relative(base, result) == target`.
///
/// URLs and absolute paths already resolve to themselves and are returned
/// unchanged, as is a target that cannot be reached from a base directory
/// made of `..` segments.
pub fn relative_location(base: &str, target: &str) -> String {
    if target.contains("://") || target.starts_with('/') || base.contains("://") {
        return target.to_string();
    }

    let base = normalize_path(base);
    let target = normalize_path(target);
    let base_dir: Vec<&str> = match base.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target_parts: Vec<&str> = target.split('/').collect();

    let common = base_dir
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();
    let remaining = &base_dir[common..];
    if remaining.contains(&"..") {
        return target;
    }

    let mut parts = vec![".."; remaining.len()];
    parts.extend_from_slice(&target_parts[common..]);
    parts.join("/")
}

fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

// =============================================================================
// Filesystem
// =============================================================================

/// Loads models from the local filesystem. Relative locations resolve
/// against `root`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, location: &str) -> Result<PathBuf> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Err(CodegenError::Load {
                location: location.to_string(),
                reason: "network loading is not supported; download the model first".to_string(),
            });
        }
        let path = Path::new(location.strip_prefix("file://").unwrap_or(location));
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.root.join(path))
        }
    }
}

#[async_trait]
impl ModelLoader for FsLoader {
    async fn load(&self, location: &str) -> Result<Value> {
        let path = self.path_for(location)?;
        debug!(path = %path.display(), "loading model");

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CodegenError::Load {
                location: location.to_string(),
                reason: e.to_string(),
            })?;
        serde_json::from_str(&content).map_err(|e| CodegenError::Load {
            location: location.to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Serves documents registered up front under their location
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    documents: HashMap<String, Value>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, location: impl Into<String>, document: Value) -> Self {
        self.insert(location, document);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, document: Value) {
        self.documents.insert(location.into(), document);
    }
}

#[async_trait]
impl ModelLoader for InMemoryLoader {
    async fn load(&self, location: &str) -> Result<Value> {
        self.documents
            .get(location)
            .cloned()
            .ok_or_else(|| CodegenError::Load {
                location: location.to_string(),
                reason: "no such document".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative("models/lamp.tm.json", "light.tm.json"), "models/light.tm.json");
        assert_eq!(resolve_relative("models/lamp.tm.json", "./light.tm.json"), "models/light.tm.json");
        assert_eq!(resolve_relative("models/sub/lamp.json", "../common.json"), "models/common.json");
        assert_eq!(resolve_relative("lamp.json", "light.json"), "light.json");
        assert_eq!(resolve_relative("lamp.json", "../up.json"), "../up.json");
        assert_eq!(resolve_relative("/abs/lamp.json", "light.json"), "/abs/light.json");
        assert_eq!(resolve_relative("a/lamp.json", "/abs/x.json"), "/abs/x.json");
        assert_eq!(
            resolve_relative("file:///models/lamp.json", "./light.json"),
            "file:///models/light.json"
        );
        assert_eq!(
            resolve_relative("a/lamp.json", "https://example.com/x.json"),
            "https://example.com/x.json"
        );
    }

    #[test]
    fn test_relative_location_inverts_resolution() {
        let cases = [
            ("models/lamp.json", "models/common.json", "common.json"),
            ("models/lamp.json", "shared/units.json", "../shared/units.json"),
            ("a/b/lamp.json", "a/c/x.json", "../c/x.json"),
            ("lamp.json", "models/common.json", "models/common.json"),
            ("lamp.json", "../up.json", "../up.json"),
            ("models/lamp.json", "/abs/x.json", "/abs/x.json"),
        ];
        for (base, target, expected) in cases {
            let relative = relative_location(base, target);
            assert_eq!(relative, expected, "{base} -> {target}");
            assert_eq!(resolve_relative(base, &relative), target);
        }
        assert_eq!(
            relative_location("file:///models/lamp.json", "file:///models/x.json"),
            "file:///models/x.json"
        );
    }

    #[tokio::test]
    async fn test_in_memory_loader() {
        let loader = InMemoryLoader::new().with_document("a.json", json!({"title": "A"}));
        assert_eq!(loader.load("a.json").await.unwrap()["title"], "A");
        assert!(matches!(
            loader.load("b.json").await.unwrap_err(),
            CodegenError::Load { .. }
        ));
    }

    #[tokio::test]
    async fn test_fs_loader() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lamp.tm.json"), r#"{"title": "Lamp"}"#).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        let loader = FsLoader::new(dir.path());
        assert_eq!(loader.load("lamp.tm.json").await.unwrap()["title"], "Lamp");
        assert!(loader.load("missing.json").await.is_err());
        assert!(loader.load("broken.json").await.is_err());
    }

    #[tokio::test]
    async fn test_fs_loader_rejects_network() {
        let loader = FsLoader::new(".");
        let err = loader.load("https://example.com/lamp.tm.json").await.unwrap_err();
        assert!(matches!(err, CodegenError::Load { .. }));
    }
}
