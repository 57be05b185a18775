//! Emitter seam and source output

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::GeneratedModel;
use crate::error::Result;

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub package: String,
    /// Top-level type declared in the file
    pub name: String,
    pub extension: String,
    pub contents: String,
}

impl SourceFile {
    /// `<package as path>/<Name>.<extension>`
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect();
        path.push(format!("{}.{}", self.name, self.extension));
        path
    }
}

/// Turns a resolved model into source files
pub trait Emitter: Send + Sync {
    fn emit(&self, model: &GeneratedModel) -> Result<Vec<SourceFile>>;
}

/// Write `sources` under `output_dir`, creating package directories as
/// needed. Returns the written paths in input order.
pub async fn write_sources(output_dir: &Path, sources: &[SourceFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(sources.len());
    for source in sources {
        let path = output_dir.join(source.relative_path());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &source.contents).await?;
        debug!(path = %path.display(), "wrote source");
        written.push(path);
    }
    info!(count = written.len(), dir = %output_dir.display(), "wrote generated sources");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(package: &str, name: &str) -> SourceFile {
        SourceFile {
            package: package.to_string(),
            name: name.to_string(),
            extension: "kt".to_string(),
            contents: format!("class {name}\n"),
        }
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            source("org.example.lamp", "Lamp").relative_path(),
            PathBuf::from("org/example/lamp/Lamp.kt")
        );
        assert_eq!(source("", "Root").relative_path(), PathBuf::from("Root.kt"));
    }

    #[tokio::test]
    async fn test_write_sources() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![source("org.example", "Lamp"), source("org.example.attributes", "Attributes")];

        let written = write_sources(dir.path(), &sources).await.unwrap();

        assert_eq!(written.len(), 2);
        let content = std::fs::read_to_string(dir.path().join("org/example/attributes/Attributes.kt")).unwrap();
        assert_eq!(content, "class Attributes\n");
    }
}
