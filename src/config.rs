//! Configuration management for the code generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (thingmodel-codegen.toml)
//! - The user config directory
//! - An explicit file given on the command line
//! - Environment variables (THINGMODEL_CODEGEN__*)
//!
//! ## Example config file (thingmodel-codegen.toml):
//! ```toml
//! [generation]
//! enum_placement = "separate"
//! class_naming = "original-then-compound"
//! dsl_builders = true
//! strict_references = true
//!
//! [output]
//! directory = "build/generated"
//! package = "org.example.devices"
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use config_crate::{Config, Environment, File};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::codegen::GenerationOptions;
use crate::error::{CodegenError, Result};

/// Base name of the config file
pub const CONFIG_FILE_NAME: &str = "thingmodel-codegen.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "THINGMODEL_CODEGEN";

/// Main configuration of the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodegenConfig {
    #[serde(default)]
    pub generation: GenerationOptions,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory of generated sources
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Root package of generated types
    #[serde(default)]
    pub package: Option<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            package: None,
        }
    }
}

impl CodegenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "thingmodel-codegen.toml",
            ".thingmodel-codegen.toml",
            "config/thingmodel-codegen.toml",
        ];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "thingmodel", "codegen") {
            let user_config = dirs.config_dir().join(CONFIG_FILE_NAME);
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Output directory, resolved against the working directory
    pub fn output_dir(&self) -> PathBuf {
        if self.output.directory.is_absolute() {
            self.output.directory.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.output.directory)
        }
    }
}

// =============================================================================
// Package Names
// =============================================================================

fn package_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z_][a-z0-9_]*(\.[a-z_][a-z0-9_]*)*$").unwrap_or_else(|e| {
            unreachable!("package pattern is a valid regex: {e}")
        })
    })
}

/// Check that `package` is a dotted lower-case package name
pub fn validate_package(package: &str) -> Result<()> {
    if package_pattern().is_match(package) {
        Ok(())
    } else {
        Err(CodegenError::InvalidPackage(package.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EnumPlacement;

    #[test]
    fn test_default_config() {
        let config = CodegenConfig::default();
        assert_eq!(config.output.directory, PathBuf::from("generated"));
        assert_eq!(config.generation.max_reference_depth, 16);
        assert_eq!(config.generation.max_schema_depth, 64);
        assert!(!config.generation.strict_references);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codegen.toml");

        let mut config = CodegenConfig::default();
        config.generation.enum_placement = EnumPlacement::Separate;
        config.generation.dsl_builders = true;
        config.output.package = Some("org.example".to_string());
        config.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[generation]"));
        assert!(text.contains("enum_placement = \"separate\""));

        let loaded = CodegenConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.generation.enum_placement, EnumPlacement::Separate);
        assert!(loaded.generation.dsl_builders);
        assert_eq!(loaded.output.package.as_deref(), Some("org.example"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = CodegenConfig::load_from(Some(Path::new("/nonexistent/codegen.toml"))).unwrap_err();
        assert!(matches!(err, CodegenError::Config(_)));
    }

    #[test]
    fn test_validate_package() {
        assert!(validate_package("org.example.lamp").is_ok());
        assert!(validate_package("lamp").is_ok());
        assert!(validate_package("org.example_2").is_ok());
        assert!(validate_package("").is_err());
        assert!(validate_package("Org.Example").is_err());
        assert!(validate_package("org..example").is_err());
        assert!(validate_package("org.example.").is_err());
        assert!(validate_package("org.2d").is_err());
    }
}
