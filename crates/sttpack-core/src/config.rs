//! Configuration schema (sttpack.toml)
//!
//! Every field is optional; anything omitted keeps the distribution's
//! declared metadata and dependency constraints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::requirement::{Requirement, RequirementList, VersionSpec, normalize_name};
use crate::version::VERSION_FILE;

/// Conventional config file name, looked up in the project root
pub const CONFIG_FILE: &str = "sttpack.toml";

/// Static package metadata copied into the descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Distribution name
    pub name: String,

    /// One-line summary
    pub description: String,

    /// Project homepage
    pub url: String,

    pub author: String,

    /// SPDX license identifier
    pub license: String,

    /// Trove classifiers
    pub classifiers: Vec<String>,

    /// Supported interpreter range
    pub python_requires: String,

    /// Directory (relative to the project root) holding the importable packages
    pub source_dir: String,

    /// Data files shipped inside each package
    pub package_data: BTreeMap<String, Vec<String>>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        let name = "coqui_stt_training".to_string();
        let package_data = BTreeMap::from([(
            name.clone(),
            vec![VERSION_FILE.to_string(), "GRAPH_VERSION".to_string()],
        )]);

        Self {
            name,
            description: "Training code for Coqui STT".to_string(),
            url: "https://github.com/coqui-ai/STT".to_string(),
            author: "Coqui STT authors".to_string(),
            license: "MPL-2.0".to_string(),
            classifiers: [
                "Development Status :: 3 - Alpha",
                "Intended Audience :: Developers",
                "Topic :: Multimedia :: Sound/Audio :: Speech",
                "License :: OSI Approved :: Mozilla Public License 2.0 (MPL 2.0)",
                "Programming Language :: Python :: 3",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            python_requires: ">=3.5, <4".to_string(),
            source_dir: "training".to_string(),
            package_data,
        }
    }
}

/// Dependency constraints declared by the distribution maintainers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencySet {
    /// Unconditional dependencies, in declaration order
    pub base: Vec<Requirement>,

    /// Native decoder package; always pinned to the package's own version
    pub decoder: String,

    /// Numeric/ML backend, pinned to its own release
    pub backend: Requirement,
}

impl Default for DependencySet {
    fn default() -> Self {
        let base = [
            Requirement::any("absl-py"),
            Requirement::any("attrdict"),
            Requirement::any("bs4"),
            Requirement::any("numpy"),
            Requirement::any("optuna"),
            Requirement::exact("opuslib", "2.0.0"),
            Requirement::any("pandas"),
            Requirement::any("progressbar2"),
            Requirement::at_least("pyogg", "0.6.14a1"),
            Requirement::any("pyxdg"),
            Requirement::at_least("resampy", "0.2.2"),
            Requirement::any("requests"),
            Requirement::any("semver"),
            Requirement::any("six"),
            Requirement::any("sox"),
            Requirement::any("soundfile"),
        ];

        Self {
            base: base.into(),
            decoder: "coqui_stt_ctcdecoder".to_string(),
            backend: Requirement::exact("tensorflow", "1.15.4"),
        }
    }
}

impl DependencySet {
    /// Check the set can be assembled without breaking the decoder pin
    ///
    /// The base list must not name the decoder or the backend, must not
    /// repeat a package, and the backend must be an exact pin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let decoder = self.decoder.trim();
        if !matches!(
            Requirement::parse(decoder).map(|r| r.spec().clone()),
            Ok(VersionSpec::Any)
        ) {
            return Err(ConfigError::Invalid(format!(
                "decoder must be a bare package name, got '{}'",
                self.decoder
            )));
        }

        if self.backend.pinned_version().is_none() {
            return Err(ConfigError::Invalid(format!(
                "backend must be pinned with ==, got '{}'",
                self.backend
            )));
        }

        if self.backend.names(decoder) {
            return Err(ConfigError::Invalid(format!(
                "backend and decoder both name '{}'",
                decoder
            )));
        }

        let mut seen = RequirementList::new();
        for requirement in &self.base {
            if requirement.names(decoder) {
                return Err(ConfigError::Invalid(format!(
                    "base dependencies must not list the decoder '{}'",
                    decoder
                )));
            }
            if requirement.names(self.backend.name()) {
                return Err(ConfigError::Invalid(format!(
                    "base dependencies must not list the backend '{}'",
                    self.backend.name()
                )));
            }
            if !seen.push(requirement.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "base dependencies list '{}' more than once",
                    normalize_name(requirement.name())
                )));
            }
        }

        Ok(())
    }
}

fn default_version_file() -> String {
    VERSION_FILE.to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Version file name, relative to the project root
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Static package metadata
    #[serde(default)]
    pub package: PackageConfig,

    /// Dependency constraints
    #[serde(default)]
    pub dependencies: DependencySet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version_file: default_version_file(),
            package: PackageConfig::default(),
            dependencies: DependencySet::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let config = Self::from_toml(&contents)?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version_file.trim().is_empty() {
            return Err(ConfigError::Invalid("version_file must not be empty".to_string()));
        }
        if self.package.name.trim().is_empty() {
            return Err(ConfigError::Invalid("package.name must not be empty".to_string()));
        }

        self.dependencies.validate()
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.version_file, "VERSION");
        assert_eq!(config.package.name, "coqui_stt_training");
        assert_eq!(config.dependencies.base.len(), 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_keeps_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.dependencies, DependencySet::default());
        assert_eq!(config.package, PackageConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = Config::from_toml(
            r#"
            [package]
            source_dir = "src"

            [dependencies]
            base = ["numpy", "opuslib == 2.0.0"]
            backend = "tensorflow == 2.3.0"
            "#,
        )
        .unwrap();

        assert_eq!(config.package.source_dir, "src");
        assert_eq!(config.package.license, "MPL-2.0");
        assert_eq!(
            config.dependencies.base,
            vec![Requirement::any("numpy"), Requirement::exact("opuslib", "2.0.0")]
        );
        assert_eq!(config.dependencies.decoder, "coqui_stt_ctcdecoder");
        assert_eq!(config.dependencies.backend.pinned_version(), Some("2.3.0"));
    }

    #[test]
    fn rejects_decoder_in_base_list() {
        let err = Config::from_toml(
            r#"
            [dependencies]
            base = ["numpy", "coqui-stt-ctcdecoder >= 0.9"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unpinned_backend() {
        let err = Config::from_toml(
            r#"
            [dependencies]
            backend = "tensorflow >= 1.15"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_duplicate_base_entries() {
        let err = Config::from_toml(
            r#"
            [dependencies]
            base = ["numpy", "NumPy == 1.19.0"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_requirement() {
        let err = Config::from_toml(
            r#"
            [dependencies]
            base = ["numpy <= 2"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config.dependencies, parsed.dependencies);
        assert_eq!(config.package, parsed.package);
    }
}
