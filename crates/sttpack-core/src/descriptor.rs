//! Package descriptor schema (stable v1)
//!
//! This is what the publishing toolchain consumes.
//! Breaking changes require a new schema version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::config::PackageConfig;
use crate::requirement::{Requirement, RequirementList};
use crate::version::Version;

/// Descriptor schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl DescriptorVersion {
    /// Current descriptor schema version
    pub const CURRENT: DescriptorVersion = DescriptorVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for DescriptorVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Finished package descriptor
///
/// Serializes deterministically: maps are ordered and the requirement list
/// keeps assembly order, so identical inputs give identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Schema version
    pub schema: DescriptorVersion,

    pub name: String,

    /// Package version, read from the version file
    pub version: Version,

    pub description: String,

    pub url: String,

    pub author: String,

    pub license: String,

    pub classifiers: Vec<String>,

    pub python_requires: String,

    /// Package name prefix -> directory; `""` maps the root package namespace
    pub package_dir: BTreeMap<String, String>,

    /// Discovered importable packages (dotted names)
    pub packages: Vec<String>,

    /// Assembled runtime dependencies
    pub install_requires: RequirementList,

    /// Data files shipped per package
    pub package_data: BTreeMap<String, Vec<String>>,
}

impl PackageDescriptor {
    /// Assemble a descriptor from static metadata and computed fields
    pub fn new(
        metadata: &PackageConfig,
        version: Version,
        install_requires: RequirementList,
        packages: Vec<String>,
    ) -> Self {
        Self {
            schema: DescriptorVersion::CURRENT,
            name: metadata.name.clone(),
            version,
            description: metadata.description.clone(),
            url: metadata.url.clone(),
            author: metadata.author.clone(),
            license: metadata.license.clone(),
            classifiers: metadata.classifiers.clone(),
            python_requires: metadata.python_requires.clone(),
            package_dir: BTreeMap::from([(String::new(), metadata.source_dir.clone())]),
            packages,
            install_requires,
            package_data: metadata.package_data.clone(),
        }
    }

    /// Requirement for `package`, if it is declared
    pub fn requirement(&self, package: &str) -> Option<&Requirement> {
        self.install_requires.get(package)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a descriptor previously written with [`PackageDescriptor::to_json`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackageDescriptor {
        let mut requires = RequirementList::new();
        requires.push(Requirement::any("numpy"));
        requires.push(Requirement::exact("coqui_stt_ctcdecoder", "1.4.0"));

        PackageDescriptor::new(
            &PackageConfig::default(),
            Version::parse("1.4.0").unwrap(),
            requires,
            vec!["coqui_stt_training".to_string()],
        )
    }

    #[test]
    fn copies_static_metadata() {
        let descriptor = sample();
        assert_eq!(descriptor.schema, DescriptorVersion::CURRENT);
        assert_eq!(descriptor.name, "coqui_stt_training");
        assert_eq!(descriptor.license, "MPL-2.0");
        assert_eq!(descriptor.package_dir.get(""), Some(&"training".to_string()));
        assert_eq!(
            descriptor.package_data.get("coqui_stt_training"),
            Some(&vec!["VERSION".to_string(), "GRAPH_VERSION".to_string()])
        );
    }

    #[test]
    fn requirement_lookup() {
        let descriptor = sample();
        let decoder = descriptor.requirement("coqui-stt-ctcdecoder").unwrap();
        assert_eq!(decoder.pinned_version(), Some(descriptor.version.as_str()));
        assert!(descriptor.requirement("tensorflow").is_none());
    }

    #[test]
    fn descriptor_serialization() {
        let descriptor = sample();
        let json = descriptor.to_json().unwrap();
        assert!(json.contains("\"schema\""));
        assert!(json.contains("\"coqui_stt_ctcdecoder == 1.4.0\""));

        let parsed = PackageDescriptor::from_json(&json).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn version_with_interior_space_reads_back() {
        let version = Version::parse(" 1.4 beta \n").unwrap();
        let mut requires = RequirementList::new();
        requires.push(Requirement::exact("coqui_stt_ctcdecoder", version.as_str()));

        let descriptor =
            PackageDescriptor::new(&PackageConfig::default(), version, requires, Vec::new());
        let json = descriptor.to_json().unwrap();
        assert!(json.contains("\"coqui_stt_ctcdecoder == 1.4 beta\""));

        let parsed = PackageDescriptor::from_json(&json).unwrap();
        assert_eq!(
            parsed.requirement("coqui_stt_ctcdecoder").and_then(Requirement::pinned_version),
            Some("1.4 beta")
        );
        assert_eq!(parsed, descriptor);
    }
}
