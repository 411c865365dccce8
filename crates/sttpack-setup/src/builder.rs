//! Descriptor assembly
//!
//! Version file -> dependency list -> package discovery -> descriptor.
//! The version read comes first; if it fails nothing else runs and no
//! partial descriptor is produced.

use std::path::Path;
use sttpack_core::{Config, FeatureFlags, PackageDescriptor};

use crate::assembler::DependencyAssembler;
use crate::packages::{discover_packages, DiscoveryError};
use crate::reader::{VersionError, VersionReader};

/// Builds the package descriptor for a project root
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    config: Config,
    flags: FeatureFlags,
}

impl DescriptorBuilder {
    pub fn new(config: Config, flags: FeatureFlags) -> Self {
        Self { config, flags }
    }

    /// Dependency assembler for this builder's config and flags
    pub fn assembler(&self) -> DependencyAssembler {
        DependencyAssembler::new(self.config.dependencies.clone(), self.flags)
    }

    /// Version reader for `project_root`, honoring the configured file name
    pub fn version_reader(&self, project_root: &Path) -> VersionReader {
        VersionReader::new(project_root).with_file_name(self.config.version_file.clone())
    }

    /// Build the descriptor
    pub fn build(&self, project_root: &Path) -> Result<PackageDescriptor, BuildError> {
        let version = self.version_reader(project_root).read()?;

        let install_requires = self.assembler().assemble(&version);

        let source_root = project_root.join(&self.config.package.source_dir);
        let packages = discover_packages(&source_root)?;

        tracing::info!(
            name = %self.config.package.name,
            version = %version,
            requirements = install_requires.len(),
            packages = packages.len(),
            "package descriptor assembled"
        );

        Ok(PackageDescriptor::new(
            &self.config.package,
            version,
            install_requires,
            packages,
        ))
    }
}

/// Descriptor assembly errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_version_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let builder = DescriptorBuilder::new(Config::default(), FeatureFlags::none());

        let err = builder.build(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::Version(VersionError::FileAccess { .. })));
    }

    #[test]
    fn configured_version_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("RELEASE"), "2.0.0\n").unwrap();

        let config = Config {
            version_file: "RELEASE".to_string(),
            ..Config::default()
        };
        let descriptor = DescriptorBuilder::new(config, FeatureFlags::none())
            .build(dir.path())
            .unwrap();

        assert_eq!(descriptor.version.as_str(), "2.0.0");
        assert!(descriptor.packages.is_empty());
    }
}
