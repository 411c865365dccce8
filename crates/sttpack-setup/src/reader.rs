//! Version file reading
//!
//! Reads the distribution version from `VERSION` in the project root.
//! Any failure here is fatal: a package without a version cannot be
//! published.

use std::path::{Path, PathBuf};
use sttpack_core::{Version, VERSION_FILE};

/// Reads the version token from a project root
#[derive(Debug, Clone)]
pub struct VersionReader {
    project_root: PathBuf,
    file_name: String,
}

impl VersionReader {
    /// Reader for `VERSION` under `project_root`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            file_name: VERSION_FILE.to_string(),
        }
    }

    /// Use a different file name, still relative to the project root
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Full path of the version file
    pub fn path(&self) -> PathBuf {
        self.project_root.join(&self.file_name)
    }

    /// Read and trim the version file
    pub fn read(&self) -> Result<Version, VersionError> {
        let path = self.path();

        let contents = std::fs::read_to_string(&path).map_err(|e| VersionError::FileAccess {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let version = Version::parse(&contents).map_err(|_| VersionError::Empty {
            path: path.display().to_string(),
        })?;

        tracing::debug!(path = %path.display(), version = %version, "read version file");
        Ok(version)
    }
}

/// Read `VERSION` from `project_root`
pub fn read_version(project_root: &Path) -> Result<Version, VersionError> {
    VersionReader::new(project_root).read()
}

/// Version file errors
///
/// Both variants are file-access failures and abort descriptor assembly.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Failed to read version file {path}: {reason}")]
    FileAccess { path: String, reason: String },

    #[error("Version file {path} is empty")]
    Empty { path: String },
}

impl VersionError {
    /// Path of the offending version file
    pub fn path(&self) -> &str {
        match self {
            Self::FileAccess { path, .. } | Self::Empty { path } => path,
        }
    }

    /// Whether this is a version-file access failure (every variant is)
    pub fn is_file_access(&self) -> bool {
        matches!(self, Self::FileAccess { .. } | Self::Empty { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_version(contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("VERSION"), contents).unwrap();
        dir
    }

    #[test]
    fn reads_and_trims() {
        let dir = project_with_version("1.4.0\n");
        let version = read_version(dir.path()).unwrap();
        assert_eq!(version.as_str(), "1.4.0");
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_version(dir.path()).unwrap_err();
        assert!(matches!(err, VersionError::FileAccess { .. }));
        assert!(err.path().ends_with("VERSION"));
    }

    #[test]
    fn whitespace_only_is_rejected() {
        let dir = project_with_version("  \n\t\n");
        let err = read_version(dir.path()).unwrap_err();
        assert!(matches!(err, VersionError::Empty { .. }));
        assert!(err.is_file_access());
    }

    #[test]
    fn custom_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("GRAPH_VERSION"), "6").unwrap();

        let reader = VersionReader::new(dir.path()).with_file_name("GRAPH_VERSION");
        assert_eq!(reader.read().unwrap().as_str(), "6");
    }

    #[test]
    fn directory_in_place_of_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("VERSION")).unwrap();
        let err = read_version(dir.path()).unwrap_err();
        assert!(matches!(err, VersionError::FileAccess { .. }));
    }
}
