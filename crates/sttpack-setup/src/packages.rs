//! Package discovery
//!
//! Lists the importable packages under the source directory: every
//! directory with an `__init__.py` whose parents are packages too.

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

const PACKAGE_MARKER: &str = "__init__.py";

/// Dotted names of all packages below `source_root`, sorted
///
/// A missing source directory yields an empty list.
pub fn discover_packages(source_root: &Path) -> Result<Vec<String>, DiscoveryError> {
    if !source_root.is_dir() {
        tracing::warn!(
            path = %source_root.display(),
            "source directory not found, no packages discovered"
        );
        return Ok(Vec::new());
    }

    let mut packages = Vec::new();

    let walker = WalkDir::new(source_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_package_dir);

    for entry in walker {
        let entry = entry.map_err(|e| DiscoveryError::Walk {
            path: e
                .path()
                .unwrap_or(source_root)
                .display()
                .to_string(),
            message: e.to_string(),
        })?;

        let relative = entry
            .path()
            .strip_prefix(source_root)
            .map_err(|e| DiscoveryError::Walk {
                path: entry.path().display().to_string(),
                message: e.to_string(),
            })?;

        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join(".");

        tracing::trace!(package = %name, "discovered package");
        packages.push(name);
    }

    packages.sort();
    tracing::debug!(
        path = %source_root.display(),
        count = packages.len(),
        "package discovery complete"
    );

    Ok(packages)
}

/// Only descend into package directories, skipping hidden and cache dirs
fn is_package_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir()
        && !name.starts_with('.')
        && name != "__pycache__"
        && entry.path().join(PACKAGE_MARKER).is_file()
}

/// Package discovery errors
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Failed to scan {path}: {message}")]
    Walk { path: String, message: String },
}
