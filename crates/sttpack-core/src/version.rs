//! Distribution version token
//!
//! The same token versions the package itself and pins the native decoder,
//! so it is validated once here and passed around by value afterwards.

use serde::{Deserialize, Serialize};

/// Conventional name of the version file, relative to the project root
pub const VERSION_FILE: &str = "VERSION";

/// Non-empty, whitespace-trimmed version string
///
/// The format is not checked beyond non-emptiness (`1.2.3`, `1.2.3-alpha.1`
/// and anything else a release script writes are all accepted).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    /// Parse a version token, stripping surrounding whitespace
    pub fn parse(raw: &str) -> Result<Self, EmptyVersion> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyVersion);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The version as written in the version file (trimmed)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Version {
    type Err = EmptyVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = EmptyVersion;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// Returned when a version token is empty or whitespace-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("version string is empty")]
pub struct EmptyVersion;
