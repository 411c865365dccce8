//! sttpack Core
//!
//! Domain model for the STT training package descriptor: the version token,
//! dependency constraints, feature flags, configuration and the descriptor
//! schema handed to the publishing toolchain.

pub mod version;
pub mod requirement;
pub mod flags;
pub mod config;
pub mod descriptor;

pub use version::{Version, EmptyVersion, VERSION_FILE};
pub use requirement::{Requirement, RequirementList, VersionSpec, RequirementParseError, DuplicateRequirement};
pub use flags::{FeatureFlag, FeatureFlags};
pub use config::{Config, ConfigError, DependencySet, PackageConfig, CONFIG_FILE};
pub use descriptor::{PackageDescriptor, DescriptorVersion};
