//! Descriptor assembly for the STT training package
//!
//! This crate handles:
//! - Reading the shared VERSION file
//! - Assembling the flag-dependent requirement list
//! - Discovering importable packages under the source directory
//! - Putting it all together into a [`sttpack_core::PackageDescriptor`]

pub mod reader;
pub mod assembler;
pub mod packages;
pub mod builder;

pub use reader::{VersionReader, VersionError, read_version};
pub use assembler::DependencyAssembler;
pub use packages::{discover_packages, DiscoveryError};
pub use builder::{DescriptorBuilder, BuildError};
