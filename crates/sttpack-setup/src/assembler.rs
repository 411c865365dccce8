//! Dependency assembly
//!
//! Produces the ordered requirement list: the base list, then the native
//! decoder pinned to the package version, then the numeric backend pinned
//! to its own release. Either optional entry is dropped when its flag is
//! set.

use sttpack_core::{DependencySet, FeatureFlags, Requirement, RequirementList, Version};

/// Builds the requirement list for one flag configuration
#[derive(Debug, Clone)]
pub struct DependencyAssembler {
    dependencies: DependencySet,
    flags: FeatureFlags,
}

impl DependencyAssembler {
    pub fn new(dependencies: DependencySet, flags: FeatureFlags) -> Self {
        Self {
            dependencies,
            flags,
        }
    }

    /// Assembler for the distribution's declared dependency set
    pub fn with_defaults(flags: FeatureFlags) -> Self {
        Self::new(DependencySet::default(), flags)
    }

    /// Trimmed decoder package name
    fn decoder_name(&self) -> &str {
        self.dependencies.decoder.trim()
    }

    /// The decoder constraint for `version`
    ///
    /// Always an exact pin on the package's own version.
    pub fn decoder_requirement(&self, version: &Version) -> Requirement {
        Requirement::exact(self.decoder_name(), version.as_str())
    }

    /// Assemble the requirement list
    ///
    /// Base entries naming the decoder or the backend are dropped so the
    /// decoder pin and the backend pin are the only constraints on them,
    /// whether or not the dependency set was validated.
    pub fn assemble(&self, version: &Version) -> RequirementList {
        let mut requirements = RequirementList::new();

        for requirement in &self.dependencies.base {
            if requirement.names(self.decoder_name())
                || requirement.names(self.dependencies.backend.name())
            {
                tracing::warn!(
                    requirement = %requirement,
                    "base dependency shadows the decoder or backend, ignored"
                );
                continue;
            }
            if !requirements.push(requirement.clone()) {
                tracing::warn!(requirement = %requirement, "duplicate base dependency ignored");
            }
        }

        if self.flags.skip_decoder {
            tracing::debug!(decoder = %self.decoder_name(), "decoder dependency skipped");
        } else {
            requirements.push(self.decoder_requirement(version));
        }

        if self.flags.skip_numeric_backend {
            tracing::debug!(backend = %self.dependencies.backend, "numeric backend dependency skipped");
        } else {
            requirements.push(self.dependencies.backend.clone());
        }

        tracing::debug!(
            version = %version,
            count = requirements.len(),
            "assembled install requirements"
        );

        requirements
    }
}
