//! Feature flags that exclude optional dependencies
//!
//! Flags are boolean-by-presence: a variable that is set to any non-empty
//! value turns the flag on, including `0` and `false`.

use serde::{Deserialize, Serialize};

/// Recognized feature flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureFlag {
    /// Omit the native decoder dependency
    SkipDecoder,

    /// Omit the numeric/ML backend dependency
    SkipNumericBackend,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 2] = [Self::SkipDecoder, Self::SkipNumericBackend];

    /// Stable flag name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipDecoder => "skip-decoder",
            Self::SkipNumericBackend => "skip-numeric-backend",
        }
    }

    /// Environment variable that sets this flag
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::SkipDecoder => "SKIP_DECODER",
            Self::SkipNumericBackend => "SKIP_NUMERIC_BACKEND",
        }
    }

    /// Older variable name still honored by existing release scripts
    pub fn legacy_env_var(&self) -> &'static str {
        match self {
            Self::SkipDecoder => "DS_NODECODER",
            Self::SkipNumericBackend => "DS_NOTENSORFLOW",
        }
    }
}

impl std::fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluated flag state handed to the dependency assembler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub skip_decoder: bool,

    #[serde(default)]
    pub skip_numeric_backend: bool,
}

impl FeatureFlags {
    /// No flags set: every optional dependency is included
    pub fn none() -> Self {
        Self::default()
    }

    /// Read flags from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| {
            std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Evaluate flags against an arbitrary variable lookup
    ///
    /// A flag is set when either its primary or its legacy variable is
    /// truthy.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut flags = Self::none();

        for flag in FeatureFlag::ALL {
            let enabled = [flag.env_var(), flag.legacy_env_var()]
                .into_iter()
                .any(|key| lookup(key).is_some_and(|value| is_truthy(&value)));

            tracing::debug!(flag = %flag, enabled, "evaluated feature flag");
            flags.set(flag, enabled);
        }

        flags
    }

    /// Whether `flag` is set
    pub fn is_set(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::SkipDecoder => self.skip_decoder,
            FeatureFlag::SkipNumericBackend => self.skip_numeric_backend,
        }
    }

    /// Set or clear `flag`
    pub fn set(&mut self, flag: FeatureFlag, enabled: bool) {
        match flag {
            FeatureFlag::SkipDecoder => self.skip_decoder = enabled,
            FeatureFlag::SkipNumericBackend => self.skip_numeric_backend = enabled,
        }
    }

    /// Builder-style variant of [`FeatureFlags::set`]
    pub fn with(mut self, flag: FeatureFlag, enabled: bool) -> Self {
        self.set(flag, enabled);
        self
    }

    /// Flags currently set, in declaration order
    pub fn enabled(&self) -> Vec<FeatureFlag> {
        FeatureFlag::ALL
            .into_iter()
            .filter(|flag| self.is_set(*flag))
            .collect()
    }
}

/// Presence rule: any non-empty value is true
pub fn is_truthy(value: &str) -> bool {
    !value.is_empty()
}
