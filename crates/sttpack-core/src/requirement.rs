//! Dependency constraints
//!
//! A requirement is a package name plus an optional version constraint,
//! written the way package indexes expect it (`opuslib == 2.0.0`,
//! `pyogg >= 0.6.14a1`, `numpy`).

use serde::{Deserialize, Serialize};

/// Version constraint attached to a requirement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpec {
    /// Any version
    Any,

    /// Exactly this version (`==`)
    Exact(String),

    /// This version or newer (`>=`)
    AtLeast(String),
}

impl VersionSpec {
    /// Constraint operator as written in a requirement string
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Exact(_) => Some("=="),
            Self::AtLeast(_) => Some(">="),
        }
    }

    /// Version operand, if any
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Exact(v) | Self::AtLeast(v) => Some(v),
        }
    }
}

/// A single dependency constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Requirement {
    name: String,
    spec: VersionSpec,
}

impl Requirement {
    /// Requirement on any version of `name`
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: VersionSpec::Any,
        }
    }

    /// Requirement pinned to exactly `version`
    pub fn exact(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: VersionSpec::Exact(version.into()),
        }
    }

    /// Requirement on `version` or newer
    pub fn at_least(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: VersionSpec::AtLeast(version.into()),
        }
    }

    /// Parse a requirement string such as `resampy >= 0.2.2`
    ///
    /// Only `==` and `>=` are understood; other operators are rejected
    /// rather than silently widened. The operand of `==` is taken verbatim
    /// (trimmed), so any [`Version`](crate::Version) renders into a pin that
    /// parses back to the same requirement.
    pub fn parse(input: &str) -> Result<Self, RequirementParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RequirementParseError::Empty);
        }

        let (name, spec) = if let Some((name, version)) = input.split_once("==") {
            (name, VersionSpec::Exact(parse_pin(input, version)?))
        } else if let Some((name, version)) = input.split_once(">=") {
            (name, VersionSpec::AtLeast(parse_operand(input, version)?))
        } else {
            (input, VersionSpec::Any)
        };

        let name = name.trim();
        if name.contains(|c: char| OPERATOR_CHARS.contains(&c)) {
            return Err(RequirementParseError::UnsupportedOperator(input.to_string()));
        }
        if !is_valid_name(name) {
            return Err(RequirementParseError::InvalidName(input.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            spec,
        })
    }

    /// Package name as declared
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version constraint
    pub fn spec(&self) -> &VersionSpec {
        &self.spec
    }

    /// The exact version this requirement pins, if it is an `==` constraint
    pub fn pinned_version(&self) -> Option<&str> {
        match &self.spec {
            VersionSpec::Exact(v) => Some(v),
            _ => None,
        }
    }

    /// Normalized package name used for duplicate detection
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Whether this requirement names `package` (after normalization)
    pub fn names(&self, package: &str) -> bool {
        self.normalized_name() == normalize_name(package)
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.spec.operator(), self.spec.version()) {
            (Some(op), Some(version)) => write!(f, "{} {} {}", self.name, op, version),
            _ => f.write_str(&self.name),
        }
    }
}

impl std::str::FromStr for Requirement {
    type Err = RequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Requirement {
    type Error = RequirementParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Requirement> for String {
    fn from(requirement: Requirement) -> Self {
        requirement.to_string()
    }
}

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '!', '~', ','];

/// Operand of an exact pin: any non-empty text, like a version file token
fn parse_pin(input: &str, operand: &str) -> Result<String, RequirementParseError> {
    let operand = operand.trim();
    if operand.is_empty() {
        return Err(RequirementParseError::InvalidVersion(input.to_string()));
    }
    Ok(operand.to_string())
}

fn parse_operand(input: &str, operand: &str) -> Result<String, RequirementParseError> {
    let operand = operand.trim();
    if operand.is_empty()
        || operand.contains(char::is_whitespace)
        || operand.contains(|c: char| OPERATOR_CHARS.contains(&c))
    {
        return Err(RequirementParseError::InvalidVersion(input.to_string()));
    }
    Ok(operand.to_string())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Lowercase and collapse runs of `-`, `_` and `.` into a single `-`
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
                in_separator = true;
            }
        } else {
            normalized.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }

    normalized
}

/// Requirement string parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementParseError {
    #[error("Empty requirement string")]
    Empty,

    #[error("Invalid package name in requirement '{0}'")]
    InvalidName(String),

    #[error("Invalid version in requirement '{0}'")]
    InvalidVersion(String),

    #[error("Unsupported version operator in requirement '{0}' (only == and >= are allowed)")]
    UnsupportedOperator(String),
}

/// Ordered list of requirements with unique package names
///
/// Insertion order is kept so generated manifests are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Requirement>", into = "Vec<Requirement>")]
pub struct RequirementList {
    requirements: Vec<Requirement>,
}

impl RequirementList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a requirement
    ///
    /// Returns `false` and leaves the list untouched if a requirement with
    /// the same normalized name is already present.
    pub fn push(&mut self, requirement: Requirement) -> bool {
        if self.contains(requirement.name()) {
            return false;
        }
        self.requirements.push(requirement);
        true
    }

    /// Whether a requirement for `package` is present
    pub fn contains(&self, package: &str) -> bool {
        self.get(package).is_some()
    }

    /// Look up the requirement for `package`
    pub fn get(&self, package: &str) -> Option<&Requirement> {
        let wanted = normalize_name(package);
        self.requirements
            .iter()
            .find(|r| r.normalized_name() == wanted)
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.requirements.iter()
    }

    /// Requirement strings in order
    pub fn to_strings(&self) -> Vec<String> {
        self.requirements.iter().map(ToString::to_string).collect()
    }
}

impl TryFrom<Vec<Requirement>> for RequirementList {
    type Error = DuplicateRequirement;

    fn try_from(requirements: Vec<Requirement>) -> Result<Self, Self::Error> {
        let mut list = Self::new();
        for requirement in requirements {
            let name = requirement.name().to_string();
            if !list.push(requirement) {
                return Err(DuplicateRequirement(name));
            }
        }
        Ok(list)
    }
}

impl From<RequirementList> for Vec<Requirement> {
    fn from(list: RequirementList) -> Self {
        list.requirements
    }
}

/// Returned when a requirement list names the same package twice
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Duplicate requirement for package '{0}'")]
pub struct DuplicateRequirement(pub String);

impl<'a> IntoIterator for &'a RequirementList {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.iter()
    }
}

impl IntoIterator for RequirementList {
    type Item = Requirement;
    type IntoIter = std::vec::IntoIter<Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_exact() {
        let req = Requirement::parse("opuslib == 2.0.0").unwrap();
        assert_eq!(req.name(), "opuslib");
        assert_eq!(req.spec(), &VersionSpec::Exact("2.0.0".to_string()));
        assert_eq!(req.pinned_version(), Some("2.0.0"));
    }

    #[test]
    fn parse_at_least_without_spaces() {
        let req = Requirement::parse("pyogg>=0.6.14a1").unwrap();
        assert_eq!(req.spec(), &VersionSpec::AtLeast("0.6.14a1".to_string()));
        assert_eq!(req.to_string(), "pyogg >= 0.6.14a1");
    }

    #[test]
    fn parse_bare_name() {
        let req = Requirement::parse("  absl-py ").unwrap();
        assert_eq!(req, Requirement::any("absl-py"));
        assert_eq!(req.to_string(), "absl-py");
    }

    #[test]
    fn parse_rejects_other_operators() {
        assert!(matches!(
            Requirement::parse("numpy <= 1.20"),
            Err(RequirementParseError::UnsupportedOperator(_))
        ));
        assert!(matches!(
            Requirement::parse("numpy ~= 1.20"),
            Err(RequirementParseError::UnsupportedOperator(_))
        ));
        assert!(matches!(
            Requirement::parse("numpy >= 1.0, < 2"),
            Err(RequirementParseError::InvalidVersion(_))
        ));
    }

    #[test]
    fn parse_rejects_missing_parts() {
        assert_eq!(Requirement::parse("   "), Err(RequirementParseError::Empty));
        assert!(matches!(
            Requirement::parse("== 1.0"),
            Err(RequirementParseError::InvalidName(_))
        ));
        assert!(matches!(
            Requirement::parse("numpy =="),
            Err(RequirementParseError::InvalidVersion(_))
        ));
    }

    #[test]
    fn exact_pin_keeps_any_version_token() {
        for version in ["1.4 beta", "2020.10.1+local build", "1.0, < 2"] {
            let pinned = Requirement::exact("coqui_stt_ctcdecoder", version);
            let parsed = Requirement::parse(&pinned.to_string()).unwrap();
            assert_eq!(parsed, pinned);
            assert_eq!(parsed.pinned_version(), Some(version));
        }
        assert!(matches!(
            Requirement::parse("resampy >= 0.2 beta"),
            Err(RequirementParseError::InvalidVersion(_))
        ));
    }

    #[test]
    fn name_normalization() {
        assert_eq!(normalize_name("Coqui_STT.ctcdecoder"), "coqui-stt-ctcdecoder");
        assert_eq!(normalize_name("absl__-py"), "absl-py");
        assert!(Requirement::any("PyXDG").names("pyxdg"));
    }

    #[test]
    fn list_rejects_duplicate_names() {
        let mut list = RequirementList::new();
        assert!(list.push(Requirement::any("absl-py")));
        assert!(!list.push(Requirement::exact("absl_py", "1.0")));

        assert_eq!(list.len(), 1);
        assert_eq!(list.get("ABSL-PY"), Some(&Requirement::any("absl-py")));
    }

    #[test]
    fn list_serializes_as_requirement_strings() {
        let mut list = RequirementList::new();
        list.push(Requirement::any("numpy"));
        list.push(Requirement::exact("tensorflow", "1.15.4"));

        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"["numpy","tensorflow == 1.15.4"]"#);

        let parsed: RequirementList = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, list);
    }

    #[test]
    fn list_deserialize_rejects_duplicates() {
        let result: Result<RequirementList, _> =
            serde_json::from_str(r#"["numpy", "NumPy == 1.19.0"]"#);
        assert!(result.is_err());
    }
}
