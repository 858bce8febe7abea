//! Version and version range types for bundle and partition names.
//!
//! A name's version is either an exact semantic version or, in queries, a version range. The
//! patch component of an exact version mirrors the revision of the bound object number.

/// Semver version wrapper with helpers for replacing single components.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Version(semver::Version);

impl Default for Version {
    fn default() -> Self {
        Self(semver::Version::new(0, 0, 0))
    }
}

impl Version {
    /// Create a new [`Version`] from major, minor, and patch components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    pub fn with_major(&self, major: u64) -> Self {
        let mut v = self.0.clone();
        v.major = major;
        Self(v)
    }

    pub fn with_minor(&self, minor: u64) -> Self {
        let mut v = self.0.clone();
        v.minor = minor;
        Self(v)
    }

    pub fn with_patch(&self, patch: u64) -> Self {
        let mut v = self.0.clone();
        v.patch = patch;
        Self(v)
    }

    /// Replace the build metadata, e.g. `1.0.0+nightly`.
    pub fn with_build(&self, build: &str) -> Result<Self, semver::Error> {
        let mut v = self.0.clone();
        v.build = semver::BuildMetadata::new(build)?;
        Ok(Self(v))
    }
}

impl std::ops::Deref for Version {
    type Target = semver::Version;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<semver::Version> for Version {
    fn as_ref(&self) -> &semver::Version {
        &self.0
    }
}

impl From<semver::Version> for Version {
    fn from(value: semver::Version) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Version {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for Version {
    type Err = semver::Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// A version range such as `>=1.0.0, <2.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VersionSpec(semver::VersionReq);

impl VersionSpec {
    /// Whether `version` lies in this range.
    pub fn matches(&self, version: &Version) -> bool {
        self.0.matches(version)
    }
}

impl std::ops::Deref for VersionSpec {
    type Target = semver::VersionReq;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for VersionSpec {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// The version slot of a name: an exact version, or a range used for searching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameVersion {
    Exact(Version),
    Spec(VersionSpec),
}

impl NameVersion {
    /// Parse `s` as an exact version first, falling back to a version range.
    pub fn parse(s: &str) -> Result<Self, VersionParseError> {
        if let Ok(version) = s.parse::<Version>() {
            return Ok(NameVersion::Exact(version));
        }
        s.parse::<VersionSpec>()
            .map(NameVersion::Spec)
            .map_err(|_| VersionParseError {
                input: s.to_string(),
            })
    }

    pub fn as_exact(&self) -> Option<&Version> {
        match self {
            NameVersion::Exact(version) => Some(version),
            NameVersion::Spec(_) => None,
        }
    }

    pub fn is_spec(&self) -> bool {
        matches!(self, NameVersion::Spec(_))
    }
}

impl Default for NameVersion {
    fn default() -> Self {
        NameVersion::Exact(Version::default())
    }
}

impl From<Version> for NameVersion {
    fn from(version: Version) -> Self {
        NameVersion::Exact(version)
    }
}

impl From<VersionSpec> for NameVersion {
    fn from(spec: VersionSpec) -> Self {
        NameVersion::Spec(spec)
    }
}

impl std::fmt::Display for NameVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameVersion::Exact(version) => version.fmt(f),
            NameVersion::Spec(spec) => spec.fmt(f),
        }
    }
}

impl std::str::FromStr for NameVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error type for [`NameVersion`] parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse '{input}' as a semantic version or version range")]
pub struct VersionParseError {
    /// The input string that could not be parsed
    pub input: String,
}
