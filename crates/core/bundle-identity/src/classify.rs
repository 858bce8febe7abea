//! Recognize the shape of an identifier and pull it apart.
//!
//! Inputs are tried in a fixed order: typed values first, then strings containing a path
//! separator (cache keys), then strings containing the object number separator (fqnames), then
//! strings containing the name separator (names), and finally bare object numbers.

use object_number::{ObjectNumber, ParseError};

use crate::{
    field::NAME_PART_SEP,
    identity::OBJECT_NUMBER_SEP,
    name::{Name, PATH_SEP},
    partition_name::PartitionName,
    version::{NameVersion, Version, VersionSpec},
};

/// Something to classify.
#[derive(Debug, Clone)]
pub enum ClassifyInput {
    Number(ObjectNumber),
    Name(Name),
    PartitionName(PartitionName),
    Text(String),
}

impl From<ObjectNumber> for ClassifyInput {
    fn from(on: ObjectNumber) -> Self {
        ClassifyInput::Number(on)
    }
}

impl From<Name> for ClassifyInput {
    fn from(name: Name) -> Self {
        ClassifyInput::Name(name)
    }
}

impl From<PartitionName> for ClassifyInput {
    fn from(name: PartitionName) -> Self {
        ClassifyInput::PartitionName(name)
    }
}

impl From<&str> for ClassifyInput {
    fn from(s: &str) -> Self {
        ClassifyInput::Text(s.to_string())
    }
}

impl From<String> for ClassifyInput {
    fn from(s: String) -> Self {
        ClassifyInput::Text(s)
    }
}

/// What the classified input turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Number,
    Name,
    PartitionName,
    Fqname,
    CacheKey,
}

/// The pieces extracted by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityParts {
    pub kind: IdentifierKind,
    pub on: Option<ObjectNumber>,
    /// The name without its version
    pub sname: Option<String>,
    /// The versioned name, when the input carried an exact version
    pub vname: Option<String>,
    pub name_parts: Vec<String>,
    pub version: Option<NameVersion>,
    pub cache_key: Option<String>,
}

impl IdentityParts {
    fn new(kind: IdentifierKind) -> Self {
        Self {
            kind,
            on: None,
            sname: None,
            vname: None,
            name_parts: Vec::new(),
            version: None,
            cache_key: None,
        }
    }

    /// The exact version, if the input carried one.
    pub fn exact_version(&self) -> Option<&Version> {
        self.version.as_ref().and_then(NameVersion::as_exact)
    }

    /// The version range, if the input carried one.
    pub fn version_spec(&self) -> Option<&VersionSpec> {
        match &self.version {
            Some(NameVersion::Spec(spec)) => Some(spec),
            _ => None,
        }
    }
}

/// Errors that can occur when classifying an identifier
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// Nothing to classify
    #[error("cannot classify an empty identifier")]
    Empty,

    /// The input fits none of the known shapes unambiguously
    #[error("cannot classify ambiguous identifier '{0}'")]
    Ambiguous(String),

    /// The object number part does not parse
    #[error("cannot classify '{input}': invalid object number")]
    InvalidNumber {
        input: String,
        #[source]
        source: ParseError,
    },

    /// The trailing version range does not parse
    #[error("cannot classify '{0}': invalid version range")]
    InvalidVersion(String),
}

pub fn classify(input: ClassifyInput) -> Result<IdentityParts, ClassifyError> {
    let text = match input {
        ClassifyInput::Number(on) => {
            let mut parts = IdentityParts::new(IdentifierKind::Number);
            parts.on = Some(on);
            return Ok(parts);
        }
        ClassifyInput::Name(name) => {
            return Ok(from_name(IdentifierKind::Name, &name.vname(), name.version().clone()));
        }
        ClassifyInput::PartitionName(name) => {
            return Ok(from_name(
                IdentifierKind::PartitionName,
                &name.vname(),
                name.version().clone(),
            ));
        }
        ClassifyInput::Text(text) => text,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ClassifyError::Empty);
    }

    if text.contains(PATH_SEP) {
        let mut parts = IdentityParts::new(IdentifierKind::CacheKey);
        parts.cache_key = Some(text.to_string());
        return Ok(parts);
    }

    if text.contains(OBJECT_NUMBER_SEP) {
        let mut split = text.split(OBJECT_NUMBER_SEP);
        let (Some(vname), Some(vid), None) = (split.next(), split.next(), split.next()) else {
            return Err(ClassifyError::Ambiguous(text.to_string()));
        };
        if vname.is_empty() {
            return Err(ClassifyError::Ambiguous(text.to_string()));
        }
        let mut parts = parse_name(IdentifierKind::Fqname, vname)?;
        parts.on = Some(parse_number(text, vid)?);
        return Ok(parts);
    }

    if text.contains(NAME_PART_SEP) {
        return parse_name(IdentifierKind::Name, text);
    }

    let mut parts = IdentityParts::new(IdentifierKind::Number);
    parts.on = Some(parse_number(text, text)?);
    Ok(parts)
}

fn parse_number(input: &str, s: &str) -> Result<ObjectNumber, ClassifyError> {
    ObjectNumber::parse(s).map_err(|source| ClassifyError::InvalidNumber {
        input: input.to_string(),
        source,
    })
}

/// Split a name string into its unversioned name and version.
///
/// A version range starts at the first comparison operator. Otherwise the last dash-separated
/// part is the version if it parses as one.
fn parse_name(kind: IdentifierKind, s: &str) -> Result<IdentityParts, ClassifyError> {
    if let Some(idx) = s.find(['<', '>', '=']) {
        let (name, spec) = s.split_at(idx);
        let spec = spec
            .parse::<VersionSpec>()
            .map_err(|_| ClassifyError::InvalidVersion(s.to_string()))?;
        return Ok(split_parts(kind, name, Some(s), Some(spec.into())));
    }

    if let Some((name, last)) = s.rsplit_once(NAME_PART_SEP)
        && let Ok(version) = last.parse::<Version>()
    {
        return Ok(split_parts(kind, name, Some(s), Some(version.into())));
    }
    Ok(split_parts(kind, s, None, None))
}

fn from_name(kind: IdentifierKind, vname: &str, version: NameVersion) -> IdentityParts {
    let name = match &version {
        NameVersion::Exact(v) => vname.strip_suffix(&format!("{NAME_PART_SEP}{v}")),
        NameVersion::Spec(spec) => vname.strip_suffix(&spec.to_string()),
    }
    .unwrap_or(vname);
    split_parts(kind, name, Some(vname), Some(version))
}

/// Ranges match many versions, so a name carrying one has no `vname`.
fn split_parts(
    kind: IdentifierKind,
    sname: &str,
    vname: Option<&str>,
    version: Option<NameVersion>,
) -> IdentityParts {
    let vname = match &version {
        Some(NameVersion::Spec(_)) => None,
        _ => vname.map(ToString::to_string),
    };
    IdentityParts {
        sname: Some(sname.to_string()),
        vname,
        name_parts: sname.split(NAME_PART_SEP).map(ToString::to_string).collect(),
        version,
        ..IdentityParts::new(kind)
    }
}
