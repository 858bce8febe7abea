//! Bundle names.
//!
//! A [`Name`] is the human-composed label of a bundle: an ordered set of semantic fields
//! (source, dataset, subset, type, part, bspace, btime, variation) plus a version. Field values
//! are sanitized on construction and every derived string (`name`, `vname`, `path`,
//! `source_path`, `cache_key`) is recomputed from the fields on each call.
//!
//! Names are values: "changing" a field means building a new name with [`Name::with`].

use std::collections::BTreeMap;

use object_number::ObjectNumber;

use crate::{
    field::{self, FieldKey, FieldMap, FieldValue, NAME_PART_SEP},
    format::{PartitionFormat, UnknownFormatError},
    partition_name::PartitionName,
    query::NameQuery,
    version::{NameVersion, VersionParseError},
};

/// Separator between path segments in `path`, `source_path` and `cache_key`.
pub const PATH_SEP: char = '/';

/// A validated bundle name.
///
/// ## Derived strings
///
/// ```text
/// name         census.gov-population-2010
/// vname        census.gov-population-2010-1.0.3
/// path         census.gov/population-2010-1.0.3
/// source_path  census.gov/population-2010
/// cache_key    census.gov/population-2010-1.0.3.db
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    parts: BTreeMap<FieldKey, String>,
    version: NameVersion,
}

impl Name {
    /// Create a name with only the required fields and the default version.
    pub fn new(source: &str, dataset: &str) -> Result<Self, NameError> {
        Self::from_fields(&field::fields([
            (FieldKey::Source.as_str(), source),
            (FieldKey::Dataset.as_str(), dataset),
        ]))
    }

    /// Build a name from a flat mapping. Keys that are not bundle fields are ignored.
    pub fn from_fields(map: &FieldMap) -> Result<Self, NameError> {
        let name = Self {
            parts: read_parts(map, &FieldKey::BUNDLE),
            version: read_version(map)?,
        };
        name.is_valid()?;
        Ok(name)
    }

    /// Parts taken from an already validated name.
    pub(crate) fn from_parts(parts: BTreeMap<FieldKey, String>, version: NameVersion) -> Self {
        Self { parts, version }
    }

    /// Check that every required field has a value.
    pub fn is_valid(&self) -> Result<(), NameError> {
        validate(&self.parts)
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.parts.get(&key).map(String::as_str)
    }

    pub fn source(&self) -> &str {
        self.get(FieldKey::Source).unwrap_or_default()
    }

    pub fn dataset(&self) -> &str {
        self.get(FieldKey::Dataset).unwrap_or_default()
    }

    pub fn version(&self) -> &NameVersion {
        &self.version
    }

    /// Return a copy with one field replaced (or removed, for `None`).
    pub fn with(&self, key: FieldKey, value: Option<&str>) -> Result<Self, NameError> {
        if key == FieldKey::Version {
            let version = value.map(NameVersion::parse).transpose()?;
            return Ok(self.with_version(version.unwrap_or_default()));
        }
        if !FieldKey::BUNDLE.contains(&key) {
            return Err(NameError::NotAField(key));
        }

        let mut name = self.clone();
        set_part(&mut name.parts, key, value);
        name.is_valid()?;
        Ok(name)
    }

    /// Return a copy with a different version.
    pub fn with_version(&self, version: impl Into<NameVersion>) -> Self {
        Self {
            parts: self.parts.clone(),
            version: version.into(),
        }
    }

    /// The name string: all fields joined with `-`, excluding the version.
    pub fn name(&self) -> String {
        join_name(&self.parts)
    }

    /// The name string followed by the version.
    pub fn vname(&self) -> String {
        join_vname(&self.name(), &self.version)
    }

    /// The bundle path: the source, then the remaining fields and version joined with `-`.
    pub fn path(&self) -> String {
        bundle_path(&self.parts, &self.version)
    }

    /// Filesystem location of the bundle source: like [`Name::path`] without the version, and
    /// with `bspace` as its own directory.
    pub fn source_path(&self) -> String {
        bundle_source_path(&self.parts)
    }

    pub fn cache_key(&self) -> String {
        format!("{}{}", self.path(), PartitionFormat::BUNDLE_EXTENSION)
    }

    /// The fields as a flat mapping, including the version.
    pub fn to_fields(&self) -> FieldMap {
        to_fields(&self.parts, &self.version)
    }

    /// The fields plus the generated `name` and `vname`.
    pub fn dict(&self) -> FieldMap {
        let mut map = self.to_fields();
        map.insert(FieldKey::Name.as_str().into(), self.name().into());
        map.insert(FieldKey::Vname.as_str().into(), self.vname().into());
        map
    }

    /// A query matching exactly the fields of this name.
    pub fn as_query(&self) -> NameQuery {
        NameQuery::exact(&self.parts, &self.version)
    }

    /// Merge this name with partition fields, selecting the partition format from `format`.
    pub fn as_partition(&self, overrides: &FieldMap) -> Result<PartitionName, NameError> {
        let mut map = self.to_fields();
        map.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        PartitionName::from_fields(&map)
    }

    /// Bundle names bind only to dataset numbers.
    pub fn type_is_compatible(&self, on: &ObjectNumber) -> bool {
        matches!(on, ObjectNumber::Dataset(_))
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// Errors that can occur when building or updating a name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// A required field is missing or empty
    #[error("name requires field '{0}' to have a value")]
    MissingField(FieldKey),

    /// The version is neither a semantic version nor a version range
    #[error("invalid version in name: {0}")]
    InvalidVersion(#[from] VersionParseError),

    /// The `format` field names no registered partition format
    #[error("invalid format in name: {0}")]
    UnknownFormat(#[from] UnknownFormatError),

    /// The field does not exist on this kind of name
    #[error("field '{0}' does not belong to this kind of name")]
    NotAField(FieldKey),
}

pub(crate) fn read_parts(map: &FieldMap, keys: &[FieldKey]) -> BTreeMap<FieldKey, String> {
    keys.iter()
        .filter_map(|&key| field::text(map, key).map(|v| (key, field::clean(&v))))
        .filter(|(_, v)| !v.is_empty() && !field::is_marker(v))
        .collect()
}

pub(crate) fn read_version(map: &FieldMap) -> Result<NameVersion, NameError> {
    match field::text(map, FieldKey::Version) {
        Some(v) => Ok(NameVersion::parse(v.trim())?),
        None => Ok(NameVersion::default()),
    }
}

pub(crate) fn set_part(parts: &mut BTreeMap<FieldKey, String>, key: FieldKey, value: Option<&str>) {
    match value
        .map(field::clean)
        .filter(|v| !v.is_empty() && !field::is_marker(v))
    {
        Some(v) => {
            parts.insert(key, v);
        }
        None => {
            parts.remove(&key);
        }
    }
}

pub(crate) fn validate(parts: &BTreeMap<FieldKey, String>) -> Result<(), NameError> {
    match FieldKey::REQUIRED.into_iter().find(|key| !parts.contains_key(key)) {
        Some(key) => Err(NameError::MissingField(key)),
        None => Ok(()),
    }
}

/// Join the present parts with `-`, leaving out the implicit `db` format.
pub(crate) fn join_name(parts: &BTreeMap<FieldKey, String>) -> String {
    let db = PartitionFormat::Db.as_str();
    parts
        .iter()
        .filter(|(key, value)| !(**key == FieldKey::Format && value.as_str() == db))
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join(&NAME_PART_SEP.to_string())
}

/// Exact versions are appended after a separator; ranges are appended directly.
pub(crate) fn join_vname(name: &str, version: &NameVersion) -> String {
    match version {
        NameVersion::Exact(v) => format!("{name}{NAME_PART_SEP}{v}"),
        NameVersion::Spec(spec) => format!("{name}{spec}"),
    }
}

pub(crate) fn bundle_path(parts: &BTreeMap<FieldKey, String>, version: &NameVersion) -> String {
    let version = version.to_string();
    let rest = FieldKey::BUNDLE
        .iter()
        .filter(|key| **key != FieldKey::Source)
        .filter_map(|key| parts.get(key).map(String::as_str))
        .chain([version.as_str()])
        .collect::<Vec<_>>()
        .join(&NAME_PART_SEP.to_string());

    join_path([parts.get(&FieldKey::Source).map(String::as_str).unwrap_or_default(), rest.as_str()])
}

pub(crate) fn bundle_source_path(parts: &BTreeMap<FieldKey, String>) -> String {
    let rest = FieldKey::BUNDLE
        .iter()
        .filter(|key| !matches!(key, FieldKey::Source | FieldKey::Bspace))
        .filter_map(|key| parts.get(key).map(String::as_str))
        .collect::<Vec<_>>()
        .join(&NAME_PART_SEP.to_string());

    let source = parts.get(&FieldKey::Source).map(String::as_str);
    let bspace = parts.get(&FieldKey::Bspace).map(String::as_str);
    join_path(source.into_iter().chain(bspace).chain([rest.as_str()]))
}

pub(crate) fn join_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(&PATH_SEP.to_string())
}

pub(crate) fn to_fields(parts: &BTreeMap<FieldKey, String>, version: &NameVersion) -> FieldMap {
    parts
        .iter()
        .map(|(key, value)| (key.as_str().to_string(), FieldValue::from(value.as_str())))
        .chain([(
            FieldKey::Version.as_str().to_string(),
            FieldValue::from(version.to_string()),
        )])
        .collect()
}
