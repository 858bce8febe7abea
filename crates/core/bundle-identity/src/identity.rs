//! Identities: names bound to object numbers.
//!
//! Binding a name to a number forces the patch component of the name's version to the number's
//! revision, so `vname` and `vid` always describe the same release.

use std::collections::BTreeMap;

use object_number::{
    DatasetNumber, ObjectNumber, OverflowError, ParseError, PartitionNumber, TypeTag,
};

use crate::{
    classify::{self, ClassifyError, ClassifyInput, IdentityParts},
    field::{self, FieldKey, FieldMap, FieldValue},
    format::PartitionFormat,
    name::{Name, NameError},
    partition_name::PartitionName,
    version::{NameVersion, VersionSpec},
};

/// Separator between the `vname` and the `vid` in a fully-qualified name.
pub const OBJECT_NUMBER_SEP: char = '~';

const ID: &str = "id";
const VID: &str = "vid";
const REVISION: &str = "revision";
const CACHE_KEY: &str = "cache_key";
const MD5: &str = "md5";

/// The identity of a bundle: a [`Name`] bound to a [`DatasetNumber`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleIdentity {
    name: Name,
    on: DatasetNumber,
    md5: Option<String>,
    partitions: BTreeMap<String, PartitionIdentity>,
}

impl BundleIdentity {
    /// Bind `name` to `on`. Fails if `on` is not a dataset number.
    pub fn new(name: Name, on: impl Into<ObjectNumber>) -> Result<Self, IdentityError> {
        let on = match on.into() {
            ObjectNumber::Dataset(dataset) if name.type_is_compatible(&dataset.into()) => dataset,
            other => {
                return Err(IdentityError::TypeMismatch {
                    kind: "bundle",
                    found: other.type_tag(),
                });
            }
        };

        let version = bind_version(name.version(), on.revision())?;
        Ok(Self {
            name: name.with_version(version),
            on,
            md5: None,
            partitions: BTreeMap::new(),
        })
    }

    pub fn with_md5(self, md5: impl Into<String>) -> Self {
        Self {
            md5: Some(md5.into()),
            ..self
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn on(&self) -> DatasetNumber {
        self.on
    }

    pub fn md5(&self) -> Option<&str> {
        self.md5.as_deref()
    }

    pub fn revision(&self) -> Option<u64> {
        self.on.revision()
    }

    /// The object number without its revision.
    pub fn id(&self) -> String {
        ObjectNumber::from(self.on).without_revision().to_string()
    }

    /// The object number with its revision.
    pub fn vid(&self) -> String {
        self.on.to_string()
    }

    pub fn vname(&self) -> String {
        self.name.vname()
    }

    pub fn fqname(&self) -> String {
        format!("{}{OBJECT_NUMBER_SEP}{}", self.vname(), self.vid())
    }

    pub fn path(&self) -> String {
        self.name.path()
    }

    pub fn source_path(&self) -> String {
        self.name.source_path()
    }

    pub fn cache_key(&self) -> String {
        self.name.cache_key()
    }

    /// A copy bound to a different revision. The version patch follows.
    pub fn rev(&self, revision: Option<u64>) -> Result<Self, IdentityError> {
        let on = self.on.with_revision(revision)?;
        Ok(Self {
            name: self.name.with_version(bind_version(self.name.version(), revision)?),
            on,
            ..self.clone()
        })
    }

    /// Name fields plus `id`, `vid`, `revision`, `cache_key` and `md5` (when set).
    pub fn dict(&self) -> FieldMap {
        let mut map = self.name.dict();
        insert_number_fields(
            &mut map,
            self.id(),
            self.vid(),
            self.revision(),
            self.cache_key(),
            self.md5(),
        );
        map
    }

    pub fn names_dict(&self) -> FieldMap {
        names_dict(self.name.name(), self.vname(), self.vid(), self.fqname())
    }

    /// [`BundleIdentity::dict`] without the generated names.
    pub fn ident_dict(&self) -> FieldMap {
        ident_dict(self.dict())
    }

    /// The identity of partition number `partition` of this bundle. `overrides` supplies the
    /// partition fields; its `format` field selects the partition format.
    pub fn as_partition(
        &self,
        partition: u64,
        overrides: &FieldMap,
    ) -> Result<PartitionIdentity, IdentityError> {
        let on = self.on.as_partition(partition)?;
        let name = self.name.as_partition(overrides)?;
        PartitionIdentity::new(name, on)
    }

    /// Attach a partition found for this bundle. Partitions are keyed by `vid`.
    pub fn add_partition(&mut self, partition: PartitionIdentity) {
        self.partitions.insert(partition.vid(), partition);
    }

    pub fn partitions(&self) -> impl Iterator<Item = &PartitionIdentity> {
        self.partitions.values()
    }

    /// The single attached partition, if any.
    pub fn partition(&self) -> Result<Option<&PartitionIdentity>, MultiplePartitionsError> {
        match self.partitions.len() {
            0 | 1 => Ok(self.partitions.values().next()),
            count => Err(MultiplePartitionsError { count }),
        }
    }
}

impl std::fmt::Display for BundleIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fqname())
    }
}

/// The identity of a partition: a [`PartitionName`] bound to a [`PartitionNumber`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionIdentity {
    name: PartitionName,
    on: PartitionNumber,
    md5: Option<String>,
}

impl PartitionIdentity {
    /// Bind `name` to `on`. Fails if `on` is not a partition number.
    pub fn new(name: PartitionName, on: impl Into<ObjectNumber>) -> Result<Self, IdentityError> {
        let on = match on.into() {
            ObjectNumber::Partition(partition) if name.type_is_compatible(&partition.into()) => {
                partition
            }
            other => {
                return Err(IdentityError::TypeMismatch {
                    kind: "partition",
                    found: other.type_tag(),
                });
            }
        };

        let version = bind_version(name.version(), on.revision())?;
        Ok(Self {
            name: name.with_version(version),
            on,
            md5: None,
        })
    }

    pub fn with_md5(self, md5: impl Into<String>) -> Self {
        Self {
            md5: Some(md5.into()),
            ..self
        }
    }

    pub fn name(&self) -> &PartitionName {
        &self.name
    }

    pub fn on(&self) -> PartitionNumber {
        self.on
    }

    pub fn md5(&self) -> Option<&str> {
        self.md5.as_deref()
    }

    pub fn revision(&self) -> Option<u64> {
        self.on.revision()
    }

    pub fn table(&self) -> Option<&str> {
        self.name.table()
    }

    pub fn format(&self) -> PartitionFormat {
        self.name.format()
    }

    pub fn id(&self) -> String {
        ObjectNumber::from(self.on).without_revision().to_string()
    }

    pub fn vid(&self) -> String {
        self.on.to_string()
    }

    pub fn vname(&self) -> String {
        self.name.vname()
    }

    pub fn fqname(&self) -> String {
        format!("{}{OBJECT_NUMBER_SEP}{}", self.vname(), self.vid())
    }

    pub fn path(&self) -> String {
        self.name.path()
    }

    pub fn sub_path(&self) -> String {
        self.name.sub_path()
    }

    pub fn source_path(&self) -> String {
        self.name.source_path()
    }

    pub fn cache_key(&self) -> String {
        self.name.cache_key()
    }

    pub fn rev(&self, revision: Option<u64>) -> Result<Self, IdentityError> {
        let dataset = self.on.dataset().with_revision(None)?;
        let on = PartitionNumber::new(dataset, self.on.partition(), revision)?;
        Ok(Self {
            name: self.name.with_version(bind_version(self.name.version(), revision)?),
            on,
            md5: self.md5.clone(),
        })
    }

    /// The identity of the bundle this partition belongs to, at the same revision.
    pub fn as_dataset(&self) -> Result<BundleIdentity, IdentityError> {
        BundleIdentity::new(self.name.bundle_name(), self.on.dataset())
    }

    pub fn dict(&self) -> FieldMap {
        let mut map = self.name.dict();
        insert_number_fields(
            &mut map,
            self.id(),
            self.vid(),
            self.revision(),
            self.cache_key(),
            self.md5(),
        );
        map
    }

    pub fn names_dict(&self) -> FieldMap {
        names_dict(self.name.name(), self.vname(), self.vid(), self.fqname())
    }

    pub fn ident_dict(&self) -> FieldMap {
        ident_dict(self.dict())
    }
}

impl std::fmt::Display for PartitionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fqname())
    }
}

/// Either kind of identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Bundle(BundleIdentity),
    Partition(PartitionIdentity),
}

impl Identity {
    /// Rebuild an identity from a flat mapping.
    ///
    /// The object number comes from `id` plus `revision` when both are present, otherwise from
    /// `vid`. A dataset number yields a bundle identity and a partition number a partition
    /// identity whose format is chosen by the `format` field.
    pub fn from_dict(map: &FieldMap) -> Result<Self, IdentityError> {
        let on = number_from_dict(map)?;
        let md5 = map
            .get(MD5)
            .and_then(FieldValue::as_text)
            .filter(|v| !v.is_empty());

        let identity = match on {
            ObjectNumber::Dataset(_) => {
                Identity::Bundle(BundleIdentity::new(Name::from_fields(map)?, on)?)
            }
            ObjectNumber::Partition(_) => {
                Identity::Partition(PartitionIdentity::new(PartitionName::from_fields(map)?, on)?)
            }
            other => {
                return Err(IdentityError::TypeMismatch {
                    kind: "bundle or partition",
                    found: other.type_tag(),
                });
            }
        };

        Ok(match md5 {
            Some(md5) => identity.with_md5(md5),
            None => identity,
        })
    }

    /// Work out what kind of identifier `input` is and extract its parts.
    pub fn classify(input: impl Into<ClassifyInput>) -> Result<IdentityParts, ClassifyError> {
        classify::classify(input.into())
    }

    pub fn on(&self) -> ObjectNumber {
        match self {
            Identity::Bundle(ident) => ident.on.into(),
            Identity::Partition(ident) => ident.on.into(),
        }
    }

    pub fn id(&self) -> String {
        self.on().without_revision().to_string()
    }

    pub fn vid(&self) -> String {
        self.on().to_string()
    }

    pub fn vname(&self) -> String {
        match self {
            Identity::Bundle(ident) => ident.vname(),
            Identity::Partition(ident) => ident.vname(),
        }
    }

    pub fn fqname(&self) -> String {
        format!("{}{OBJECT_NUMBER_SEP}{}", self.vname(), self.vid())
    }

    pub fn path(&self) -> String {
        match self {
            Identity::Bundle(ident) => ident.path(),
            Identity::Partition(ident) => ident.path(),
        }
    }

    pub fn cache_key(&self) -> String {
        match self {
            Identity::Bundle(ident) => ident.cache_key(),
            Identity::Partition(ident) => ident.cache_key(),
        }
    }

    pub fn dict(&self) -> FieldMap {
        match self {
            Identity::Bundle(ident) => ident.dict(),
            Identity::Partition(ident) => ident.dict(),
        }
    }

    pub fn rev(&self, revision: Option<u64>) -> Result<Self, IdentityError> {
        match self {
            Identity::Bundle(ident) => ident.rev(revision).map(Identity::Bundle),
            Identity::Partition(ident) => ident.rev(revision).map(Identity::Partition),
        }
    }

    pub fn with_md5(self, md5: impl Into<String>) -> Self {
        match self {
            Identity::Bundle(ident) => Identity::Bundle(ident.with_md5(md5)),
            Identity::Partition(ident) => Identity::Partition(ident.with_md5(md5)),
        }
    }
}

impl From<BundleIdentity> for Identity {
    fn from(ident: BundleIdentity) -> Self {
        Identity::Bundle(ident)
    }
}

impl From<PartitionIdentity> for Identity {
    fn from(ident: PartitionIdentity) -> Self {
        Identity::Partition(ident)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fqname())
    }
}

/// More than one partition is attached where one was expected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identity has {count} partitions attached; select one explicitly")]
pub struct MultiplePartitionsError {
    pub count: usize,
}

/// Errors that can occur when building an identity
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The name kind cannot be bound to the object number variant
    #[error("a {kind} name cannot be bound to a {found} number")]
    TypeMismatch { kind: &'static str, found: TypeTag },

    /// The name carries a version range, which has no single patch to bind
    #[error("cannot bind version range '{0}' to an object number")]
    UnboundVersion(VersionSpec),

    /// The mapping carries neither `id` and `revision` nor `vid`
    #[error("identity requires either 'id' and 'revision' or 'vid'")]
    MissingNumber,

    /// The `revision` field is not a non-negative integer
    #[error("invalid revision '{0}'")]
    InvalidRevision(String),

    /// The object number in the mapping does not parse
    #[error("invalid object number in identity")]
    InvalidNumber(#[source] ParseError),

    /// A number field exceeds its width
    #[error(transparent)]
    Overflow(#[from] OverflowError),

    /// The name fields are invalid
    #[error("invalid name in identity")]
    Name(#[source] NameError),
}

impl From<NameError> for IdentityError {
    fn from(err: NameError) -> Self {
        IdentityError::Name(err)
    }
}

fn bind_version(version: &NameVersion, revision: Option<u64>) -> Result<NameVersion, IdentityError> {
    match version {
        NameVersion::Exact(v) => Ok(NameVersion::Exact(v.with_patch(revision.unwrap_or(0)))),
        NameVersion::Spec(spec) => Err(IdentityError::UnboundVersion(spec.clone())),
    }
}

fn number_from_dict(map: &FieldMap) -> Result<ObjectNumber, IdentityError> {
    let text = |key: &str| {
        map.get(key)
            .and_then(FieldValue::as_text)
            .filter(|v| !v.is_empty())
    };

    match (text(ID), map.get(REVISION).filter(|v| **v != FieldValue::Null), text(VID)) {
        (Some(id), Some(revision), _) => {
            let revision = revision
                .as_int()
                .and_then(|r| u64::try_from(r).ok())
                .ok_or_else(|| {
                    IdentityError::InvalidRevision(revision.as_text().unwrap_or_default())
                })?;
            let on = ObjectNumber::parse(&id).map_err(IdentityError::InvalidNumber)?;
            Ok(on.rev(Some(revision))?)
        }
        (_, _, Some(vid)) => ObjectNumber::parse(&vid).map_err(IdentityError::InvalidNumber),
        _ => Err(IdentityError::MissingNumber),
    }
}

fn insert_number_fields(
    map: &mut FieldMap,
    id: String,
    vid: String,
    revision: Option<u64>,
    cache_key: String,
    md5: Option<&str>,
) {
    map.insert(ID.into(), id.into());
    map.insert(VID.into(), vid.into());
    map.insert(REVISION.into(), revision.into());
    map.insert(CACHE_KEY.into(), cache_key.into());
    if let Some(md5) = md5 {
        map.insert(MD5.into(), md5.into());
    }
}

fn names_dict(name: String, vname: String, vid: String, fqname: String) -> FieldMap {
    field::fields([
        (FieldKey::Name.as_str(), name),
        (FieldKey::Vname.as_str(), vname),
        (VID, vid),
        (FieldKey::Fqname.as_str(), fqname),
    ])
}

fn ident_dict(mut map: FieldMap) -> FieldMap {
    for key in FieldKey::GENERATED {
        map.remove(key.as_str());
    }
    map
}
