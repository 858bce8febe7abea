//! Names and identities of bundles and partitions.
//!
//! A [`Name`] or [`PartitionName`] is the human-composed label of an object. Binding one to an
//! object number produces a [`BundleIdentity`] or [`PartitionIdentity`], which derive the `vid`,
//! `fqname`, path and cache key used by storage. Queries ([`NameQuery`],
//! [`PartitionNameQuery`]) are the partially-specified forms used for searching.

pub mod classify;
pub mod field;
pub mod format;
pub mod identity;
pub mod name;
pub mod partition_name;
pub mod query;
pub mod version;

pub use self::{
    classify::{ClassifyError, ClassifyInput, IdentifierKind, IdentityParts},
    field::{FieldKey, FieldMap, FieldValue, QueryField},
    format::{PartitionFormat, UnknownFormatError},
    identity::{
        BundleIdentity, Identity, IdentityError, MultiplePartitionsError, OBJECT_NUMBER_SEP,
        PartitionIdentity,
    },
    name::{Name, NameError},
    partition_name::{PartialPartitionName, PartitionName},
    query::{NameQuery, PartitionNameQuery, ResolvedQuery, UnsupportedOperationError},
    version::{NameVersion, Version, VersionParseError, VersionSpec},
};
