//! Error types for partition resolution

use bundle_identity::{IdentityError, NameError};
use object_number::OverflowError;

use crate::BoxError;

/// Errors that can occur when looking up partitions
#[derive(Debug, thiserror::Error)]
pub enum FindError {
    /// The query fields do not form a valid query
    #[error("invalid partition query")]
    InvalidQuery(#[source] NameError),

    /// The query names a table the bundle does not have
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// The table resolver failed
    #[error("error resolving table '{table}'")]
    TableResolution {
        table: String,
        #[source]
        source: BoxError,
    },

    /// The record store failed
    #[error("error querying partition store")]
    Store(#[source] BoxError),

    /// The query matched more than one partition
    #[error("expected at most one partition, found {count}: {vnames:?}")]
    ResultCount { count: usize, vnames: Vec<String> },

    /// A stored record does not rebuild into an identity
    #[error("stored partition '{vid}' is invalid")]
    InvalidRecord {
        vid: String,
        #[source]
        source: IdentityError,
    },
}

/// Errors that can occur when creating a partition
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    /// The partition fields do not complete into a valid name
    #[error("invalid partition name")]
    InvalidName(#[source] NameError),

    /// Looking for an existing partition failed
    #[error("error looking up existing partition")]
    Find(#[source] FindError),

    /// The partition has more numbers than its field can hold
    #[error("no partition number left in bundle")]
    Overflow(#[source] OverflowError),

    /// The partition name cannot be bound to its number
    #[error("error building partition identity")]
    Identity(#[source] IdentityError),

    /// Another writer created the same partition first
    #[error("partition conflicts with an existing one: {column} '{value}'")]
    Conflict { column: String, value: String },

    /// A partition matching the fields already exists
    #[error("partition '{0}' already exists")]
    AlreadyExists(String),

    /// The record store failed
    #[error("error inserting partition")]
    Store(#[source] BoxError),
}

impl CreateError {
    /// Whether a retry may succeed, after which the conflicting partition is visible.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CreateError::Conflict { .. })
    }
}

impl From<FindError> for CreateError {
    fn from(err: FindError) -> Self {
        CreateError::Find(err)
    }
}

/// Error that can occur when deleting partitions
#[derive(Debug, thiserror::Error)]
#[error("error deleting partitions")]
pub struct DeleteError(#[source] pub BoxError);
