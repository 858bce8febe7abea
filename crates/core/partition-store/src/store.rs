//! Collaborators the partition resolver runs against.
//!
//! Persistence is pluggable: anything that can filter, insert and delete partition records
//! implements [`PartitionRecordStore`], and anything that can look up a bundle's tables
//! implements [`TableResolver`]. The crate ships in-memory implementations of both.

mod memory;

pub use memory::{InMemoryPartitionStore, InMemoryTables};

use crate::{
    BoxError,
    predicate::{Column, Predicate},
    record::PartitionRecord,
};

/// Trait for pluggable partition record persistence.
///
/// # Uniqueness
///
/// Implementors must reject an insert whose `vid` or `fqname` is already stored with
/// [`InsertError::UniqueViolation`]. Two callers racing to create the same partition rely on
/// this to turn the loser into a conflict instead of a duplicate.
///
/// # Ordering
///
/// [`filter`](Self::filter) returns records ordered by `vid`, then `segment`.
#[async_trait::async_trait]
pub trait PartitionRecordStore: Send + Sync {
    /// Records matching `predicate`.
    async fn filter(&self, predicate: &Predicate) -> Result<Vec<PartitionRecord>, BoxError>;

    /// Store a new record atomically, returning it as stored.
    async fn insert(&self, record: PartitionRecord) -> Result<PartitionRecord, InsertError>;

    /// Delete records matching `predicate`, returning how many were removed.
    async fn delete(&self, predicate: &Predicate) -> Result<usize, BoxError>;
}

/// A table of a bundle's schema.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TableRef {
    pub id: String,
    pub name: String,
}

/// Trait for looking up a bundle's tables by name or id.
#[async_trait::async_trait]
pub trait TableResolver: Send + Sync {
    /// `None` if the bundle has no such table.
    async fn resolve_table(&self, name_or_id: &str) -> Result<Option<TableRef>, BoxError>;
}

/// Errors that can occur when inserting a partition record
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    /// A record with the same unique column value already exists
    #[error("a partition with {column} '{value}' already exists")]
    UniqueViolation { column: Column, value: String },

    /// The store failed
    #[error("partition store error")]
    Store(#[source] BoxError),
}
