//! Partition resolution against a pluggable record store.
//!
//! [`Partitions`] turns partially-specified partition names into predicates, runs them against a
//! [`PartitionRecordStore`], and classifies the result: nothing, exactly one partition, or an
//! ambiguous match. [`Partitions::find_or_new`] creates the partition when nothing matches and
//! reports a uniqueness violation in the store as a conflict.

pub mod error;
pub mod partitions;
pub mod predicate;
pub mod record;
pub mod store;

pub use self::{
    error::{CreateError, DeleteError, FindError},
    partitions::{Outcome, PartitionRequest, Partitions},
    predicate::{Clause, Column, Predicate},
    record::{PartitionRecord, PartitionState},
    store::{
        InMemoryPartitionStore, InMemoryTables, InsertError, PartitionRecordStore, TableRef,
        TableResolver,
    },
};

/// Type alias for boxed errors returned by store collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[cfg(test)]
mod tests;
