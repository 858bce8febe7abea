//! In-memory partition store and table resolver (not persistent)

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;

use super::{InsertError, PartitionRecordStore, TableRef, TableResolver};
use crate::{
    BoxError,
    predicate::{Column, Predicate},
    record::PartitionRecord,
};

/// In-memory implementation of [`PartitionRecordStore`].
///
/// Clones share the same rows, so several resolvers can race against one store. Records are
/// lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPartitionStore {
    inner: Arc<RwLock<Rows>>,
}

#[derive(Debug, Default)]
struct Rows {
    records: Vec<PartitionRecord>,
    inserts: usize,
}

impl InMemoryPartitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful inserts so far.
    pub fn insert_count(&self) -> usize {
        self.inner.read().inserts
    }

    /// All stored records, in insertion order.
    pub fn records(&self) -> Vec<PartitionRecord> {
        self.inner.read().records.clone()
    }
}

#[async_trait::async_trait]
impl PartitionRecordStore for InMemoryPartitionStore {
    async fn filter(&self, predicate: &Predicate) -> Result<Vec<PartitionRecord>, BoxError> {
        let mut records: Vec<_> = self
            .inner
            .read()
            .records
            .iter()
            .filter(|record| predicate.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| (&a.vid, &a.segment).cmp(&(&b.vid, &b.segment)));
        Ok(records)
    }

    async fn insert(&self, record: PartitionRecord) -> Result<PartitionRecord, InsertError> {
        let mut rows = self.inner.write();

        // Check and insert under one lock
        for existing in &rows.records {
            if existing.vid == record.vid {
                return Err(InsertError::UniqueViolation {
                    column: Column::Vid,
                    value: record.vid,
                });
            }
            if existing.fqname == record.fqname {
                return Err(InsertError::UniqueViolation {
                    column: Column::Fqname,
                    value: record.fqname,
                });
            }
        }

        rows.records.push(record.clone());
        rows.inserts += 1;
        Ok(record)
    }

    async fn delete(&self, predicate: &Predicate) -> Result<usize, BoxError> {
        let mut rows = self.inner.write();
        let before = rows.records.len();
        rows.records.retain(|record| !predicate.matches(record));
        Ok(before - rows.records.len())
    }
}

/// In-memory implementation of [`TableResolver`] over a fixed set of tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTables {
    tables: BTreeMap<String, TableRef>,
}

impl InMemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        let table = TableRef {
            id: id.into(),
            name: name.into(),
        };
        self.tables.insert(table.name.clone(), table);
        self
    }
}

#[async_trait::async_trait]
impl TableResolver for InMemoryTables {
    async fn resolve_table(&self, name_or_id: &str) -> Result<Option<TableRef>, BoxError> {
        let table = self
            .tables
            .get(name_or_id)
            .or_else(|| self.tables.values().find(|t| t.id == name_or_id));
        Ok(table.cloned())
    }
}
