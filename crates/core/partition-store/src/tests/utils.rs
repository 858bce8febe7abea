//! Shared fixtures for partition resolution tests.

use bundle_identity::{BundleIdentity, FieldMap, Name, PartitionNameQuery, field};
use object_number::{AssignmentClass, DatasetNumber};

use crate::{
    BoxError, InMemoryPartitionStore, InMemoryTables, InsertError, PartitionRecord,
    PartitionRecordStore, PartitionRequest, Partitions, Predicate,
};

pub type TestPartitions<S = InMemoryPartitionStore> = Partitions<S, InMemoryTables>;

/// Bundle `example.com-sales` at revision 1, registered number 100.
pub fn bundle() -> BundleIdentity {
    bundle_numbered("sales", 100)
}

pub fn bundle_numbered(dataset: &str, number: u64) -> BundleIdentity {
    monitoring::logging::init();

    let name = Name::from_fields(&field::fields([
        ("source", "example.com"),
        ("dataset", dataset),
        ("version", "0.1.0"),
    ]))
    .expect("bundle name should be valid");
    let on = DatasetNumber::new(number, AssignmentClass::Registered)
        .and_then(|on| on.with_revision(Some(1)))
        .expect("bundle number should fit");
    BundleIdentity::new(name, on).expect("bundle identity should build")
}

pub fn tables() -> InMemoryTables {
    InMemoryTables::new()
        .with_table("t0001C01", "sales")
        .with_table("t0001C02", "orders")
}

pub fn partitions(store: &InMemoryPartitionStore) -> TestPartitions {
    Partitions::new(bundle(), store.clone(), tables())
}

pub fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    field::fields(pairs.iter().copied())
}

pub fn request(pairs: &[(&str, &str)]) -> PartitionRequest {
    PartitionRequest::new(fields(pairs))
}

pub fn query(pairs: &[(&str, &str)]) -> PartitionNameQuery {
    PartitionNameQuery::from_fields(&fields(pairs)).expect("query should build")
}

/// A store whose reads never see existing records, as if every read happened before a
/// concurrent writer committed.
#[derive(Debug, Clone, Default)]
pub struct StaleReadStore {
    pub inner: InMemoryPartitionStore,
}

#[async_trait::async_trait]
impl PartitionRecordStore for StaleReadStore {
    async fn filter(&self, _predicate: &Predicate) -> Result<Vec<PartitionRecord>, BoxError> {
        Ok(Vec::new())
    }

    async fn insert(&self, record: PartitionRecord) -> Result<PartitionRecord, InsertError> {
        self.inner.insert(record).await
    }

    async fn delete(&self, predicate: &Predicate) -> Result<usize, BoxError> {
        self.inner.delete(predicate).await
    }
}
