//! Lookup by identifier and deletion tests

use pretty_assertions::assert_eq;

use super::utils::{self, partitions, request};
use crate::{InMemoryPartitionStore, Partitions};

#[tokio::test]
async fn get_finds_partition_by_vid_id_and_name() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let (created, _) = parts
        .find_or_new(&request(&[("table", "sales"), ("time", "2010")]))
        .await
        .expect("partition should be created");

    //* When
    let by_vid = parts.get(&created.vid()).await.expect("get should succeed");
    let by_id = parts.get(&created.id()).await.expect("get should succeed");
    let by_name = parts
        .get(&created.name().name())
        .await
        .expect("get should succeed");
    let missing = parts.get("p0001C099").await.expect("get should succeed");

    //* Then
    assert_eq!(by_vid.as_ref(), Some(&created));
    assert_eq!(by_id.as_ref(), Some(&created));
    assert_eq!(by_name.as_ref(), Some(&created));
    assert_eq!(missing, None);
}

#[tokio::test]
async fn find_table_returns_first_partition_of_table() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let mut created = Vec::new();
    for time in ["2010", "2011"] {
        let (ident, _) = parts
            .find_or_new(&request(&[("table", "orders"), ("time", time)]))
            .await
            .expect("partition should be created");
        created.push(ident);
    }

    //* When
    let by_name = parts
        .find_table("orders")
        .await
        .expect("find_table should succeed");
    let by_id = parts
        .find_table("t0001C02")
        .await
        .expect("find_table should succeed");
    let none = parts
        .find_table("sales")
        .await
        .expect("find_table should succeed");

    //* Then
    assert_eq!(by_name.as_ref(), created.first());
    assert_eq!(by_id.as_ref(), created.first());
    assert_eq!(none, None, "no partition holds the sales table");
}

#[tokio::test]
async fn find_table_with_unknown_table_returns_none() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    parts
        .find_or_new(&request(&[("table", "orders")]))
        .await
        .expect("partition should be created");

    //* When
    let result = parts.find_table("customers").await;

    //* Then
    assert!(
        matches!(result, Ok(None)),
        "an unknown table should have no partition, got {result:?}"
    );
}

#[tokio::test]
async fn delete_removes_only_the_given_partition() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let (doomed, _) = parts
        .find_or_new(&request(&[("table", "sales"), ("time", "2010")]))
        .await
        .expect("partition should be created");
    let (kept, _) = parts
        .find_or_new(&request(&[("table", "sales"), ("time", "2011")]))
        .await
        .expect("partition should be created");

    //* When
    let deleted = parts.delete(&doomed).await.expect("delete should succeed");

    //* Then
    assert_eq!(deleted, 1);
    assert_eq!(parts.all().await.expect("all should succeed"), [kept]);
    assert_eq!(
        parts.get(&doomed.vid()).await.expect("get should succeed"),
        None
    );
}

#[tokio::test]
async fn clean_removes_every_partition_of_the_bundle_only() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    for time in ["2010", "2011"] {
        parts
            .find_or_new(&request(&[("table", "sales"), ("time", time)]))
            .await
            .expect("partition should be created");
    }
    let other = Partitions::new(
        utils::bundle_numbered("orders", 200),
        store.clone(),
        utils::tables(),
    );
    other
        .find_or_new(&request(&[("table", "orders")]))
        .await
        .expect("partition in other bundle should be created");

    //* When
    let deleted = parts.clean().await.expect("clean should succeed");

    //* Then
    assert_eq!(deleted, 2);
    assert_eq!(parts.count().await.expect("count should succeed"), 0);
    assert_eq!(other.count().await.expect("count should succeed"), 1);
}
