//! Find-or-create tests

use std::collections::BTreeMap;

use bundle_identity::PartitionFormat;
use pretty_assertions::assert_eq;

use super::utils::{StaleReadStore, bundle, partitions, request, tables};
use crate::{CreateError, InMemoryPartitionStore, Outcome, Partitions};

#[tokio::test]
async fn find_or_new_twice_inserts_once() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let request = request(&[("table", "sales"), ("time", "2010")]);

    //* When
    let (first, first_outcome) = parts
        .find_or_new(&request)
        .await
        .expect("first call should create");
    let (second, second_outcome) = parts
        .find_or_new(&request)
        .await
        .expect("second call should find");

    //* Then
    assert_eq!(first_outcome, Outcome::Created);
    assert_eq!(second_outcome, Outcome::Found);
    assert_eq!(first.vid(), second.vid(), "both calls should return the same partition");
    assert_eq!(store.insert_count(), 1, "exactly one insert should happen");
}

#[tokio::test]
async fn find_or_new_matches_cleaned_values() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let (created, _) = parts
        .find_or_new(&request(&[("table", "sales"), ("time", "Jan 2010")]))
        .await
        .expect("partition should be created");

    //* When
    let (found, outcome) = parts
        .find_or_new(&request(&[("table", "sales"), ("time", "JAN 2010")]))
        .await
        .expect("partition should be found");

    //* Then
    assert_eq!(created.name().get(bundle_identity::FieldKey::Time), Some("jan_2010"));
    assert_eq!(outcome, Outcome::Found);
    assert_eq!(found, created);
}

#[tokio::test]
async fn new_partitions_are_numbered_sequentially_with_bundle_revision() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);

    //* When
    let mut vids = Vec::new();
    for time in ["2010", "2011", "2012"] {
        let (created, _) = parts
            .find_or_new(&request(&[("table", "sales"), ("time", time)]))
            .await
            .expect("partition should be created");
        vids.push(created.vid());
    }

    //* Then
    assert_eq!(vids, ["p0001C000001", "p0001C001001", "p0001C002001"]);
}

#[tokio::test]
async fn created_partition_binds_version_and_names() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);

    //* When
    let (created, _) = parts
        .find_or_new(&request(&[
            ("table", "sales"),
            ("time", "2010"),
            ("space", "ca"),
            ("grain", "county"),
        ]))
        .await
        .expect("partition should be created");

    //* Then
    assert_eq!(created.name().version().to_string(), "0.1.1", "patch follows revision");
    assert_eq!(
        created.fqname(),
        "example.com-sales-sales-2010-ca-county-0.1.1~p0001C000001"
    );
    assert_eq!(
        created.cache_key(),
        "example.com/sales-0.1.1/sales/2010-ca/county.db"
    );
}

#[tokio::test]
async fn created_record_lists_tables_and_data() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let data = BTreeMap::from([("rows".to_string(), serde_json::json!(42))]);

    //* When
    parts
        .find_or_new(
            &request(&[("table", "sales")])
                .with_tables(["orders"])
                .with_data(data.clone()),
        )
        .await
        .expect("partition should be created");

    //* Then
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tables, ["sales", "orders"]);
    assert_eq!(records[0].table_id.as_deref(), Some("t0001C01"));
    assert_eq!(records[0].dataset_vid, "d0001C001");
    assert_eq!(records[0].data, data);
}

#[tokio::test]
async fn find_or_new_with_format_selects_cache_key_extension() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    parts
        .find_or_new(&request(&[("table", "sales")]))
        .await
        .expect("db partition should be created");

    //* When
    let (csv, outcome) = parts
        .find_or_new(&request(&[("table", "sales")]).with_format(PartitionFormat::Csv))
        .await
        .expect("csv partition should be created");

    //* Then
    assert_eq!(outcome, Outcome::Created, "format distinguishes partitions");
    assert_eq!(csv.format(), PartitionFormat::Csv);
    assert_eq!(csv.cache_key(), "example.com/sales-0.1.1/sales.csv");

    let non_csv = parts
        .all_excluding_format(PartitionFormat::Csv)
        .await
        .expect("listing should succeed");
    assert_eq!(non_csv.len(), 1);
    assert_eq!(non_csv[0].format(), PartitionFormat::Db);
}

#[tokio::test]
async fn find_or_new_without_format_skips_other_formats() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let (csv, _) = parts
        .find_or_new(&request(&[("table", "sales")]).with_format(PartitionFormat::Csv))
        .await
        .expect("csv partition should be created");

    //* When
    let (db, outcome) = parts
        .find_or_new(&request(&[("table", "sales")]))
        .await
        .expect("db partition should be created");

    //* Then
    assert_eq!(outcome, Outcome::Created, "the csv partition must not satisfy a db request");
    assert_eq!(db.format(), PartitionFormat::Db);
    assert_ne!(db.vid(), csv.vid());
    let formats = store
        .records()
        .into_iter()
        .map(|record| record.format)
        .collect::<Vec<_>>();
    assert_eq!(formats, [Some("csv".to_string()), Some("db".to_string())]);
}

#[tokio::test]
async fn find_or_new_uses_default_format_of_partitions() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store).with_default_format(PartitionFormat::Hdf);

    //* When
    let (created, _) = parts
        .find_or_new(&request(&[("table", "sales")]))
        .await
        .expect("partition should be created");
    let (explicit, _) = parts
        .find_or_new(&request(&[("table", "sales"), ("format", "csv")]))
        .await
        .expect("partition should be created");

    //* Then
    assert_eq!(created.format(), PartitionFormat::Hdf);
    assert_eq!(created.cache_key(), "example.com/sales-0.1.1/sales.hdf5");
    assert_eq!(explicit.format(), PartitionFormat::Csv, "a format field wins");
}

#[tokio::test]
async fn find_or_new_with_none_marker_inserts_once() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let request = request(&[("table", "sales"), ("time", "<none>")]);

    //* When
    let (first, _) = parts
        .find_or_new(&request)
        .await
        .expect("first call should create");
    let (second, outcome) = parts
        .find_or_new(&request)
        .await
        .expect("second call should find");

    //* Then
    assert_eq!(outcome, Outcome::Found);
    assert_eq!(second.vid(), first.vid());
    assert_eq!(first.name().get(bundle_identity::FieldKey::Time), None);
    assert_eq!(first.vname(), "example.com-sales-sales-0.1.1");
    assert_eq!(store.insert_count(), 1, "exactly one insert should happen");
}

#[tokio::test]
async fn new_partition_with_existing_match_fails() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);
    let request = request(&[("table", "sales"), ("time", "2010")]);
    parts
        .new_partition(&request)
        .await
        .expect("first partition should be created");

    //* When
    let result = parts.new_partition(&request).await;

    //* Then
    assert!(
        matches!(result, Err(CreateError::AlreadyExists(_))),
        "expected an already-exists error, got {result:?}"
    );
    assert_eq!(store.insert_count(), 1);
}

#[tokio::test]
async fn concurrent_create_surfaces_conflict() {
    //* Given
    let store = StaleReadStore::default();
    let parts = Partitions::new(bundle(), store.clone(), tables());
    let request = request(&[("table", "sales"), ("time", "2010")]);
    parts
        .find_or_new(&request)
        .await
        .expect("first writer should create");

    //* When
    let result = parts.find_or_new(&request).await;

    //* Then
    assert!(
        matches!(&result, Err(err) if err.is_conflict()),
        "second writer should conflict, got {result:?}"
    );
    assert_eq!(store.inner.insert_count(), 1, "no duplicate should be stored");
}

#[tokio::test]
async fn find_or_new_with_unknown_table_fails() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);

    //* When
    let result = parts.find_or_new(&request(&[("table", "customers")])).await;

    //* Then
    assert!(
        matches!(result, Err(CreateError::Find(crate::FindError::UnknownTable(_)))),
        "expected an unknown table error, got {result:?}"
    );
    assert_eq!(store.insert_count(), 0);
}

#[tokio::test]
async fn find_or_new_with_unknown_format_fails() {
    //* Given
    let store = InMemoryPartitionStore::new();
    let parts = partitions(&store);

    //* When
    let result = parts
        .find_or_new(&request(&[("table", "sales"), ("format", "parquet")]))
        .await;

    //* Then
    assert!(
        matches!(result, Err(CreateError::InvalidName(_))),
        "expected an invalid name error, got {result:?}"
    );
}
