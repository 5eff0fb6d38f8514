//! End-to-end engine tests against the in-memory store.

use std::collections::BTreeSet;
use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;

use tablecopy::coordinator::{run_migration, MigrationConfig};
use tablecopy::store::inmemory::InMemoryStore;
use tablecopy::store::{Item, TableStore};
use tablecopy::CopyError;
use tablecopy_core::schema::{
    derive_creation_spec, AttributeDefinition, AttributeType, BillingMode, KeyKind,
    KeySchemaElement, TableDescriptor, TableStatus,
};

fn descriptor(name: &str) -> TableDescriptor {
    TableDescriptor {
        table_name: name.to_string(),
        status: TableStatus::Active,
        key_schema: vec![KeySchemaElement {
            name: "PK".to_string(),
            kind: KeyKind::Partition,
        }],
        attribute_definitions: vec![AttributeDefinition {
            name: "PK".to_string(),
            attribute_type: AttributeType::S,
        }],
        billing_mode: BillingMode::PayPerRequest,
        provisioned_throughput: None,
        global_secondary_indexes: vec![],
        local_secondary_indexes: vec![],
        item_count: 0,
    }
}

fn item(i: usize) -> Item {
    let mut item = Item::new();
    item.insert("PK".to_string(), AttributeValue::S(format!("ITEM#{i:05}")));
    item.insert("value".to_string(), AttributeValue::N(i.to_string()));
    item
}

fn primary_keys(items: &[Item]) -> BTreeSet<String> {
    items
        .iter()
        .filter_map(|item| item.get("PK"))
        .filter_map(|value| value.as_s().ok())
        .cloned()
        .collect()
}

fn config(segments: usize, limit: usize) -> MigrationConfig {
    MigrationConfig {
        source_table: "orders".to_string(),
        dest_table: "orders-replica".to_string(),
        segments,
        limit,
    }
}

async fn store_with_source(item_count: usize) -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .put_table(descriptor("orders"), (0..item_count).map(item).collect())
        .await;
    store
}

#[tokio::test]
async fn end_to_end_five_segments() {
    let store = store_with_source(1250).await;
    let source: Arc<dyn TableStore> = Arc::new(store.clone());
    let dest: Arc<dyn TableStore> = Arc::new(store.clone());

    let summary = run_migration(source, dest, &config(5, 500)).await.unwrap();

    assert_eq!(summary.segments, 5);
    assert_eq!(summary.items, 1250);

    let copied = store.items("orders-replica").await;
    assert_eq!(copied.len(), 1250);
    assert_eq!(primary_keys(&copied), primary_keys(&store.items("orders").await));

    // 250 items per segment fit in a single 500-item page.
    for segment in 0..5 {
        assert_eq!(store.scan_calls(segment).await, 1, "segment {segment}");
    }
}

#[tokio::test]
async fn segments_cover_the_table_exactly_once() {
    for segments in [1, 2, 3, 7] {
        let store = store_with_source(100).await;
        let source: Arc<dyn TableStore> = Arc::new(store.clone());
        let dest: Arc<dyn TableStore> = Arc::new(store.clone());

        let summary = run_migration(source, dest, &config(segments, 500))
            .await
            .unwrap();

        // Summed per-segment counters catch duplicates, the key set
        // catches omissions.
        assert_eq!(summary.items, 100, "{segments} segments");
        let copied = store.items("orders-replica").await;
        assert_eq!(primary_keys(&copied), primary_keys(&store.items("orders").await));
    }
}

#[tokio::test]
async fn pagination_stops_after_the_final_page() {
    let store = store_with_source(1200).await;
    let source: Arc<dyn TableStore> = Arc::new(store.clone());
    let dest: Arc<dyn TableStore> = Arc::new(store.clone());

    let summary = run_migration(source, dest, &config(1, 500)).await.unwrap();

    // 500 + 500 + 200, the third response carries no continuation key.
    assert_eq!(store.scan_calls(0).await, 3);
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.items, 1200);
}

#[tokio::test]
async fn empty_source_copies_nothing() {
    let store = store_with_source(0).await;
    let source: Arc<dyn TableStore> = Arc::new(store.clone());
    let dest: Arc<dyn TableStore> = Arc::new(store.clone());

    let summary = run_migration(source, dest, &config(1, 500)).await.unwrap();

    assert_eq!(summary.items, 0);
    assert_eq!(summary.pages, 1);
    assert!(store.items("orders-replica").await.is_empty());
}

#[tokio::test]
async fn missing_destination_is_created_from_the_source_schema() {
    let store = store_with_source(10).await;
    let source: Arc<dyn TableStore> = Arc::new(store.clone());
    let dest: Arc<dyn TableStore> = Arc::new(store.clone());

    run_migration(source, dest, &config(1, 500)).await.unwrap();

    let specs = store.created_specs().await;
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0], derive_creation_spec(&descriptor("orders"), "orders-replica"));

    let created = store.describe_table("orders-replica").await.unwrap().unwrap();
    assert_eq!(created.key_schema, descriptor("orders").key_schema);
    assert_eq!(created.billing_mode, BillingMode::PayPerRequest);
}

#[tokio::test]
async fn existing_destination_is_never_recreated() {
    for status in [
        TableStatus::Active,
        TableStatus::Creating,
        TableStatus::Updating,
        TableStatus::Deleting,
    ] {
        let store = store_with_source(10).await;
        store.put_table(descriptor("orders-replica"), vec![]).await;
        store.set_status("orders-replica", status).await;
        let source: Arc<dyn TableStore> = Arc::new(store.clone());
        let dest: Arc<dyn TableStore> = Arc::new(store.clone());

        run_migration(source, dest, &config(1, 500)).await.unwrap();

        assert!(store.created_specs().await.is_empty(), "status {status:?}");
    }
}

#[tokio::test]
async fn missing_source_fails_before_any_work() {
    let store = InMemoryStore::new();
    let source: Arc<dyn TableStore> = Arc::new(store.clone());
    let dest: Arc<dyn TableStore> = Arc::new(store.clone());

    let err = run_migration(source, dest, &config(2, 500)).await.unwrap_err();

    assert!(matches!(err, CopyError::SourceTableUnavailable { .. }));
    assert_eq!(store.scan_calls(0).await, 0);
    assert!(store.created_specs().await.is_empty());
}

#[tokio::test]
async fn inactive_source_fails_before_any_work() {
    let store = store_with_source(10).await;
    store.set_status("orders", TableStatus::Creating).await;
    let source: Arc<dyn TableStore> = Arc::new(store.clone());
    let dest: Arc<dyn TableStore> = Arc::new(store.clone());

    let err = run_migration(source, dest, &config(1, 500)).await.unwrap_err();

    assert!(matches!(err, CopyError::SourceTableUnavailable { .. }));
}

#[tokio::test]
async fn zero_segments_is_rejected() {
    let store = store_with_source(10).await;
    let source: Arc<dyn TableStore> = Arc::new(store.clone());
    let dest: Arc<dyn TableStore> = Arc::new(store.clone());

    let err = run_migration(source, dest, &config(0, 500)).await.unwrap_err();

    assert!(matches!(err, CopyError::InvalidSegmentCount { segments: 0 }));
}

#[tokio::test]
async fn failed_segment_does_not_disturb_siblings() {
    let store = store_with_source(90).await;
    store.fail_segment(1).await;
    let source: Arc<dyn TableStore> = Arc::new(store.clone());
    let dest: Arc<dyn TableStore> = Arc::new(store.clone());

    let err = run_migration(source, dest, &config(3, 500)).await.unwrap_err();

    assert!(matches!(
        err,
        CopyError::SegmentsFailed { failed: 1, total: 3 }
    ));

    // Segments 0 and 2 completed; nothing from the failed response was
    // written.
    let copied = store.items("orders-replica").await;
    assert_eq!(copied.len(), 60);
    let copied_keys = primary_keys(&copied);
    for i in 0..90 {
        let expected = i % 3 != 1;
        assert_eq!(
            copied_keys.contains(&format!("ITEM#{i:05}")),
            expected,
            "item {i}"
        );
    }
}
