//! In-memory storage backend for testing.
//!
//! Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access. Data
//! is not persisted and will be lost when the store is dropped.
//!
//! Segment partitioning is deterministic: item `i` belongs to segment
//! `i % total_segments`, so any segment count covers every item exactly
//! once. Pagination encodes the page offset as a synthetic continuation
//! key, honoring the request's `limit`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tokio::sync::RwLock;

use tablecopy_core::schema::{TableCreationSpec, TableDescriptor, TableStatus};

use super::{Item, ScanPage, ScanRequest, TableStore};
use crate::error::{CopyError, Result};

const OFFSET_KEY: &str = "__offset";

#[derive(Debug, Clone)]
struct StoredTable {
    descriptor: TableDescriptor,
    items: Vec<Item>,
}

/// In-memory table store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, StoredTable>>>,
    created_specs: Arc<RwLock<Vec<TableCreationSpec>>>,
    scan_calls: Arc<RwLock<HashMap<usize, usize>>>,
    failing_segments: Arc<RwLock<HashSet<usize>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a table with the given descriptor and items.
    pub async fn put_table(&self, descriptor: TableDescriptor, items: Vec<Item>) {
        let mut tables = self.tables.write().await;
        tables.insert(
            descriptor.table_name.clone(),
            StoredTable { descriptor, items },
        );
    }

    /// Overrides a table's reported status.
    pub async fn set_status(&self, table_name: &str, status: TableStatus) {
        let mut tables = self.tables.write().await;
        if let Some(table) = tables.get_mut(table_name) {
            table.descriptor.status = status;
        }
    }

    /// Returns a table's items, empty if the table does not exist.
    pub async fn items(&self, table_name: &str) -> Vec<Item> {
        let tables = self.tables.read().await;
        tables
            .get(table_name)
            .map(|t| t.items.clone())
            .unwrap_or_default()
    }

    /// Every creation spec submitted so far, in order.
    pub async fn created_specs(&self) -> Vec<TableCreationSpec> {
        self.created_specs.read().await.clone()
    }

    /// Number of scan calls issued for the given segment index.
    pub async fn scan_calls(&self, segment: usize) -> usize {
        self.scan_calls
            .read()
            .await
            .get(&segment)
            .copied()
            .unwrap_or_default()
    }

    /// Makes every scan for the given segment fail.
    pub async fn fail_segment(&self, segment: usize) {
        self.failing_segments.write().await.insert(segment);
    }

    fn offset_key(offset: usize) -> Item {
        let mut key = Item::new();
        key.insert(
            OFFSET_KEY.to_string(),
            AttributeValue::N(offset.to_string()),
        );
        key
    }

    fn parse_offset(key: Option<&Item>) -> usize {
        key.and_then(|k| k.get(OFFSET_KEY))
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse().ok())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescriptor>> {
        let tables = self.tables.read().await;
        Ok(tables.get(table_name).map(|table| {
            let mut descriptor = table.descriptor.clone();
            descriptor.item_count = table.items.len() as i64;
            descriptor
        }))
    }

    async fn create_table(&self, spec: &TableCreationSpec) -> Result<()> {
        self.created_specs.write().await.push(spec.clone());
        let descriptor = TableDescriptor {
            table_name: spec.table_name.clone(),
            status: TableStatus::Active,
            key_schema: spec.key_schema.clone(),
            attribute_definitions: spec.attribute_definitions.clone(),
            billing_mode: spec.billing_mode,
            provisioned_throughput: spec.provisioned_throughput,
            global_secondary_indexes: spec.global_secondary_indexes.clone(),
            local_secondary_indexes: spec.local_secondary_indexes.clone(),
            item_count: 0,
        };
        self.put_table(descriptor, Vec::new()).await;
        Ok(())
    }

    async fn wait_until_active(&self, table_name: &str) -> Result<()> {
        match self.describe_table(table_name).await? {
            Some(descriptor) if descriptor.status == TableStatus::Active => Ok(()),
            _ => Err(CopyError::TableActivationTimeout {
                table_name: table_name.to_string(),
            }),
        }
    }

    async fn scan_segment(&self, request: &ScanRequest) -> Result<ScanPage> {
        {
            let mut calls = self.scan_calls.write().await;
            *calls.entry(request.segment).or_default() += 1;
        }
        if self.failing_segments.read().await.contains(&request.segment) {
            return Err(CopyError::AwsSdk(format!(
                "scripted scan failure for segment {}",
                request.segment
            )));
        }

        let tables = self.tables.read().await;
        let table = tables.get(&request.table_name).ok_or_else(|| {
            CopyError::AwsSdk(format!("table '{}' not found", request.table_name))
        })?;

        let segment_items: Vec<&Item> = table
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| i % request.total_segments == request.segment)
            .map(|(_, item)| item)
            .collect();

        let offset = Self::parse_offset(request.exclusive_start_key.as_ref());
        let end = (offset + request.limit).min(segment_items.len());
        let items: Vec<Item> = segment_items[offset..end].iter().map(|i| (*i).clone()).collect();

        Ok(ScanPage {
            items,
            last_evaluated_key: (end < segment_items.len()).then(|| Self::offset_key(end)),
        })
    }

    async fn batch_write(&self, table_name: &str, items: Vec<Item>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| CopyError::AwsSdk(format!("table '{}' not found", table_name)))?;

        // Put semantics: an incoming item replaces an existing one with the
        // same primary key values.
        let key_names: Vec<String> = table
            .descriptor
            .key_schema
            .iter()
            .map(|element| element.name.clone())
            .collect();

        for item in items {
            table.items.retain(|existing| {
                !key_names
                    .iter()
                    .all(|name| existing.get(name) == item.get(name))
            });
            table.items.push(item);
        }

        Ok(())
    }
}
