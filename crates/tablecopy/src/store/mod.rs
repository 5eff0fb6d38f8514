//! Storage backends for the copy engine.
//!
//! `TableStore` is the seam between the engine and DynamoDB: the real
//! backend lives in [`dynamodb`], and [`inmemory`] provides a deterministic
//! backend for tests.

pub mod dynamodb;
pub mod inmemory;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use tablecopy_core::schema::{TableCreationSpec, TableDescriptor};

use crate::error::Result;

/// A single table item. Items are opaque to the engine; they are read from
/// the source and written to the destination unchanged.
pub type Item = HashMap<String, AttributeValue>;

/// One segment-scoped page read.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub table_name: String,
    /// Segment index in `0..total_segments`.
    pub segment: usize,
    pub total_segments: usize,
    /// Maximum number of items per page.
    pub limit: usize,
    /// Continuation token from the previous page, absent for the first one.
    pub exclusive_start_key: Option<Item>,
}

/// Response to a [`ScanRequest`].
#[derive(Debug, Clone)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Absent once the segment is exhausted.
    pub last_evaluated_key: Option<Item>,
}

/// Table-level operations the copy engine needs from a storage service.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Describes a table, returning `None` if it does not exist.
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescriptor>>;

    /// Submits a create-table call. Does not wait for the table to become
    /// active; pair with [`TableStore::wait_until_active`].
    async fn create_table(&self, spec: &TableCreationSpec) -> Result<()>;

    /// Blocks until the table reports active status.
    async fn wait_until_active(&self, table_name: &str) -> Result<()>;

    /// Reads one page of a parallel scan, strongly consistent, all
    /// attributes.
    async fn scan_segment(&self, request: &ScanRequest) -> Result<ScanPage>;

    /// Writes items to a table, batching and retrying unprocessed items
    /// internally. All-or-nothing from the caller's point of view.
    async fn batch_write(&self, table_name: &str, items: Vec<Item>) -> Result<()>;
}
