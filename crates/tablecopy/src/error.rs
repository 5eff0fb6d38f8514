//! Error types for the copy engine.

use thiserror::Error;

/// Result type alias for the tablecopy crate.
pub type Result<T> = std::result::Result<T, CopyError>;

/// Errors that can occur while copying a table.
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Source table '{table_name}' does not exist or is not in active state")]
    SourceTableUnavailable { table_name: String },

    #[error("Timeout waiting for table '{table_name}' to become active")]
    TableActivationTimeout { table_name: String },

    #[error("{count} items for table '{table_name}' remained unprocessed after retries")]
    UnprocessedItems { table_name: String, count: usize },

    #[error("Segment count must be at least 1, got {segments}")]
    InvalidSegmentCount { segments: usize },

    #[error("Segment {segment} worker panicked: {message}")]
    WorkerPanicked { segment: usize, message: String },

    #[error("{failed} of {total} segments failed")]
    SegmentsFailed { failed: usize, total: usize },
}
