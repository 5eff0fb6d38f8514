//! Parallel segmented copy of one DynamoDB table into another.
//!
//! The destination is auto-provisioned from the source schema when it does
//! not exist. The source is partitioned into independent scan segments,
//! each driven by its own worker through a paginated read / batched write
//! loop until exhausted.

pub mod coordinator;
pub mod error;
pub mod provision;
pub mod store;
pub mod worker;

pub use error::{CopyError, Result};
