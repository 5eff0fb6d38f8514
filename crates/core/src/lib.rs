//! Core types and pure logic for tablecopy (Functional Core).
//!
//! Everything in this crate is side-effect free: schema translation,
//! provisioning plans, and segment bookkeeping. The imperative shell that
//! talks to DynamoDB lives in the `tablecopy` crate.

pub mod planning;
pub mod schema;
pub mod segment;
