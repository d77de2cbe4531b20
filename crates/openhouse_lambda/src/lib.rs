//! AWS-oriented adapters and handlers for the open house API.
//!
//! This crate owns runtime integration details (Lambda handlers, DynamoDB
//! access and the in-memory store used by tests) on top of the contract,
//! validation and batching primitives from `openhouse_core`.

pub mod adapters;
pub mod handlers;
pub mod runtime;
