//! Shared open house domain primitives.
//!
//! This crate owns entity contracts, payload validation, batch chunk planning
//! and table naming. It intentionally excludes AWS SDK and Lambda runtime
//! concerns, which live in `openhouse_lambda`.

pub mod batching;
pub mod contract;
pub mod tables;
pub mod validation;
