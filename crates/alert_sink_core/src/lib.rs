//! Shared alert sink domain primitives.
//!
//! This crate owns the alert event model, the analytics delivery contract and
//! the store key layout. It intentionally excludes AWS SDK and Lambda runtime
//! concerns so the orchestration can be exercised without either.

pub mod config;
pub mod contract;
pub mod event;
pub mod item_key;
