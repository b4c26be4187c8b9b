//! AWS-oriented adapters and handlers for the alert sink.
//!
//! This crate owns runtime integration details (the Lambda entry point, the
//! DynamoDB and SNS adapters, logging) and the batch orchestration that ties
//! them together. Domain primitives live in `alert_sink_core`.

pub mod adapters;
pub mod handlers;
pub mod observability;
