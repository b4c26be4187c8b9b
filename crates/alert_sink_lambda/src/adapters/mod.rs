pub mod aws;
pub mod dynamodb;
pub mod event_store;
pub mod memory_store;
pub mod notifier;
pub mod sns;
