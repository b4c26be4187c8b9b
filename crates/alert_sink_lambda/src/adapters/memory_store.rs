use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use alert_sink_core::event::AlertEvent;
use alert_sink_core::item_key::{EventKey, ItemAttribute};

use crate::adapters::event_store::{
    outcome_from_error_code, EventStore, PersistError, PersistOutcome, CONDITIONAL_CHECK_FAILED,
};

const VALIDATION_EXCEPTION: &str = "ValidationException";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub event: AlertEvent,
    pub inspected_at: Option<String>,
    pub write_count: usize,
}

/// In-process event store with the same conditional-write semantics as the
/// DynamoDB table.
///
/// The store has no native conditional put, so each write is a
/// read-check-write performed while holding the item map lock.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    items: Mutex<BTreeMap<EventKey, StoredItem>>,
    injected_failures: Mutex<HashMap<String, String>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write of `event_id` fails with `code` until cleared.
    pub fn inject_failure(&self, event_id: &str, code: &str) {
        lock(&self.injected_failures).insert(event_id.to_string(), code.to_string());
    }

    pub fn clear_failures(&self) {
        lock(&self.injected_failures).clear();
    }

    /// Sets the inspection marker. Returns false when the item is not stored.
    pub fn mark_inspected(&self, key: &EventKey, at: &str) -> bool {
        match lock(&self.items).get_mut(key) {
            Some(item) => {
                item.inspected_at = Some(at.to_string());
                true
            }
            None => false,
        }
    }

    pub fn mark_all_inspected(&self, at: &str) -> usize {
        let mut items = lock(&self.items);
        for item in items.values_mut() {
            item.inspected_at = Some(at.to_string());
        }
        items.len()
    }

    pub fn get(&self, key: &EventKey) -> Option<StoredItem> {
        lock(&self.items).get(key).cloned()
    }

    pub fn keys(&self) -> Vec<EventKey> {
        lock(&self.items).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventStore for InMemoryEventStore {
    fn put_if_absent(&self, event: &AlertEvent) -> Result<PersistOutcome, PersistError> {
        let key = event.key();
        if let Some(code) = lock(&self.injected_failures).get(&event.event_id) {
            return outcome_from_error_code(key, code, "injected store failure");
        }
        if let Some(attribute) = empty_key_attribute(event) {
            let message = format!("empty value for key attribute {}", attribute.as_str());
            return outcome_from_error_code(key, VALIDATION_EXCEPTION, &message);
        }

        let mut items = lock(&self.items);
        match items.get_mut(&key) {
            Some(existing) if existing.inspected_at.is_some() => {
                outcome_from_error_code(key, CONDITIONAL_CHECK_FAILED, "item already inspected")
            }
            Some(existing) => {
                existing.event = event.clone();
                existing.write_count += 1;
                Ok(PersistOutcome::Inserted)
            }
            None => {
                items.insert(
                    key,
                    StoredItem {
                        event: event.clone(),
                        inspected_at: None,
                        write_count: 1,
                    },
                );
                Ok(PersistOutcome::Inserted)
            }
        }
    }
}

/// DynamoDB refuses empty strings in key attributes.
fn empty_key_attribute(event: &AlertEvent) -> Option<ItemAttribute> {
    ItemAttribute::ALL
        .into_iter()
        .find(|attribute| attribute.is_key() && event.attribute(*attribute).is_empty())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> AlertEvent {
        AlertEvent {
            event_id: "e-1".to_string(),
            action: "login_failed".to_string(),
            user_id: "u-1".to_string(),
            created_at: "2026-02-14T00:00:00Z".to_string(),
            object_id: "o-1".to_string(),
            biz_id: "b-1".to_string(),
            error_msg: "[error]".to_string(),
        }
    }

    #[test]
    fn repeated_writes_keep_a_single_item() {
        let store = InMemoryEventStore::new();
        let event = sample_event();

        assert_eq!(store.put_if_absent(&event), Ok(PersistOutcome::Inserted));
        assert_eq!(store.put_if_absent(&event), Ok(PersistOutcome::Inserted));

        assert_eq!(store.len(), 1);
        let item = store.get(&event.key()).expect("item should be stored");
        assert_eq!(item.event, event);
        assert_eq!(item.write_count, 2);
    }

    #[test]
    fn same_event_id_with_new_created_at_is_a_new_item() {
        let store = InMemoryEventStore::new();
        let first = sample_event();
        let second = AlertEvent {
            created_at: "2026-02-14T00:00:05Z".to_string(),
            ..sample_event()
        };

        store.put_if_absent(&first).expect("first write should pass");
        store.put_if_absent(&second).expect("second write should pass");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn inspected_items_are_never_overwritten() {
        let store = InMemoryEventStore::new();
        let event = sample_event();
        store.put_if_absent(&event).expect("first write should pass");
        assert!(store.mark_inspected(&event.key(), "2026-02-15T09:00:00Z"));

        let changed = AlertEvent {
            error_msg: "rewritten".to_string(),
            ..sample_event()
        };
        assert_eq!(
            store.put_if_absent(&changed),
            Ok(PersistOutcome::AlreadyExists)
        );

        let item = store.get(&event.key()).expect("item should be stored");
        assert_eq!(item.event.error_msg, "[error]");
        assert_eq!(item.inspected_at.as_deref(), Some("2026-02-15T09:00:00Z"));
        assert_eq!(item.write_count, 1);
    }

    #[test]
    fn empty_key_attributes_are_rejected_like_dynamodb() {
        let store = InMemoryEventStore::new();
        let missing_created_at = AlertEvent {
            created_at: String::new(),
            ..sample_event()
        };

        let error = store
            .put_if_absent(&missing_created_at)
            .expect_err("empty sort key should be rejected");
        assert_eq!(error.code, "ValidationException");
        assert!(!error.retryable);
        assert!(error.message.contains("createdAt"));

        let error = store
            .put_if_absent(&AlertEvent::default())
            .expect_err("empty partition key should be rejected");
        assert!(error.message.contains("eventId"));
        assert!(store.is_empty());
    }

    #[test]
    fn mark_inspected_reports_missing_items() {
        let store = InMemoryEventStore::new();
        assert!(!store.mark_inspected(&sample_event().key(), "now"));
        assert!(store.is_empty());
    }

    #[test]
    fn injected_failures_surface_as_persist_errors_until_cleared() {
        let store = InMemoryEventStore::new();
        store.inject_failure("e-1", "ProvisionedThroughputExceededException");

        let error = store
            .put_if_absent(&sample_event())
            .expect_err("injected failure should fail the write");
        assert!(error.retryable);
        assert!(store.is_empty());

        store.clear_failures();
        assert_eq!(
            store.put_if_absent(&sample_event()),
            Ok(PersistOutcome::Inserted)
        );
    }
}
