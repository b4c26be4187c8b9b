use alert_sink_core::contract::{DeliveryRecord, DeliveryResponse, OutputDeliveryEvent};
use alert_sink_core::event::decode_event;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

use crate::adapters::event_store::{EventStore, PersistError, PersistOutcome};
use crate::adapters::notifier::Notifier;

const COMPONENT: &str = "delivery_handler";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Delivered,
    Failed(PersistError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub persisted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub publish_failures: usize,
}

/// The only failure that escapes a batch. It carries the response built so
/// far, with the failing record marked `DeliveryFailed`.
#[derive(Debug, Clone, Error)]
pub enum BatchError {
    #[error("record {record_id} could not be persisted: {source}")]
    Persist {
        record_id: String,
        response: DeliveryResponse,
        source: PersistError,
    },
}

impl BatchError {
    pub fn response(&self) -> &DeliveryResponse {
        match self {
            Self::Persist { response, .. } => response,
        }
    }
}

/// Decodes, persists and announces every record of an analytics output
/// delivery batch.
///
/// Records are processed in order. Malformed records are dropped, a failed
/// notification is only logged, and the first persistence failure stops the
/// batch so the platform redelivers it.
pub struct AlertSink<S, N> {
    store: S,
    notifier: N,
}

impl<S: EventStore, N: Notifier> AlertSink<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn handle_delivery(
        &self,
        event: &OutputDeliveryEvent,
    ) -> Result<DeliveryResponse, BatchError> {
        let mut response = DeliveryResponse::acknowledging(event);
        let mut summary = BatchSummary {
            records: event.records.len(),
            ..BatchSummary::default()
        };

        info!(
            component = COMPONENT,
            event = "batch_started",
            invocation_id = %event.invocation_id,
            application_arn = %event.application_arn,
            records = summary.records,
        );

        for (index, record) in event.records.iter().enumerate() {
            let span = info_span!("delivery_record", record_id = %record.record_id, index);
            let _entered = span.enter();

            if let RecordOutcome::Failed(source) = self.process_record(record, &mut summary) {
                response.mark_failed(index);
                error!(
                    component = COMPONENT,
                    event = "batch_aborted",
                    invocation_id = %event.invocation_id,
                    failed_index = index,
                    retryable = source.retryable,
                    error = %source,
                );
                return Err(BatchError::Persist {
                    record_id: record.record_id.clone(),
                    response,
                    source,
                });
            }
        }

        info!(
            component = COMPONENT,
            event = "batch_completed",
            invocation_id = %event.invocation_id,
            records = summary.records,
            persisted = summary.persisted,
            duplicates = summary.duplicates,
            skipped = summary.skipped,
            publish_failures = summary.publish_failures,
        );
        Ok(response)
    }

    pub fn process_record(
        &self,
        record: &DeliveryRecord,
        summary: &mut BatchSummary,
    ) -> RecordOutcome {
        let payload = match record.decode_data() {
            Ok(bytes) => bytes,
            Err(error) => {
                summary.skipped += 1;
                warn!(
                    component = COMPONENT,
                    event = "record_skipped",
                    data = %record.data,
                    error = %error,
                );
                return RecordOutcome::Delivered;
            }
        };
        debug!(
            component = COMPONENT,
            event = "record_received",
            payload = %String::from_utf8_lossy(&payload),
        );

        let alert = match decode_event(&payload) {
            Ok(alert) => alert,
            Err(error) => {
                summary.skipped += 1;
                warn!(
                    component = COMPONENT,
                    event = "record_skipped",
                    payload = %String::from_utf8_lossy(&payload),
                    error = %error,
                );
                return RecordOutcome::Delivered;
            }
        };

        match self.store.put_if_absent(&alert) {
            Ok(PersistOutcome::Inserted) => {
                summary.persisted += 1;
                debug!(
                    component = COMPONENT,
                    event = "record_persisted",
                    key = %alert.key(),
                );
            }
            Ok(PersistOutcome::AlreadyExists) => {
                summary.duplicates += 1;
                info!(
                    component = COMPONENT,
                    event = "record_duplicate",
                    key = %alert.key(),
                );
            }
            Err(error) => return RecordOutcome::Failed(error),
        }

        match self.notifier.publish(&payload) {
            Ok(receipt) => debug!(
                component = COMPONENT,
                event = "notification_sent",
                key = %alert.key(),
                message_id = receipt.message_id.as_deref().unwrap_or_default(),
            ),
            Err(error) => {
                summary.publish_failures += 1;
                warn!(
                    component = COMPONENT,
                    event = "notification_failed",
                    key = %alert.key(),
                    error = %error,
                );
            }
        }

        RecordOutcome::Delivered
    }
}
