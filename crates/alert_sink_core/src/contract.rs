//! Wire contract between the streaming analytics application output and the
//! delivery Lambda.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::event::DecodeError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutputDeliveryEvent {
    #[serde(default)]
    pub invocation_id: String,
    #[serde(default)]
    pub application_arn: String,
    #[serde(default)]
    pub records: Vec<DeliveryRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub record_id: String,
    #[serde(default)]
    pub lambda_delivery_record_metadata: DeliveryRecordMetadata,
    /// Base64 of the raw record payload.
    pub data: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecordMetadata {
    #[serde(default)]
    pub retry_hint: i64,
}

impl DeliveryRecord {
    pub fn from_payload(record_id: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            record_id: record_id.into(),
            lambda_delivery_record_metadata: DeliveryRecordMetadata::default(),
            data: STANDARD.encode(payload),
        }
    }

    pub fn decode_data(&self) -> Result<Vec<u8>, DecodeError> {
        Ok(STANDARD.decode(self.data.as_bytes())?)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryResult {
    Ok,
    DeliveryFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponseRecord {
    pub record_id: String,
    pub result: DeliveryResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryResponse {
    pub records: Vec<DeliveryResponseRecord>,
}

impl DeliveryResponse {
    /// One `Ok` entry per input record, in input order.
    pub fn acknowledging(event: &OutputDeliveryEvent) -> Self {
        Self {
            records: event
                .records
                .iter()
                .map(|record| DeliveryResponseRecord {
                    record_id: record.record_id.clone(),
                    result: DeliveryResult::Ok,
                })
                .collect(),
        }
    }

    pub fn mark_failed(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.result = DeliveryResult::DeliveryFailed;
        }
    }

    pub fn results(&self) -> Vec<DeliveryResult> {
        self.records.iter().map(|record| record.result).collect()
    }

    pub fn failed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.result == DeliveryResult::DeliveryFailed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_platform_delivery_event() {
        let event: OutputDeliveryEvent = serde_json::from_value(json!({
            "invocationId": "invocation-1",
            "applicationArn": "arn:aws:kinesisanalytics:us-east-1:123456789012:application/abnormality-event-detector",
            "records": [
                {
                    "recordId": "record-1",
                    "lambdaDeliveryRecordMetadata": {"retryHint": 2},
                    "data": "eyJldmVudElkIjoiZS0xIn0="
                }
            ]
        }))
        .expect("delivery event should parse");

        assert_eq!(event.invocation_id, "invocation-1");
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].lambda_delivery_record_metadata.retry_hint, 2);
        assert_eq!(
            event.records[0].decode_data().expect("data should decode"),
            br#"{"eventId":"e-1"}"#.to_vec()
        );
    }

    #[test]
    fn record_metadata_is_optional() {
        let record: DeliveryRecord =
            serde_json::from_value(json!({"recordId": "r", "data": ""}))
                .expect("record without metadata should parse");
        assert_eq!(record.lambda_delivery_record_metadata.retry_hint, 0);
        assert!(record.decode_data().expect("empty data decodes").is_empty());
    }

    #[test]
    fn invalid_base64_is_a_decode_error() {
        let record = DeliveryRecord {
            record_id: "r".to_string(),
            lambda_delivery_record_metadata: DeliveryRecordMetadata::default(),
            data: "%%% not base64 %%%".to_string(),
        };
        let error = record.decode_data().expect_err("data should be rejected");
        assert!(matches!(error, DecodeError::InvalidBase64(_)));
    }

    #[test]
    fn response_mirrors_record_ids_and_serializes_platform_names() {
        let event = OutputDeliveryEvent {
            records: vec![
                DeliveryRecord::from_payload("a", b"{}"),
                DeliveryRecord::from_payload("b", b"{}"),
            ],
            ..OutputDeliveryEvent::default()
        };
        let mut response = DeliveryResponse::acknowledging(&event);
        response.mark_failed(1);
        response.mark_failed(7);

        assert_eq!(response.failed_count(), 1);
        assert_eq!(
            serde_json::to_value(&response).expect("response should serialize"),
            json!({
                "records": [
                    {"recordId": "a", "result": "Ok"},
                    {"recordId": "b", "result": "DeliveryFailed"}
                ]
            })
        );
    }
}
