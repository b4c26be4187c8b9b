use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::item_key::{EventKey, ItemAttribute};

/// One abnormal-behaviour alert emitted by the analytics application.
///
/// Every field is optional on the wire. Absent fields and explicit `null`
/// both decode to the empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub object_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub biz_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub error_msg: String,
}

impl AlertEvent {
    pub fn key(&self) -> EventKey {
        EventKey::new(self.event_id.clone(), self.created_at.clone())
    }

    pub fn attribute(&self, attribute: ItemAttribute) -> &str {
        match attribute {
            ItemAttribute::EventId => &self.event_id,
            ItemAttribute::Action => &self.action,
            ItemAttribute::UserId => &self.user_id,
            ItemAttribute::CreatedAt => &self.created_at,
            ItemAttribute::ObjectId => &self.object_id,
            ItemAttribute::BizId => &self.biz_id,
            ItemAttribute::ErrorMsg => &self.error_msg,
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("record data is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("record data is not a valid alert event: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub fn decode_event(payload: &[u8]) -> Result<AlertEvent, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}

pub fn encode_event(event: &AlertEvent) -> Vec<u8> {
    serde_json::to_vec(event).expect("alert event serialization should not fail")
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn sample_event() -> AlertEvent {
        AlertEvent {
            event_id: "6f1c2a7e-0b7a-4b0e-9d55-6b1e3c2f9a10".to_string(),
            action: "login_failed".to_string(),
            user_id: "user-17".to_string(),
            created_at: "2026-02-14 08:15:30.123456".to_string(),
            object_id: "object-3".to_string(),
            biz_id: "biz-9".to_string(),
            error_msg: "[error]".to_string(),
        }
    }

    #[test]
    fn decode_reads_wire_field_names() {
        let payload = br#"{
            "eventId": "e-1",
            "action": "purchase",
            "userId": "u-1",
            "createdAt": "2026-02-14T00:00:00Z",
            "objectId": "o-1",
            "bizId": "b-1",
            "errorMsg": "too many attempts"
        }"#;

        let event = decode_event(payload).expect("payload should decode");
        assert_eq!(event.event_id, "e-1");
        assert_eq!(event.action, "purchase");
        assert_eq!(event.user_id, "u-1");
        assert_eq!(event.created_at, "2026-02-14T00:00:00Z");
        assert_eq!(event.object_id, "o-1");
        assert_eq!(event.biz_id, "b-1");
        assert_eq!(event.error_msg, "too many attempts");
    }

    #[test]
    fn missing_and_null_fields_default_to_empty() {
        let event = decode_event(br#"{"eventId": "e-1", "errorMsg": null}"#)
            .expect("partial payload should decode");

        assert_eq!(event.event_id, "e-1");
        assert_eq!(event.error_msg, "");
        assert_eq!(event.created_at, "");
        assert_eq!(event.biz_id, "");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let event = decode_event(br#"{"eventId": "e-1", "severity": 3}"#)
            .expect("unknown fields should be tolerated");
        assert_eq!(event.event_id, "e-1");
    }

    #[test]
    fn decode_then_encode_preserves_every_field() {
        let original = sample_event();
        let wire = encode_event(&original);

        let decoded = decode_event(&wire).expect("encoded event should decode");
        assert_eq!(decoded, original);
        assert_eq!(encode_event(&decoded), wire);
    }

    #[test]
    fn round_trip_keeps_non_ascii_text() {
        let original = AlertEvent {
            user_id: "Zoë Ångström".to_string(),
            error_msg: "ログイン失敗 🚨".to_string(),
            ..sample_event()
        };

        let decoded = decode_event(&encode_event(&original)).expect("unicode event should decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn round_trip_keeps_quotes_and_backslashes() {
        let original = AlertEvent {
            object_id: r"C:\alerts\new".to_string(),
            error_msg: "said \"stop\"\n\ttwice".to_string(),
            ..sample_event()
        };

        let wire = encode_event(&original);
        serde_json::from_slice::<Value>(&wire).expect("escaped payload should stay valid JSON");
        let decoded = decode_event(&wire).expect("escaped event should decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn round_trip_keeps_all_empty_event() {
        let original = AlertEvent::default();
        let wire = encode_event(&original);

        let decoded = decode_event(&wire).expect("empty event should decode");
        assert_eq!(decoded, original);
        let fields: Value = serde_json::from_slice(&wire).expect("wire should be JSON");
        assert_eq!(fields["eventId"], json!(""));
        assert_eq!(fields["createdAt"], json!(""));
    }

    #[test]
    fn repeated_keys_are_rejected() {
        let error = decode_event(br#"{"eventId": "a", "eventId": "b"}"#)
            .expect_err("ambiguous payload should not decode");
        assert!(matches!(error, DecodeError::InvalidJson(_)));
    }

    #[test]
    fn encode_uses_wire_field_names() {
        let wire: Value = serde_json::from_slice(&encode_event(&sample_event()))
            .expect("encoded event should be json");
        let object = wire.as_object().expect("encoded event should be an object");

        let mut names: Vec<&str> = object.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["action", "bizId", "createdAt", "errorMsg", "eventId", "objectId", "userId"]
        );
        assert_eq!(wire["eventId"], json!("6f1c2a7e-0b7a-4b0e-9d55-6b1e3c2f9a10"));
    }

    #[test]
    fn malformed_payloads_fail_to_decode() {
        for payload in [
            &b"not json"[..],
            &b"{\"eventId\": "[..],
            &b"[1, 2, 3]"[..],
            &b"{\"eventId\": 42}"[..],
            &b""[..],
        ] {
            let error = decode_event(payload).expect_err("payload should be rejected");
            assert!(matches!(error, DecodeError::InvalidJson(_)));
        }
    }

    #[test]
    fn attribute_lookup_matches_wire_names() {
        let event = sample_event();
        let wire: Value = serde_json::from_slice(&encode_event(&event))
            .expect("encoded event should be json");

        for attribute in ItemAttribute::ALL {
            assert_eq!(wire[attribute.as_str()], json!(event.attribute(attribute)));
        }
    }

    #[test]
    fn key_combines_event_id_and_created_at() {
        let key = sample_event().key();
        assert_eq!(key.event_id, "6f1c2a7e-0b7a-4b0e-9d55-6b1e3c2f9a10");
        assert_eq!(key.created_at, "2026-02-14 08:15:30.123456");
    }
}
