use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute set by downstream reviewers once an alert has been looked at.
/// The producer never writes it, which makes it the write condition.
pub const INSPECTION_MARKER_ATTRIBUTE: &str = "inspectedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAttribute {
    EventId,
    Action,
    UserId,
    CreatedAt,
    ObjectId,
    BizId,
    ErrorMsg,
}

impl ItemAttribute {
    pub const ALL: [ItemAttribute; 7] = [
        Self::EventId,
        Self::Action,
        Self::UserId,
        Self::CreatedAt,
        Self::ObjectId,
        Self::BizId,
        Self::ErrorMsg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EventId => "eventId",
            Self::Action => "action",
            Self::UserId => "userId",
            Self::CreatedAt => "createdAt",
            Self::ObjectId => "objectId",
            Self::BizId => "bizId",
            Self::ErrorMsg => "errorMsg",
        }
    }

    pub fn is_key(self) -> bool {
        matches!(self, Self::EventId | Self::CreatedAt)
    }
}

/// Composite store key: partition on `eventId`, sort on `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventKey {
    pub event_id: String,
    pub created_at: String,
}

impl EventKey {
    pub fn new(event_id: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            created_at: created_at.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}/{}={}",
            ItemAttribute::EventId.as_str(),
            self.event_id,
            ItemAttribute::CreatedAt.as_str(),
            self.created_at
        )
    }
}

pub fn put_condition_expression() -> String {
    format!("attribute_not_exists({INSPECTION_MARKER_ATTRIBUTE})")
}
