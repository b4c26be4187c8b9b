use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReceipt {
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to publish alert notification: {message}")]
pub struct PublishError {
    pub message: String,
}

impl PublishError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Best-effort broadcast of a raw alert payload to subscribers.
pub trait Notifier {
    fn publish(&self, message: &[u8]) -> Result<PublishReceipt, PublishError>;
}

/// Notifier for local replays: records the notification in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn publish(&self, message: &[u8]) -> Result<PublishReceipt, PublishError> {
        info!(
            component = "logging_notifier",
            event = "notification_published",
            payload = %String::from_utf8_lossy(message),
        );
        Ok(PublishReceipt::default())
    }
}
