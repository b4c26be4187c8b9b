use alert_sink_core::event::AlertEvent;
use alert_sink_core::item_key::EventKey;
use thiserror::Error;

pub const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailedException";
/// Code used when the request never produced a service response.
pub const TRANSPORT_ERROR: &str = "TransportError";

const RETRYABLE_CODES: [&str; 7] = [
    TRANSPORT_ERROR,
    "ProvisionedThroughputExceededException",
    "ThrottlingException",
    "RequestLimitExceeded",
    "InternalServerError",
    "ServiceUnavailable",
    "TransactionConflictException",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Inserted,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to persist alert {key}: {code}: {message}")]
pub struct PersistError {
    pub key: EventKey,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl PersistError {
    pub fn new(key: EventKey, code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let retryable = is_retryable_code(&code);
        Self {
            key,
            code,
            message: message.into(),
            retryable,
        }
    }
}

/// Conditional write of one alert. A failed condition is reported as
/// `AlreadyExists`, never as an error.
pub trait EventStore {
    fn put_if_absent(&self, event: &AlertEvent) -> Result<PersistOutcome, PersistError>;
}

/// Maps a store error code to the persistence result the orchestrator sees.
pub fn outcome_from_error_code(
    key: EventKey,
    code: &str,
    message: &str,
) -> Result<PersistOutcome, PersistError> {
    if code == CONDITIONAL_CHECK_FAILED {
        return Ok(PersistOutcome::AlreadyExists);
    }
    Err(PersistError::new(key, code, message))
}

pub fn is_retryable_code(code: &str) -> bool {
    RETRYABLE_CODES.contains(&code)
}
