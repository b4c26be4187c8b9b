use thiserror::Error;

pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const TOPIC_ARN_VAR: &str = "TOPIC_ARN";
pub const REGION_VAR: &str = "ALERT_SINK_REGION";

/// Process configuration, validated once before any client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub table_name: String,
    pub topic_arn: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
}

impl SinkConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table_name = required(&lookup, TABLE_NAME_VAR)?;
        let topic_arn = required(&lookup, TOPIC_ARN_VAR)?;
        let region = lookup(REGION_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            table_name,
            topic_arn,
            region,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}
