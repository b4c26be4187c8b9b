use std::fs;
use std::path::Path;

use alert_sink_core::contract::{DeliveryResponse, OutputDeliveryEvent};
use thiserror::Error;
use tracing::info;

use crate::adapters::memory_store::InMemoryEventStore;
use crate::adapters::notifier::Notifier;
use crate::handlers::delivery::{AlertSink, BatchError};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read delivery event file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid delivery event in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("replay pass {pass} failed: {source}")]
    Batch { pass: usize, source: BatchError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    pub passes: usize,
    /// Reviewer timestamp applied to every stored item after the first pass.
    pub inspect_after_first_pass: Option<String>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            passes: 1,
            inspect_after_first_pass: None,
        }
    }
}

pub fn load_delivery_event(path: &Path) -> Result<OutputDeliveryEvent, ReplayError> {
    let display = path.display().to_string();
    let body = fs::read(path).map_err(|source| ReplayError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_slice(&body).map_err(|source| ReplayError::Parse {
        path: display,
        source,
    })
}

/// Feeds the same delivery batch through the sink `passes` times, the way
/// the platform redelivers it, and returns one response per pass.
pub fn replay_delivery<N: Notifier>(
    sink: &AlertSink<InMemoryEventStore, N>,
    event: &OutputDeliveryEvent,
    options: &ReplayOptions,
) -> Result<Vec<DeliveryResponse>, ReplayError> {
    let mut responses = Vec::with_capacity(options.passes);
    for pass in 1..=options.passes {
        let response = sink
            .handle_delivery(event)
            .map_err(|source| ReplayError::Batch { pass, source })?;
        responses.push(response);

        if pass == 1 {
            if let Some(at) = &options.inspect_after_first_pass {
                let inspected = sink.store().mark_all_inspected(at);
                info!(
                    component = "replay",
                    event = "items_inspected",
                    inspected,
                    inspected_at = %at,
                );
            }
        }
    }
    Ok(responses)
}
