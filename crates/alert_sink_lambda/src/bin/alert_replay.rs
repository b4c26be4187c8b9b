use std::path::PathBuf;
use std::process::ExitCode;

use alert_sink_lambda::adapters::memory_store::InMemoryEventStore;
use alert_sink_lambda::adapters::notifier::LoggingNotifier;
use alert_sink_lambda::handlers::delivery::AlertSink;
use alert_sink_lambda::handlers::replay::{load_delivery_event, replay_delivery, ReplayOptions};
use alert_sink_lambda::observability::init_logging;
use chrono::Utc;
use clap::Parser;
use serde_json::json;

/// Replays an analytics output delivery event through the alert sink using
/// an in-memory table and a log-only notifier.
#[derive(Parser)]
#[command(name = "alert_replay")]
struct Cli {
    /// Delivery event JSON file (same shape the Lambda receives)
    #[arg(long)]
    input: PathBuf,
    /// How many times the batch is delivered
    #[arg(long, default_value_t = 1)]
    passes: usize,
    /// Mark stored items inspected after the first pass
    #[arg(long)]
    inspect: bool,
    /// Fail every write of this event id with a throttling error
    #[arg(long)]
    fail_event_id: Option<String>,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let event = match load_delivery_event(&cli.input) {
        Ok(event) => event,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let sink = AlertSink::new(InMemoryEventStore::new(), LoggingNotifier);
    if let Some(event_id) = &cli.fail_event_id {
        sink.store()
            .inject_failure(event_id, "ProvisionedThroughputExceededException");
    }

    let options = ReplayOptions {
        passes: cli.passes.max(1),
        inspect_after_first_pass: cli.inspect.then(|| Utc::now().to_rfc3339()),
    };

    match replay_delivery(&sink, &event, &options) {
        Ok(responses) => {
            println!(
                "{}",
                json!({
                    "responses": responses,
                    "stored_items": sink.store().len(),
                })
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
