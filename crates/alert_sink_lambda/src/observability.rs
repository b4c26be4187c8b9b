use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// JSON log lines on stderr, filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; only the first call installs the subscriber.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
