use alert_sink_core::config::SinkConfig;
use alert_sink_core::contract::{DeliveryResponse, OutputDeliveryEvent};
use alert_sink_lambda::adapters::aws::{build_alert_sink, AwsAlertSink};
use alert_sink_lambda::observability::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{error, info};

async fn handle_request(
    event: LambdaEvent<OutputDeliveryEvent>,
    sink: &AwsAlertSink,
) -> Result<DeliveryResponse, Error> {
    sink.handle_delivery(&event.payload).map_err(|batch_error| {
        // The platform discards the response of a failed invocation and
        // redelivers the batch.
        error!(
            component = "save_alert",
            event = "invocation_failed",
            request_id = %event.context.request_id,
            response = %serde_json::to_string(batch_error.response()).unwrap_or_default(),
        );
        Error::from(batch_error)
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = SinkConfig::from_env().inspect_err(|config_error| {
        error!(
            component = "save_alert",
            event = "startup_failed",
            error = %config_error,
        );
    })?;
    let sink = build_alert_sink(&config).await;
    info!(
        component = "save_alert",
        event = "startup",
        table_name = sink.store().table_name(),
        topic_arn = sink.notifier().topic_arn(),
    );

    let sink = &sink;
    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, sink).await
    }))
    .await
}
