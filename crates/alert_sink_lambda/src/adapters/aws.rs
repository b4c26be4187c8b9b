use alert_sink_core::config::SinkConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::adapters::dynamodb::DynamoDbEventStore;
use crate::adapters::sns::SnsNotifier;
use crate::handlers::delivery::AlertSink;

pub type AwsAlertSink = AlertSink<DynamoDbEventStore, SnsNotifier>;

pub async fn load_sdk_config(config: &SinkConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}

/// Builds the store and notifier clients once; the returned sink is reused
/// for every invocation served by the process.
pub async fn build_alert_sink(config: &SinkConfig) -> AwsAlertSink {
    let sdk_config = load_sdk_config(config).await;
    let store = DynamoDbEventStore::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        config.table_name.clone(),
    );
    let notifier = SnsNotifier::new(
        aws_sdk_sns::Client::new(&sdk_config),
        config.topic_arn.clone(),
    );
    AlertSink::new(store, notifier)
}
