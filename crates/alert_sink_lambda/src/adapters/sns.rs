use aws_sdk_sns::error::DisplayErrorContext;

use crate::adapters::notifier::{Notifier, PublishError, PublishReceipt};

pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsNotifier {
    pub fn new(client: aws_sdk_sns::Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }

    pub fn topic_arn(&self) -> &str {
        &self.topic_arn
    }
}

impl Notifier for SnsNotifier {
    fn publish(&self, message: &[u8]) -> Result<PublishReceipt, PublishError> {
        let client = self.client.clone();
        let topic_arn = self.topic_arn.clone();
        let body = message_body(message);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .publish()
                    .topic_arn(topic_arn)
                    .message(body)
                    .send()
                    .await
                    .map(|output| PublishReceipt {
                        message_id: output.message_id().map(str::to_string),
                    })
                    .map_err(|error| PublishError::new(DisplayErrorContext(&error).to_string()))
            })
        })
    }
}

/// SNS messages are text; payloads reaching the notifier have already been
/// decoded as JSON, so the conversion is lossless in practice.
fn message_body(message: &[u8]) -> String {
    String::from_utf8_lossy(message).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_body_is_the_original_payload() {
        let payload = br#"{"eventId":"e-1","action":"purchase"}"#;
        assert_eq!(message_body(payload), r#"{"eventId":"e-1","action":"purchase"}"#);
    }

    #[test]
    fn notifier_reports_its_topic() {
        let config = aws_sdk_sns::Config::builder()
            .behavior_version(aws_sdk_sns::config::BehaviorVersion::latest())
            .region(aws_sdk_sns::config::Region::new("us-east-1"))
            .build();
        let topic = "arn:aws:sns:us-east-1:123456789012:alerts";
        let notifier = SnsNotifier::new(aws_sdk_sns::Client::from_conf(config), topic);
        assert_eq!(notifier.topic_arn(), topic);
    }
}
