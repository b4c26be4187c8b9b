use std::collections::HashMap;

use alert_sink_core::event::AlertEvent;
use alert_sink_core::item_key::{put_condition_expression, ItemAttribute};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_dynamodb::types::AttributeValue;

use crate::adapters::event_store::{
    outcome_from_error_code, EventStore, PersistError, PersistOutcome, TRANSPORT_ERROR,
};

pub struct DynamoDbEventStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoDbEventStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl EventStore for DynamoDbEventStore {
    fn put_if_absent(&self, event: &AlertEvent) -> Result<PersistOutcome, PersistError> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let item = event_item(event);
        let key = event.key();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let result = client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(item))
                    .condition_expression(put_condition_expression())
                    .send()
                    .await;

                match result {
                    Ok(_) => Ok(PersistOutcome::Inserted),
                    Err(error) => {
                        let code = match error.as_service_error() {
                            Some(service_error) => service_error
                                .code()
                                .unwrap_or("UnknownServiceError")
                                .to_string(),
                            None => TRANSPORT_ERROR.to_string(),
                        };
                        let message = DisplayErrorContext(&error).to_string();
                        outcome_from_error_code(key, &code, &message)
                    }
                }
            })
        })
    }
}

/// Every event field becomes a string attribute, empty strings included.
pub fn event_item(event: &AlertEvent) -> HashMap<String, AttributeValue> {
    ItemAttribute::ALL
        .iter()
        .map(|attribute| {
            (
                attribute.as_str().to_string(),
                AttributeValue::S(event.attribute(*attribute).to_string()),
            )
        })
        .collect()
}
