use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeValue, DeleteRequest, KeysAndAttributes, PutRequest, ReturnValue, WriteRequest,
};
use aws_sdk_dynamodb::Client;

use super::attribute::{attributes_to_item, item_to_attributes, key, AttributeMap};
use super::document_store::{DocumentStore, Item, StoreError};

/// [`DocumentStore`] backed by DynamoDB tables with a string `uuid` hash key.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn batch_write(&self, table: &str, requests: Vec<WriteRequest>) -> Result<(), StoreError> {
        let output = self
            .client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(backend_error)?;

        let unprocessed = output
            .unprocessed_items()
            .and_then(|tables| tables.get(table))
            .map_or(0, Vec::len);
        if unprocessed > 0 {
            return Err(StoreError::Unprocessed {
                table: table.to_string(),
                count: unprocessed,
            });
        }
        Ok(())
    }

    async fn update_counter(
        &self,
        table: &str,
        uuid: &str,
        attribute: &str,
        expression: &str,
        condition: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut request = self
            .client
            .update_item()
            .table_name(table)
            .set_key(Some(key(uuid)))
            .update_expression(expression)
            .expression_attribute_names("#count", attribute)
            .expression_attribute_values(":step", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::None);
        if let Some(condition) = condition {
            request = request
                .condition_expression(condition)
                .expression_attribute_values(":min", AttributeValue::N("0".to_string()));
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(error)
                if error
                    .as_service_error()
                    .is_some_and(|service| service.is_conditional_check_failed_exception()) =>
            {
                Err(StoreError::ConditionFailed {
                    table: table.to_string(),
                })
            }
            Err(error) => Err(backend_error(error)),
        }
    }
}

#[async_trait]
impl DocumentStore for DynamoStore {
    async fn scan(&self, table: &str) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<AttributeMap> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(backend_error)?;

            for attributes in output.items() {
                items.push(decode(table, attributes)?);
            }

            match output.last_evaluated_key() {
                Some(last_key) if !last_key.is_empty() => start_key = Some(last_key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn get(&self, table: &str, uuid: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(key(uuid)))
            .send()
            .await
            .map_err(backend_error)?;

        output.item().map(|attributes| decode(table, attributes)).transpose()
    }

    async fn put(&self, table: &str, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(encode(table, item)?))
            .send()
            .await
            .map(|_| ())
            .map_err(backend_error)
    }

    async fn delete(&self, table: &str, uuid: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key(uuid)))
            .send()
            .await
            .map(|_| ())
            .map_err(backend_error)
    }

    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<(), StoreError> {
        let requests = items
            .into_iter()
            .map(|item| {
                let put = PutRequest::builder()
                    .set_item(Some(encode(table, item)?))
                    .build()
                    .map_err(backend_error)?;
                Ok::<_, StoreError>(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.batch_write(table, requests).await
    }

    async fn batch_delete(&self, table: &str, uuids: Vec<String>) -> Result<(), StoreError> {
        let requests = uuids
            .iter()
            .map(|uuid| {
                let delete = DeleteRequest::builder()
                    .set_key(Some(key(uuid)))
                    .build()
                    .map_err(backend_error)?;
                Ok::<_, StoreError>(WriteRequest::builder().delete_request(delete).build())
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.batch_write(table, requests).await
    }

    async fn batch_get(&self, table: &str, uuids: Vec<String>) -> Result<Vec<Item>, StoreError> {
        let keys = KeysAndAttributes::builder()
            .set_keys(Some(uuids.iter().map(|uuid| key(uuid)).collect()))
            .build()
            .map_err(backend_error)?;

        let output = self
            .client
            .batch_get_item()
            .request_items(table, keys)
            .send()
            .await
            .map_err(backend_error)?;

        let unprocessed = output
            .unprocessed_keys()
            .and_then(|tables| tables.get(table))
            .map_or(0, |pending| pending.keys().len());
        if unprocessed > 0 {
            return Err(StoreError::Unprocessed {
                table: table.to_string(),
                count: unprocessed,
            });
        }

        output
            .responses()
            .and_then(|tables| tables.get(table))
            .map(|rows| rows.iter().map(|attributes| decode(table, attributes)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn increment(&self, table: &str, uuid: &str, attribute: &str) -> Result<(), StoreError> {
        self.update_counter(table, uuid, attribute, "SET #count = #count + :step", None)
            .await
    }

    async fn decrement_above_zero(
        &self,
        table: &str,
        uuid: &str,
        attribute: &str,
    ) -> Result<(), StoreError> {
        self.update_counter(
            table,
            uuid,
            attribute,
            "SET #count = #count - :step",
            Some("#count > :min"),
        )
        .await
    }
}

fn decode(table: &str, attributes: &AttributeMap) -> Result<Item, StoreError> {
    attributes_to_item(attributes).map_err(|error| StoreError::Decode {
        table: table.to_string(),
        message: error.to_string(),
    })
}

fn encode(table: &str, item: Item) -> Result<AttributeMap, StoreError> {
    item_to_attributes(item).map_err(|error| StoreError::Encode {
        table: table.to_string(),
        message: error.to_string(),
    })
}

fn backend_error<E>(error: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::Backend(DisplayErrorContext(&error).to_string())
}
