//! Creates every open house table against a local DynamoDB endpoint.

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use openhouse_core::contract::KEY_ATTRIBUTE;
use openhouse_core::tables::TableKind;
use openhouse_lambda::runtime::{dynamo_client, init_tracing, LambdaConfig};

const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:8000";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();
    let config = LambdaConfig::from_env();
    let endpoint = config
        .endpoint_override
        .clone()
        .unwrap_or_else(|| DEFAULT_LOCAL_ENDPOINT.to_string());
    let client = dynamo_client(Some(&endpoint)).await;

    let existing = client.list_tables().send().await?.table_names().to_vec();

    for kind in TableKind::ALL {
        let name = config.tables.get(kind);
        if existing.iter().any(|table| table == name) {
            tracing::info!(table = name, "table already exists");
            continue;
        }

        client
            .create_table()
            .table_name(name)
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(KEY_ATTRIBUTE)
                    .attribute_type(ScalarAttributeType::S)
                    .build()?,
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(KEY_ATTRIBUTE)
                    .key_type(KeyType::Hash)
                    .build()?,
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await?;
        tracing::info!(table = name, endpoint = %endpoint, "created table");
    }

    Ok(())
}
