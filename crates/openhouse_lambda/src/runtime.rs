//! Process bootstrap shared by the Lambda binaries: environment
//! configuration, structured logging and the DynamoDB-backed store.

use openhouse_core::tables::TableNames;
use tracing_subscriber::EnvFilter;

use crate::adapters::dynamo::DynamoStore;
use crate::adapters::tables::StoreTables;

pub const ENDPOINT_OVERRIDE_VAR: &str = "ENDPOINT_OVERRIDE";
pub const ORIGIN_VAR: &str = "ORIGIN";
pub const DEFAULT_ORIGIN: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaConfig {
    pub tables: TableNames,
    /// DynamoDB endpoint, set when running against DynamoDB Local.
    pub endpoint_override: Option<String>,
    /// Value of the `Access-Control-Allow-Origin` response header.
    pub origin: String,
}

impl LambdaConfig {
    /// Reads the process environment after loading a `.env` file if present.
    pub fn from_env() -> Self {
        // Missing .env is the normal case in Lambda.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            tables: TableNames::from_lookup(&lookup),
            endpoint_override: non_blank(ENDPOINT_OVERRIDE_VAR),
            origin: non_blank(ORIGIN_VAR).unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
        }
    }
}

/// JSON logs filtered by `RUST_LOG` (default `info`). CloudWatch adds its
/// own timestamps.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, warm reuse) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init();
}

pub async fn dynamo_client(endpoint_override: Option<&str>) -> aws_sdk_dynamodb::Client {
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
    if let Some(endpoint) = endpoint_override {
        builder = builder.endpoint_url(endpoint);
    }
    aws_sdk_dynamodb::Client::from_conf(builder.build())
}

pub async fn connect_tables(config: &LambdaConfig) -> StoreTables<DynamoStore> {
    let client = dynamo_client(config.endpoint_override.as_deref()).await;
    tracing::info!(
        endpoint_override = config.endpoint_override.as_deref(),
        "connected dynamodb client"
    );
    StoreTables::new(DynamoStore::new(client), config.tables.clone())
}
