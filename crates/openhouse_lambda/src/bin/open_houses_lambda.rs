use lambda_runtime::{service_fn, Error, LambdaEvent};
use openhouse_lambda::handlers::open_houses::handle_open_houses_event;
use openhouse_lambda::runtime::{connect_tables, init_tracing, LambdaConfig};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    let config = LambdaConfig::from_env();
    let tables = connect_tables(&config).await;
    let (tables, origin) = (&tables, config.origin.as_str());

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<_, Error>(handle_open_houses_event(event.payload, tables, origin).await)
    }))
    .await
}
