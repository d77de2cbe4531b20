use async_trait::async_trait;
use openhouse_core::contract::{Eatery, EntityKind, Record};
use openhouse_core::validation::Schema;
use serde_json::Value;

use super::error::HandlerError;
use super::references::{ensure_found, ensure_referenced, RecordLookup};
use super::request::{ApiGatewayRequest, Method};
use super::response::{respond, ApiGatewayResponse, Reply};
use super::submission::Submission;
use crate::adapters::document_store::StoreError;

#[async_trait]
pub trait EateryStore: RecordLookup {
    async fn scan_eateries(&self) -> Result<Vec<Record<Eatery>>, StoreError>;

    async fn create_eateries(&self, eateries: &[Record<Eatery>]) -> Result<(), StoreError>;

    async fn put_eatery(&self, eatery: &Record<Eatery>) -> Result<(), StoreError>;

    async fn delete_eatery(&self, uuid: &str) -> Result<(), StoreError>;
}

pub async fn handle_eateries_event<S: EateryStore + ?Sized>(
    event: Value,
    store: &S,
    origin: &str,
) -> ApiGatewayResponse {
    respond(dispatch(event, store).await, origin)
}

async fn dispatch<S: EateryStore + ?Sized>(event: Value, store: &S) -> Result<Reply, HandlerError> {
    let request = ApiGatewayRequest::from_event(event)?;
    tracing::info!(method = %request.http_method, "eateries request");

    match request.method() {
        Method::Get => Reply::json(200, store.scan_eateries().await?),
        Method::Post => create_eateries(store, request.json_body()?).await,
        Method::Put => {
            let uuid = request.require_uuid()?;
            update_eatery(store, uuid, request.json_body()?).await
        }
        Method::Delete => {
            let uuid = request.require_uuid()?;
            store.delete_eatery(uuid).await?;
            tracing::info!(uuid, "deleted eatery");
            Ok(Reply::ok())
        }
        Method::Other => Err(HandlerError::MethodNotAllowed),
    }
}

async fn create_eateries<S: EateryStore + ?Sized>(
    store: &S,
    body: Value,
) -> Result<Reply, HandlerError> {
    let submission = Submission::from_body(body);

    let mut created = Vec::with_capacity(submission.len());
    for (index, element) in submission.elements() {
        let eatery: Eatery = Submission::validate(index, element)?;
        ensure_referenced(store, EntityKind::Building, &eatery.building)
            .await
            .map_err(|error| error.at_index(EntityKind::Eatery, index))?;
        created.push(Record::generate(eatery));
    }

    store.create_eateries(&created).await?;
    tracing::info!(count = created.len(), "created eateries");
    Reply::json(201, submission.shape(created)?)
}

async fn update_eatery<S: EateryStore + ?Sized>(
    store: &S,
    uuid: &str,
    body: Value,
) -> Result<Reply, HandlerError> {
    ensure_found(store, EntityKind::Eatery, uuid).await?;

    let eatery = Eatery::validate(&body)?;
    ensure_referenced(store, EntityKind::Building, &eatery.building).await?;
    store.put_eatery(&Record::new(uuid, eatery)).await?;
    tracing::info!(uuid, "updated eatery");
    Ok(Reply::ok())
}
