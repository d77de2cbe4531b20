use std::collections::HashMap;

use async_trait::async_trait;
use openhouse_core::contract::{AttendeeCounter, EntityKind, OpenHouse, Record, WithAttendees};
use openhouse_core::validation::Schema;
use serde_json::Value;

use super::cascade::{cascade_events, EventCascade};
use super::error::HandlerError;
use super::references::{ensure_found, RecordLookup};
use super::request::{ApiGatewayRequest, Method};
use super::response::{respond, ApiGatewayResponse, Reply};
use super::submission::Submission;
use crate::adapters::document_store::StoreError;

#[async_trait]
pub trait OpenHouseStore: EventCascade + RecordLookup {
    async fn scan_open_houses(&self) -> Result<Vec<Record<OpenHouse>>, StoreError>;

    async fn get_open_house_attendees(
        &self,
        uuids: &[String],
    ) -> Result<Vec<AttendeeCounter>, StoreError>;

    async fn create_open_houses(&self, open_houses: &[Record<OpenHouse>]) -> Result<(), StoreError>;

    async fn create_open_house_attendees(
        &self,
        counters: &[AttendeeCounter],
    ) -> Result<(), StoreError>;

    async fn put_open_house(&self, open_house: &Record<OpenHouse>) -> Result<(), StoreError>;

    async fn delete_open_house(&self, uuid: &str) -> Result<(), StoreError>;

    async fn delete_open_house_attendees(&self, uuid: &str) -> Result<(), StoreError>;
}

pub async fn handle_open_houses_event<S: OpenHouseStore + ?Sized>(
    event: Value,
    store: &S,
    origin: &str,
) -> ApiGatewayResponse {
    respond(dispatch(event, store).await, origin)
}

async fn dispatch<S: OpenHouseStore + ?Sized>(
    event: Value,
    store: &S,
) -> Result<Reply, HandlerError> {
    let request = ApiGatewayRequest::from_event(event)?;
    tracing::info!(method = %request.http_method, "open houses request");

    match request.method() {
        Method::Get => list_open_houses(store).await,
        Method::Post => create_open_houses(store, request.json_body()?).await,
        Method::Put => {
            let uuid = request.require_uuid()?;
            update_open_house(store, uuid, request.json_body()?).await
        }
        Method::Delete => delete_open_house(store, request.require_uuid()?).await,
        Method::Other => Err(HandlerError::MethodNotAllowed),
    }
}

async fn list_open_houses<S: OpenHouseStore + ?Sized>(store: &S) -> Result<Reply, HandlerError> {
    let open_houses = store.scan_open_houses().await?;
    if open_houses.is_empty() {
        return Reply::json(200, open_houses);
    }

    let uuids: Vec<String> = open_houses
        .iter()
        .map(|open_house| open_house.uuid.clone())
        .collect();
    let counts: HashMap<String, u64> = store
        .get_open_house_attendees(&uuids)
        .await?
        .into_iter()
        .map(|counter| (counter.uuid, counter.attendees))
        .collect();

    let listed: Vec<WithAttendees<OpenHouse>> = open_houses
        .into_iter()
        .map(|record| WithAttendees {
            attendees: counts.get(&record.uuid).copied(),
            record,
        })
        .collect();
    Reply::json(200, listed)
}

async fn create_open_houses<S: OpenHouseStore + ?Sized>(
    store: &S,
    body: Value,
) -> Result<Reply, HandlerError> {
    let submission = Submission::from_body(body);

    let mut created = Vec::with_capacity(submission.len());
    for (index, element) in submission.elements() {
        let open_house: OpenHouse = Submission::validate(index, element)?;
        created.push(Record::generate(open_house));
    }

    let counters: Vec<AttendeeCounter> = created
        .iter()
        .map(|open_house| AttendeeCounter::zeroed(open_house.uuid.clone()))
        .collect();
    store.create_open_houses(&created).await?;
    store.create_open_house_attendees(&counters).await?;
    tracing::info!(count = created.len(), "created open houses");

    let listed: Vec<WithAttendees<OpenHouse>> = created
        .into_iter()
        .map(|record| WithAttendees {
            record,
            attendees: Some(0),
        })
        .collect();
    Reply::json(201, submission.shape(listed)?)
}

async fn update_open_house<S: OpenHouseStore + ?Sized>(
    store: &S,
    uuid: &str,
    body: Value,
) -> Result<Reply, HandlerError> {
    ensure_found(store, EntityKind::OpenHouse, uuid).await?;

    let open_house = OpenHouse::validate(&body)?;
    store.put_open_house(&Record::new(uuid, open_house)).await?;
    tracing::info!(uuid, "updated open house");
    Ok(Reply::ok())
}

async fn delete_open_house<S: OpenHouseStore + ?Sized>(
    store: &S,
    uuid: &str,
) -> Result<Reply, HandlerError> {
    cascade_events(store, EntityKind::OpenHouse, uuid).await?;
    store.delete_open_house(uuid).await?;
    store.delete_open_house_attendees(uuid).await?;
    tracing::info!(uuid, "deleted open house");
    Ok(Reply::ok())
}
