use std::collections::HashMap;

use async_trait::async_trait;
use openhouse_core::contract::{AttendeeCounter, EntityKind, Event, Record, WithAttendees};
use openhouse_core::validation::Schema;
use serde_json::Value;

use super::error::HandlerError;
use super::references::{ensure_found, ensure_referenced, RecordLookup};
use super::request::{ApiGatewayRequest, Method};
use super::response::{respond, ApiGatewayResponse, Reply};
use super::submission::Submission;
use crate::adapters::document_store::StoreError;

/// Event records plus their attendee counters. Implementations store an
/// empty `room` as a placeholder and hand it back as an empty string.
#[async_trait]
pub trait EventStore: RecordLookup {
    async fn scan_events(&self) -> Result<Vec<Record<Event>>, StoreError>;

    async fn get_event_attendees(&self, uuids: &[String]) -> Result<Vec<AttendeeCounter>, StoreError>;

    async fn create_events(&self, events: &[Record<Event>]) -> Result<(), StoreError>;

    async fn create_event_attendees(&self, counters: &[AttendeeCounter]) -> Result<(), StoreError>;

    async fn put_event(&self, event: &Record<Event>) -> Result<(), StoreError>;

    async fn delete_event(&self, uuid: &str) -> Result<(), StoreError>;

    async fn delete_event_attendees(&self, uuid: &str) -> Result<(), StoreError>;
}

pub async fn handle_events_event<S: EventStore + ?Sized>(
    event: Value,
    store: &S,
    origin: &str,
) -> ApiGatewayResponse {
    respond(dispatch(event, store).await, origin)
}

async fn dispatch<S: EventStore + ?Sized>(event: Value, store: &S) -> Result<Reply, HandlerError> {
    let request = ApiGatewayRequest::from_event(event)?;
    tracing::info!(method = %request.http_method, "events request");

    match request.method() {
        Method::Get => list_events(store).await,
        Method::Post => create_events(store, request.json_body()?).await,
        Method::Put => {
            let uuid = request.require_uuid()?;
            update_event(store, uuid, request.json_body()?).await
        }
        Method::Delete => {
            let uuid = request.require_uuid()?;
            store.delete_event(uuid).await?;
            store.delete_event_attendees(uuid).await?;
            tracing::info!(uuid, "deleted event");
            Ok(Reply::ok())
        }
        Method::Other => Err(HandlerError::MethodNotAllowed),
    }
}

async fn list_events<S: EventStore + ?Sized>(store: &S) -> Result<Reply, HandlerError> {
    let events = store.scan_events().await?;
    if events.is_empty() {
        return Reply::json(200, events);
    }

    let uuids: Vec<String> = events.iter().map(|event| event.uuid.clone()).collect();
    let counts: HashMap<String, u64> = store
        .get_event_attendees(&uuids)
        .await?
        .into_iter()
        .map(|counter| (counter.uuid, counter.attendees))
        .collect();

    let listed: Vec<WithAttendees<Event>> = events
        .into_iter()
        .map(|record| WithAttendees {
            attendees: counts.get(&record.uuid).copied(),
            record,
        })
        .collect();
    Reply::json(200, listed)
}

/// Open house, then area, then building; the first missing one is reported.
async fn ensure_parents<S: EventStore + ?Sized>(store: &S, event: &Event) -> Result<(), HandlerError> {
    ensure_referenced(store, EntityKind::OpenHouse, &event.open_house).await?;
    ensure_referenced(store, EntityKind::Area, &event.area).await?;
    ensure_referenced(store, EntityKind::Building, &event.building).await
}

async fn create_events<S: EventStore + ?Sized>(store: &S, body: Value) -> Result<Reply, HandlerError> {
    let submission = Submission::from_body(body);

    let mut created = Vec::with_capacity(submission.len());
    for (index, element) in submission.elements() {
        let event: Event = Submission::validate(index, element)?;
        ensure_parents(store, &event)
            .await
            .map_err(|error| error.at_index(EntityKind::Event, index))?;
        created.push(Record::generate(event));
    }

    let counters: Vec<AttendeeCounter> = created
        .iter()
        .map(|event| AttendeeCounter::zeroed(event.uuid.clone()))
        .collect();
    store.create_events(&created).await?;
    store.create_event_attendees(&counters).await?;
    tracing::info!(count = created.len(), "created events");

    let listed: Vec<WithAttendees<Event>> = created
        .into_iter()
        .map(|record| WithAttendees {
            record,
            attendees: Some(0),
        })
        .collect();
    Reply::json(201, submission.shape(listed)?)
}

async fn update_event<S: EventStore + ?Sized>(
    store: &S,
    uuid: &str,
    body: Value,
) -> Result<Reply, HandlerError> {
    ensure_found(store, EntityKind::Event, uuid).await?;

    let event = Event::validate(&body)?;
    ensure_parents(store, &event).await?;
    store.put_event(&Record::new(uuid, event)).await?;
    tracing::info!(uuid, "updated event");
    Ok(Reply::ok())
}
