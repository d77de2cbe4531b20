use async_trait::async_trait;
use openhouse_core::tables::TableKind;
use serde_json::Value;

use super::error::HandlerError;
use super::request::{ApiGatewayRequest, Method};
use super::response::{respond, ApiGatewayResponse, Reply};
use crate::adapters::document_store::StoreError;

/// Which attendee counter table a handler instance serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Event,
    OpenHouse,
}

impl CounterKind {
    pub fn table(self) -> TableKind {
        match self {
            Self::Event => TableKind::EventAttendees,
            Self::OpenHouse => TableKind::OpenHouseAttendees,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::OpenHouse => "open house",
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            Self::Event => "Event does not exist",
            Self::OpenHouse => "Open house does not exist",
        }
    }
}

#[async_trait]
pub trait AttendeeStore: Send + Sync {
    async fn attendees_exist(&self, kind: CounterKind, uuid: &str) -> Result<bool, StoreError>;

    async fn increment_attendees(&self, kind: CounterKind, uuid: &str) -> Result<(), StoreError>;

    /// Fails with [`StoreError::ConditionFailed`] when the count is already zero.
    async fn decrement_attendees(&self, kind: CounterKind, uuid: &str) -> Result<(), StoreError>;
}

pub async fn handle_attendees_event<S: AttendeeStore + ?Sized>(
    kind: CounterKind,
    event: Value,
    store: &S,
    origin: &str,
) -> ApiGatewayResponse {
    respond(dispatch(kind, event, store).await, origin)
}

async fn dispatch<S: AttendeeStore + ?Sized>(
    kind: CounterKind,
    event: Value,
    store: &S,
) -> Result<Reply, HandlerError> {
    let request = ApiGatewayRequest::from_event(event)?;
    tracing::info!(method = %request.http_method, counter = kind.label(), "attendees request");

    match request.method() {
        Method::Post => {
            let uuid = request.require_uuid()?;
            ensure_counter(store, kind, uuid).await?;
            store.increment_attendees(kind, uuid).await?;
            Ok(Reply::ok())
        }
        Method::Delete => {
            let uuid = request.require_uuid()?;
            ensure_counter(store, kind, uuid).await?;
            match store.decrement_attendees(kind, uuid).await {
                Ok(()) => Ok(Reply::ok()),
                Err(StoreError::ConditionFailed { .. }) => {
                    tracing::info!(
                        counter = kind.label(),
                        uuid,
                        "NOTICE: attempted to decrement attendee count below 0"
                    );
                    Ok(Reply::ok())
                }
                Err(error) => Err(error.into()),
            }
        }
        Method::Get | Method::Put | Method::Other => Err(HandlerError::MethodNotAllowed),
    }
}

async fn ensure_counter<S: AttendeeStore + ?Sized>(
    store: &S,
    kind: CounterKind,
    uuid: &str,
) -> Result<(), HandlerError> {
    if store.attendees_exist(kind, uuid).await? {
        Ok(())
    } else {
        Err(HandlerError::NotFound(kind.not_found_message().to_string()))
    }
}
