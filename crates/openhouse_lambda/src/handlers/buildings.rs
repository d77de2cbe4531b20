use async_trait::async_trait;
use openhouse_core::contract::{Building, EntityKind, Record};
use openhouse_core::validation::Schema;
use serde_json::Value;

use super::cascade::{cascade_events, referencing, DependentLinks, EventCascade};
use super::error::HandlerError;
use super::references::{ensure_found, RecordLookup};
use super::request::{ApiGatewayRequest, Method};
use super::response::{respond, ApiGatewayResponse, Reply};
use super::submission::Submission;
use crate::adapters::document_store::StoreError;

#[async_trait]
pub trait BuildingStore: EventCascade + RecordLookup {
    async fn scan_buildings(&self) -> Result<Vec<Record<Building>>, StoreError>;

    async fn create_buildings(&self, buildings: &[Record<Building>]) -> Result<(), StoreError>;

    async fn put_building(&self, building: &Record<Building>) -> Result<(), StoreError>;

    async fn delete_building(&self, uuid: &str) -> Result<(), StoreError>;

    async fn scan_eatery_links(&self) -> Result<Vec<DependentLinks>, StoreError>;

    async fn delete_eateries(&self, uuids: &[String]) -> Result<(), StoreError>;
}

pub async fn handle_buildings_event<S: BuildingStore + ?Sized>(
    event: Value,
    store: &S,
    origin: &str,
) -> ApiGatewayResponse {
    respond(dispatch(event, store).await, origin)
}

async fn dispatch<S: BuildingStore + ?Sized>(
    event: Value,
    store: &S,
) -> Result<Reply, HandlerError> {
    let request = ApiGatewayRequest::from_event(event)?;
    tracing::info!(method = %request.http_method, "buildings request");

    match request.method() {
        Method::Get => Reply::json(200, store.scan_buildings().await?),
        Method::Post => create_buildings(store, request.json_body()?).await,
        Method::Put => {
            let uuid = request.require_uuid()?;
            update_building(store, uuid, request.json_body()?).await
        }
        Method::Delete => delete_building(store, request.require_uuid()?).await,
        Method::Other => Err(HandlerError::MethodNotAllowed),
    }
}

async fn create_buildings<S: BuildingStore + ?Sized>(
    store: &S,
    body: Value,
) -> Result<Reply, HandlerError> {
    let submission = Submission::from_body(body);

    let mut created = Vec::with_capacity(submission.len());
    for (index, element) in submission.elements() {
        let building: Building = Submission::validate(index, element)?;
        created.push(Record::generate(building));
    }

    store.create_buildings(&created).await?;
    tracing::info!(count = created.len(), "created buildings");
    Reply::json(201, submission.shape(created)?)
}

async fn update_building<S: BuildingStore + ?Sized>(
    store: &S,
    uuid: &str,
    body: Value,
) -> Result<Reply, HandlerError> {
    ensure_found(store, EntityKind::Building, uuid).await?;
    let building = Building::validate(&body)?;
    store.put_building(&Record::new(uuid, building)).await?;
    tracing::info!(uuid, "updated building");
    Ok(Reply::ok())
}

/// Removes the building's events and eateries before the building itself.
async fn delete_building<S: BuildingStore + ?Sized>(
    store: &S,
    uuid: &str,
) -> Result<Reply, HandlerError> {
    cascade_events(store, EntityKind::Building, uuid).await?;

    let eateries = referencing(store.scan_eatery_links().await?, EntityKind::Building, uuid);
    if !eateries.is_empty() {
        store.delete_eateries(&eateries).await?;
        tracing::info!(uuid, deleted = eateries.len(), "cascaded eatery deletes");
    }

    store.delete_building(uuid).await?;
    tracing::info!(uuid, "deleted building");
    Ok(Reply::ok())
}

#[cfg(test)]
mod tests {
    use openhouse_core::tables::TableKind;
    use serde_json::json;

    use super::*;
    use crate::adapters::memory::StoreCall;
    use crate::handlers::test_support::*;

    fn numbered_uuid(prefix: u32, index: usize) -> String {
        format!("{prefix:08x}-0000-4000-8000-{index:012}")
    }

    #[tokio::test]
    async fn post_validates_position_bounds() {
        let tables = tables();

        let response = handle_buildings_event(
            post_request(json!({
                "name": "Engineering Building",
                "position": {"lat": 95.5, "lng": -79.25},
            })),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.json_body(),
            Some(json!({
                "error": "\"position.lat\" must be less than 90 for building with index 0"
            }))
        );
        assert!(writes(tables.store()).is_empty());
    }

    #[tokio::test]
    async fn post_creates_building_with_position() {
        let tables = tables();

        let response = handle_buildings_event(
            post_request(json!({
                "name": "Engineering Building",
                "position": {"lat": 43.5, "lng": -79.25},
            })),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 201);
        let body = response.json_body().expect("body should be json");
        assert!(is_v4_uuid(&body["uuid"]));
        assert_eq!(body["position"], json!({"lat": 43.5, "lng": -79.25}));
    }

    #[tokio::test]
    async fn put_unknown_building_is_not_found() {
        let tables = tables();

        let response = handle_buildings_event(
            put_request(
                BUILDING_UUID,
                json!({"name": "Engineering Building", "position": {"lat": 43.5, "lng": -79.25}}),
            ),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.json_body(),
            Some(json!({"error": "Building does not exist"}))
        );
        assert!(writes(tables.store()).is_empty());
    }

    #[tokio::test]
    async fn delete_cascades_events_and_eateries_in_chunks() {
        let tables = tables();
        let store = tables.store();
        store.seed(
            TableKind::Buildings.default_name(),
            vec![building_item(BUILDING_UUID)],
        );
        let events: Vec<_> = (0..30)
            .map(|index| {
                event_item(
                    &numbered_uuid(0xe, index),
                    AREA_UUID,
                    BUILDING_UUID,
                    OPEN_HOUSE_UUID,
                )
            })
            .chain([event_item(
                OTHER_EVENT_UUID,
                AREA_UUID,
                "another-building",
                OPEN_HOUSE_UUID,
            )])
            .collect();
        store.seed(TableKind::Events.default_name(), events);
        let eateries: Vec<_> = (0..3)
            .map(|index| eatery_item(&numbered_uuid(0xf, index), BUILDING_UUID))
            .chain([eatery_item(EATERY_UUID, "another-building")])
            .collect();
        store.seed(TableKind::Eateries.default_name(), eateries);

        let response =
            handle_buildings_event(delete_request(BUILDING_UUID), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 200);
        assert!(response.body.is_none());

        let event_chunks = batch_deleted(store, TableKind::Events);
        let mut chunk_sizes: Vec<usize> = event_chunks.iter().map(Vec::len).collect();
        chunk_sizes.sort_unstable();
        assert_eq!(chunk_sizes, vec![5, 25]);
        assert!(!event_chunks.concat().contains(&OTHER_EVENT_UUID.to_string()));

        let eatery_chunks = batch_deleted(store, TableKind::Eateries);
        assert_eq!(eatery_chunks.len(), 1);
        assert_eq!(eatery_chunks[0].len(), 3);

        assert_eq!(store.items(TableKind::Events.default_name()).len(), 1);
        assert_eq!(store.items(TableKind::Eateries.default_name()).len(), 1);
        assert!(store
            .item(TableKind::Buildings.default_name(), BUILDING_UUID)
            .is_none());
    }

    #[tokio::test]
    async fn delete_unknown_building_is_idempotent() {
        let tables = tables();

        let response =
            handle_buildings_event(delete_request(BUILDING_UUID), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            writes(tables.store()),
            vec![StoreCall::Delete {
                table: table_name(TableKind::Buildings),
                uuid: BUILDING_UUID.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn delete_without_uuid_makes_no_store_calls() {
        let tables = tables();

        let response =
            handle_buildings_event(json!({"httpMethod": "DELETE"}), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 400);
        assert!(tables.store().calls().is_empty());
    }

    #[tokio::test]
    async fn failed_cascade_aborts_before_parent_delete() {
        let tables = tables();
        tables
            .store()
            .fail_table(TableKind::Events.default_name(), "testError");

        let response =
            handle_buildings_event(delete_request(BUILDING_UUID), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.json_body(), Some(json!({"error": "testError"})));
        assert!(writes(tables.store()).is_empty());
    }
}
