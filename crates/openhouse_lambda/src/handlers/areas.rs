use async_trait::async_trait;
use openhouse_core::contract::{Area, EntityKind, Record};
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
pub trait AreaStore: EventCascade + RecordLookup {
    async fn scan_areas(&self) -> Result<Vec<Record<Area>>, StoreError>;

    async fn create_areas(&self, areas: &[Record<Area>]) -> Result<(), StoreError>;

    async fn put_area(&self, area: &Record<Area>) -> Result<(), StoreError>;

    async fn delete_area(&self, uuid: &str) -> Result<(), StoreError>;
}

pub async fn handle_areas_event<S: AreaStore + ?Sized>(
    event: Value,
    store: &S,
    origin: &str,
) -> ApiGatewayResponse {
    respond(dispatch(event, store).await, origin)
}

async fn dispatch<S: AreaStore + ?Sized>(event: Value, store: &S) -> Result<Reply, HandlerError> {
    let request = ApiGatewayRequest::from_event(event)?;
    tracing::info!(method = %request.http_method, "areas request");

    match request.method() {
        Method::Get => Reply::json(200, store.scan_areas().await?),
        Method::Post => create_areas(store, request.json_body()?).await,
        Method::Put => {
            let uuid = request.require_uuid()?;
            update_area(store, uuid, request.json_body()?).await
        }
        Method::Delete => delete_area(store, request.require_uuid()?).await,
        Method::Other => Err(HandlerError::MethodNotAllowed),
    }
}

async fn create_areas<S: AreaStore + ?Sized>(store: &S, body: Value) -> Result<Reply, HandlerError> {
    let submission = Submission::from_body(body);

    let mut created = Vec::with_capacity(submission.len());
    for (index, element) in submission.elements() {
        let area: Area = Submission::validate(index, element)?;
        created.push(Record::generate(area));
    }

    store.create_areas(&created).await?;
    tracing::info!(count = created.len(), "created areas");
    Reply::json(201, submission.shape(created)?)
}

async fn update_area<S: AreaStore + ?Sized>(
    store: &S,
    uuid: &str,
    body: Value,
) -> Result<Reply, HandlerError> {
    ensure_found(store, EntityKind::Area, uuid).await?;
    let area = Area::validate(&body)?;
    store.put_area(&Record::new(uuid, area)).await?;
    tracing::info!(uuid, "updated area");
    Ok(Reply::ok())
}

async fn delete_area<S: AreaStore + ?Sized>(store: &S, uuid: &str) -> Result<Reply, HandlerError> {
    cascade_events(store, EntityKind::Area, uuid).await?;
    store.delete_area(uuid).await?;
    tracing::info!(uuid, "deleted area");
    Ok(Reply::ok())
}

#[cfg(test)]
mod tests {
    use openhouse_core::tables::TableKind;
    use serde_json::json;

    use super::*;
    use crate::adapters::memory::StoreCall;
    use crate::handlers::response::ALLOW_ORIGIN_HEADER;
    use crate::handlers::test_support::*;

    #[tokio::test]
    async fn get_returns_every_area_with_cors_header() {
        let tables = tables();
        tables
            .store()
            .seed(TableKind::Areas.default_name(), vec![area_item(AREA_UUID)]);

        let response = handle_areas_event(get_request(), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers[ALLOW_ORIGIN_HEADER], ORIGIN);
        assert_eq!(response.json_body(), Some(json!([area_item(AREA_UUID)])));
    }

    #[tokio::test]
    async fn post_single_area_returns_created_record() {
        let tables = tables();

        let response = handle_areas_event(
            post_request(json!({"name": "Faculty of Testing", "color": "#000"})),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 201);
        let body = response.json_body().expect("body should be json");
        assert!(is_v4_uuid(&body["uuid"]));
        assert_eq!(body["name"], "Faculty of Testing");
        assert_eq!(body["color"], "#000");
        assert_eq!(
            writes(tables.store()),
            vec![StoreCall::BatchPut {
                table: table_name(TableKind::Areas),
                count: 1,
            }]
        );
    }

    #[tokio::test]
    async fn post_array_returns_records_in_input_order() {
        let tables = tables();

        let response = handle_areas_event(
            post_request(json!([
                {"name": "Faculty of Testing", "color": "#000"},
                {"name": "Faculty of Mocking", "color": "#00ff00"},
            ])),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 201);
        let body = response.json_body().expect("body should be json");
        let names: Vec<&str> = body
            .as_array()
            .expect("batch create should return an array")
            .iter()
            .filter_map(|area| area["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Faculty of Testing", "Faculty of Mocking"]);
        assert_eq!(tables.store().items(TableKind::Areas.default_name()).len(), 2);
    }

    #[tokio::test]
    async fn post_with_invalid_element_writes_nothing() {
        let tables = tables();

        let response = handle_areas_event(
            post_request(json!([
                {"name": "Faculty of Testing", "color": "#000"},
                {"name": "Faculty of Mocking", "color": "green"},
            ])),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.json_body(),
            Some(json!({
                "error": "\"color\" with value \"green\" fails to match the Hex Color Code pattern for area with index 1"
            }))
        );
        assert!(writes(tables.store()).is_empty());
    }

    #[tokio::test]
    async fn post_with_malformed_json_is_rejected() {
        let tables = tables();

        let response = handle_areas_event(
            json!({"httpMethod": "POST", "body": "{\"name\":"}),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 400);
        assert!(tables.store().calls().is_empty());
    }

    #[tokio::test]
    async fn put_without_uuid_makes_no_store_calls() {
        let tables = tables();

        let response = handle_areas_event(
            json!({"httpMethod": "PUT", "body": "{}"}),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.json_body(),
            Some(json!({"error": "Missing UUID in URL path"}))
        );
        assert!(tables.store().calls().is_empty());
    }

    #[tokio::test]
    async fn put_unknown_area_is_not_found_before_validation() {
        let tables = tables();

        let response = handle_areas_event(
            put_request(AREA_UUID, json!({"color": "not a color"})),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.json_body(),
            Some(json!({"error": "Area does not exist"}))
        );
    }

    #[tokio::test]
    async fn put_replaces_existing_area() {
        let tables = tables();
        tables
            .store()
            .seed(TableKind::Areas.default_name(), vec![area_item(AREA_UUID)]);

        let response = handle_areas_event(
            put_request(AREA_UUID, json!({"name": "Renamed", "color": "#abcdef"})),
            &tables,
            ORIGIN,
        )
        .await;

        assert_eq!(response.status_code, 200);
        assert!(response.body.is_none());
        let stored = tables
            .store()
            .item(TableKind::Areas.default_name(), AREA_UUID)
            .expect("area should still exist");
        assert_eq!(stored["name"], "Renamed");
        assert_eq!(stored["color"], "#abcdef");
    }

    #[tokio::test]
    async fn delete_cascades_to_referencing_events_and_counters() {
        let tables = tables();
        let store = tables.store();
        store.seed(TableKind::Areas.default_name(), vec![area_item(AREA_UUID)]);
        store.seed(
            TableKind::Events.default_name(),
            vec![
                event_item(EVENT_UUID, AREA_UUID, BUILDING_UUID, OPEN_HOUSE_UUID),
                event_item(OTHER_EVENT_UUID, "someone-else", BUILDING_UUID, OPEN_HOUSE_UUID),
            ],
        );
        store.seed(
            TableKind::EventAttendees.default_name(),
            vec![counter_item(EVENT_UUID, 4)],
        );

        let response = handle_areas_event(delete_request(AREA_UUID), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            batch_deleted(store, TableKind::Events),
            vec![vec![EVENT_UUID.to_string()]]
        );
        assert_eq!(
            batch_deleted(store, TableKind::EventAttendees),
            vec![vec![EVENT_UUID.to_string()]]
        );
        assert!(store.item(TableKind::Areas.default_name(), AREA_UUID).is_none());
        assert_eq!(store.items(TableKind::Events.default_name()).len(), 1);
    }

    #[tokio::test]
    async fn delete_without_dependents_skips_batch_delete() {
        let tables = tables();

        let response = handle_areas_event(delete_request(AREA_UUID), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            writes(tables.store()),
            vec![StoreCall::Delete {
                table: table_name(TableKind::Areas),
                uuid: AREA_UUID.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn store_failure_returns_raw_message() {
        let tables = tables();
        tables
            .store()
            .fail_table(TableKind::Areas.default_name(), "testError");

        let response = handle_areas_event(get_request(), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.json_body(), Some(json!({"error": "testError"})));
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected_without_body() {
        let tables = tables();

        let response =
            handle_areas_event(json!({"httpMethod": "PATCH"}), &tables, ORIGIN).await;

        assert_eq!(response.status_code, 405);
        assert!(response.body.is_none());
        assert_eq!(response.headers[ALLOW_ORIGIN_HEADER], ORIGIN);
    }
}
