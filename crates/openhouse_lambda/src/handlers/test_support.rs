use openhouse_core::tables::{TableKind, TableNames};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::adapters::memory::{MemoryStore, StoreCall};
use crate::adapters::tables::StoreTables;

pub const ORIGIN: &str = "https://openhouse.example";

pub const AREA_UUID: &str = "e1b0e6d0-b3b2-42bf-8d4c-9801f374989e";
pub const BUILDING_UUID: &str = "89bb0745-b18d-4b8e-913c-4c768012c14d";
pub const OPEN_HOUSE_UUID: &str = "e3a8d98f-775a-46da-b977-f2fe1fa6f360";
pub const EVENT_UUID: &str = "ccfb14f5-41a7-4514-9aac-28440981c21a";
pub const EATERY_UUID: &str = "fee567a4-c080-4ce9-8771-50aba119ecb1";
pub const OTHER_EVENT_UUID: &str = "4a8d2d6e-8c5c-4b7a-9d0f-2f6a1c3b5e70";

pub fn tables() -> StoreTables<MemoryStore> {
    StoreTables::new(MemoryStore::new(), TableNames::default())
}

pub fn table_name(kind: TableKind) -> String {
    kind.default_name().to_string()
}

pub fn get_request() -> Value {
    json!({"httpMethod": "GET"})
}

pub fn post_request(body: Value) -> Value {
    json!({"httpMethod": "POST", "body": body.to_string()})
}

pub fn put_request(uuid: &str, body: Value) -> Value {
    json!({
        "httpMethod": "PUT",
        "pathParameters": {"uuid": uuid},
        "body": body.to_string(),
    })
}

pub fn delete_request(uuid: &str) -> Value {
    json!({"httpMethod": "DELETE", "pathParameters": {"uuid": uuid}})
}

pub fn writes(store: &MemoryStore) -> Vec<StoreCall> {
    store
        .calls()
        .into_iter()
        .filter(StoreCall::is_write)
        .collect()
}

pub fn batch_deleted(store: &MemoryStore, kind: TableKind) -> Vec<Vec<String>> {
    store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            StoreCall::BatchDelete { table, uuids } if table == kind.default_name() => Some(uuids),
            _ => None,
        })
        .collect()
}

pub fn is_v4_uuid(value: &Value) -> bool {
    value
        .as_str()
        .filter(|text| text.len() == 36)
        .and_then(|text| Uuid::parse_str(text).ok())
        .is_some_and(|uuid| uuid.get_version_num() == 4)
}

pub fn area_item(uuid: &str) -> Value {
    json!({"uuid": uuid, "name": "Faculty of Testing", "color": "#000"})
}

pub fn building_item(uuid: &str) -> Value {
    json!({"uuid": uuid, "name": "Engineering Building", "position": {"lat": 43.5, "lng": -79.25}})
}

pub fn open_house_item(uuid: &str) -> Value {
    json!({
        "uuid": uuid,
        "name": "Fall Open House 2020",
        "date": 1_579_660_681u64,
        "info": "Important Details",
        "visible": false,
    })
}

pub fn event_item(uuid: &str, area: &str, building: &str, open_house: &str) -> Value {
    json!({
        "uuid": uuid,
        "name": "Science Presentation",
        "description": "Sciency stuff",
        "area": area,
        "building": building,
        "room": "2300",
        "openHouse": open_house,
        "startTime": "05:00",
        "endTime": "06:00",
    })
}

pub fn eatery_item(uuid: &str, building: &str) -> Value {
    json!({
        "uuid": uuid,
        "name": "Campus Cafe",
        "openTime": "8:00",
        "closeTime": "17:30",
        "building": building,
    })
}

pub fn counter_item(uuid: &str, attendees: u64) -> Value {
    json!({"uuid": uuid, "attendees": attendees})
}

/// Seeds one open house, area and building so event writes pass their
/// reference checks.
pub fn seed_event_parents(store: &MemoryStore) {
    store.seed(
        TableKind::OpenHouses.default_name(),
        vec![open_house_item(OPEN_HOUSE_UUID)],
    );
    store.seed(TableKind::Areas.default_name(), vec![area_item(AREA_UUID)]);
    store.seed(
        TableKind::Buildings.default_name(),
        vec![building_item(BUILDING_UUID)],
    );
}
