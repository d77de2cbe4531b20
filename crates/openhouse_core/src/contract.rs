use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hash key attribute shared by every table.
pub const KEY_ATTRIBUTE: &str = "uuid";
/// Counter attribute on the attendee tables.
pub const ATTENDEES_ATTRIBUTE: &str = "attendees";
/// Stored in place of an empty `room`; the table rejects empty strings.
pub const EMPTY_STRING_PLACEHOLDER: &str = "#EMPTY_STRING#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Area,
    Building,
    Eatery,
    Event,
    OpenHouse,
}

impl EntityKind {
    /// Lower-case name used in batch-index messages ("for area with index 2").
    pub fn label(self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Building => "building",
            Self::Eatery => "eatery",
            Self::Event => "event",
            Self::OpenHouse => "open house",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Building => "Building",
            Self::Eatery => "Eatery",
            Self::Event => "Event",
            Self::OpenHouse => "Open House",
        }
    }

    pub fn not_found_message(self) -> String {
        format!("{} does not exist", self.title())
    }
}

/// A persisted entity: the generated identifier plus the validated fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record<T> {
    pub uuid: String,
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Record<T> {
    pub fn new(uuid: impl Into<String>, fields: T) -> Self {
        Self {
            uuid: uuid.into(),
            fields,
        }
    }

    pub fn generate(fields: T) -> Self {
        Self::new(Uuid::new_v4().to_string(), fields)
    }
}

/// List/create view of entities that own an attendee counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WithAttendees<T> {
    #[serde(flatten)]
    pub record: Record<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendeeCounter {
    pub uuid: String,
    pub attendees: u64,
}

impl AttendeeCounter {
    pub fn zeroed(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            attendees: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Area {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Building {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Eatery {
    pub name: String,
    pub open_time: String,
    pub close_time: String,
    pub building: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub area: String,
    pub building: String,
    pub room: String,
    pub open_house: String,
    pub start_time: String,
    pub end_time: String,
}

impl Event {
    /// Swaps an empty `room` for [`EMPTY_STRING_PLACEHOLDER`] before a write.
    pub fn to_storage(mut self) -> Self {
        if self.room.is_empty() {
            self.room = EMPTY_STRING_PLACEHOLDER.to_string();
        }
        self
    }

    /// Inverse of [`Event::to_storage`], applied to every record read back.
    pub fn from_storage(mut self) -> Self {
        if self.room == EMPTY_STRING_PLACEHOLDER {
            self.room.clear();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenHouse {
    pub name: String,
    pub date: u64,
    pub info: String,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_event(room: &str) -> Event {
        Event {
            name: "Science Presentation".to_string(),
            description: None,
            area: "e1b0e6d0-b3b2-42bf-8d4c-9801f374989e".to_string(),
            building: "89bb0745-b18d-4b8e-913c-4c768012c14d".to_string(),
            room: room.to_string(),
            open_house: "e3a8d98f-775a-46da-b977-f2fe1fa6f360".to_string(),
            start_time: "05:00".to_string(),
            end_time: "06:00".to_string(),
        }
    }

    #[test]
    fn record_flattens_fields_next_to_uuid() {
        let record = Record::new(
            "fee567a4-c080-4ce9-8771-50aba119ecb1",
            Area {
                name: "Faculty of Testing".to_string(),
                color: "#000".to_string(),
            },
        );

        assert_eq!(
            serde_json::to_value(&record).expect("record should serialize"),
            json!({
                "uuid": "fee567a4-c080-4ce9-8771-50aba119ecb1",
                "name": "Faculty of Testing",
                "color": "#000",
            })
        );
    }

    #[test]
    fn generated_records_use_hyphenated_v4_ids() {
        let record = Record::generate(Area {
            name: "Faculty of Testing".to_string(),
            color: "#000".to_string(),
        });

        assert_eq!(record.uuid.len(), 36);
        let parsed = Uuid::parse_str(&record.uuid).expect("generated uuid should parse");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn event_uses_camel_case_and_omits_missing_description() {
        let value = serde_json::to_value(sample_event("2300")).expect("event should serialize");

        assert_eq!(value["openHouse"], json!("e3a8d98f-775a-46da-b977-f2fe1fa6f360"));
        assert_eq!(value["startTime"], json!("05:00"));
        assert!(value.get("description").is_none());
    }

    #[test]
    fn empty_room_is_replaced_for_storage_and_restored_on_read() {
        let stored = sample_event("").to_storage();
        assert_eq!(stored.room, EMPTY_STRING_PLACEHOLDER);
        assert_eq!(stored.from_storage().room, "");

        let untouched = sample_event("2300").to_storage();
        assert_eq!(untouched.room, "2300");
    }

    #[test]
    fn attendees_are_skipped_when_unknown() {
        let listed = WithAttendees {
            record: Record::new(
                "db028071-7e1d-4d6b-8999-d3111b558f8d",
                OpenHouse {
                    name: "Fall Open House 2020".to_string(),
                    date: 1_579_660_681,
                    info: "Important Details".to_string(),
                    visible: false,
                },
            ),
            attendees: None,
        };

        let value = serde_json::to_value(&listed).expect("open house should serialize");
        assert!(value.get("attendees").is_none());
        assert_eq!(value["date"], json!(1_579_660_681u64));
    }
}
