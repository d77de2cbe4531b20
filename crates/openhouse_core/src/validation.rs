//! Payload schemas for every writable entity.
//!
//! Validation runs over the raw JSON value rather than through serde so that
//! every failing field is reported, each with its own human-readable reason.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::contract::{Area, Building, Eatery, EntityKind, Event, OpenHouse, Position};

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex color pattern should compile")
});

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^(0[0-9]|1[0-9]|2[0-3]|[0-9]):[0-5][0-9]$")
        .expect("time of day pattern should compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" {}", self.field, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn from_issues(issues: Vec<FieldIssue>) -> Self {
        let message = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self { message, issues }
    }

    /// Adds the position of the failing element within a create batch.
    pub fn at_index(mut self, kind: EntityKind, index: usize) -> Self {
        self.message = format!("{} for {} with index {index}", self.message, kind.label());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }
}

/// A writable entity whose payload can be checked against a schema.
pub trait Schema: Sized {
    const KIND: EntityKind;

    fn validate(value: &Value) -> Result<Self, ValidationError>;
}

impl Schema for Area {
    const KIND: EntityKind = EntityKind::Area;

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        validate_object(value, |fields| {
            let name = fields.string("name");
            let color = fields.pattern("color", &HEX_COLOR, "Hex Color Code");
            Some(Self {
                name: name?,
                color: color?,
            })
        })
    }
}

impl Schema for Building {
    const KIND: EntityKind = EntityKind::Building;

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        validate_object(value, |fields| {
            let name = fields.string("name");
            let position = fields.nested("position", |position| {
                let lat = position.number_between("lat", -90.0, 90.0);
                let lng = position.number_between("lng", -180.0, 180.0);
                Some(Position {
                    lat: lat?,
                    lng: lng?,
                })
            });
            Some(Self {
                name: name?,
                position: position?,
            })
        })
    }
}

impl Schema for Eatery {
    const KIND: EntityKind = EntityKind::Eatery;

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        validate_object(value, |fields| {
            let name = fields.string("name");
            let open_time = fields.pattern("openTime", &TIME_OF_DAY, "HH:mm");
            let close_time = fields.pattern("closeTime", &TIME_OF_DAY, "HH:mm");
            let building = fields.guid("building");
            Some(Self {
                name: name?,
                open_time: open_time?,
                close_time: close_time?,
                building: building?,
            })
        })
    }
}

impl Schema for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        validate_object(value, |fields| {
            let name = fields.string("name");
            let description = fields.optional_string("description");
            let area = fields.guid("area");
            let building = fields.guid("building");
            let room = fields.string_allow_empty("room");
            let open_house = fields.guid("openHouse");
            let start_time = fields.pattern("startTime", &TIME_OF_DAY, "HH:mm");
            let end_time = fields.pattern("endTime", &TIME_OF_DAY, "HH:mm");
            Some(Self {
                name: name?,
                description: description?,
                area: area?,
                building: building?,
                room: room?,
                open_house: open_house?,
                start_time: start_time?,
                end_time: end_time?,
            })
        })
    }
}

impl Schema for OpenHouse {
    const KIND: EntityKind = EntityKind::OpenHouse;

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        validate_object(value, |fields| {
            let name = fields.string("name");
            let date = fields.positive_integer("date");
            let info = fields.string("info");
            let visible = fields.boolean("visible");
            Some(Self {
                name: name?,
                date: date?,
                info: info?,
                visible: visible?,
            })
        })
    }
}

fn validate_object<T>(
    value: &Value,
    build: impl FnOnce(&mut Fields<'_>) -> Option<T>,
) -> Result<T, ValidationError> {
    let Value::Object(object) = value else {
        return Err(ValidationError::from_issues(vec![FieldIssue::new(
            "value",
            "must be of type object",
        )]));
    };

    let mut fields = Fields::new(object, String::new());
    let validated = build(&mut fields);
    fields.reject_unknown();

    match validated {
        Some(value) if fields.issues.is_empty() => Ok(value),
        _ => Err(ValidationError::from_issues(fields.issues)),
    }
}

/// Field accessors over one JSON object. Every accessor records the key as
/// known and pushes an issue instead of returning early, so a single pass
/// reports all failures.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    prefix: String,
    known: Vec<&'static str>,
    issues: Vec<FieldIssue>,
}

impl<'a> Fields<'a> {
    fn new(object: &'a Map<String, Value>, prefix: String) -> Self {
        Self {
            object,
            prefix,
            known: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    fn issue(&mut self, key: &str, reason: impl Into<String>) {
        let path = self.path(key);
        self.issues.push(FieldIssue::new(path, reason));
    }

    fn lookup(&mut self, key: &'static str) -> Option<&'a Value> {
        self.known.push(key);
        let object: &'a Map<String, Value> = self.object;
        let value = object.get(key);
        if value.is_none() {
            self.issue(key, "is required");
        }
        value
    }

    fn raw_string(&mut self, key: &'static str) -> Option<&'a str> {
        match self.lookup(key)? {
            Value::String(text) => Some(text.as_str()),
            _ => {
                self.issue(key, "must be a string");
                None
            }
        }
    }

    fn string(&mut self, key: &'static str) -> Option<String> {
        let text = self.raw_string(key)?;
        if text.is_empty() {
            self.issue(key, "is not allowed to be empty");
            return None;
        }
        Some(text.to_string())
    }

    fn string_allow_empty(&mut self, key: &'static str) -> Option<String> {
        self.raw_string(key).map(str::to_string)
    }

    /// `Some(None)` when the key is absent, `None` when present but invalid.
    fn optional_string(&mut self, key: &'static str) -> Option<Option<String>> {
        if !self.object.contains_key(key) {
            self.known.push(key);
            return Some(None);
        }
        self.string(key).map(Some)
    }

    fn pattern(&mut self, key: &'static str, pattern: &Regex, name: &str) -> Option<String> {
        let text = self.string(key)?;
        if !pattern.is_match(&text) {
            self.issue(
                key,
                format!("with value \"{text}\" fails to match the {name} pattern"),
            );
            return None;
        }
        Some(text)
    }

    fn guid(&mut self, key: &'static str) -> Option<String> {
        let text = self.string(key)?;
        if text.len() != 36 || Uuid::try_parse(&text).is_err() {
            self.issue(key, "must be a valid GUID");
            return None;
        }
        Some(text)
    }

    /// Exclusive bounds on both ends.
    fn number_between(&mut self, key: &'static str, min: f64, max: f64) -> Option<f64> {
        let Some(number) = coerce_number(self.lookup(key)?).and_then(|number| number.as_f64())
        else {
            self.issue(key, "must be a number");
            return None;
        };
        if number <= min {
            self.issue(key, format!("must be greater than {min}"));
            return None;
        }
        if number >= max {
            self.issue(key, format!("must be less than {max}"));
            return None;
        }
        Some(number)
    }

    fn positive_integer(&mut self, key: &'static str) -> Option<u64> {
        let Some(number) = coerce_number(self.lookup(key)?) else {
            self.issue(key, "must be a number");
            return None;
        };
        let whole = match (number.as_u64(), number.as_i64(), number.as_f64()) {
            (Some(value), _, _) => Some(value),
            (None, Some(_), _) => None,
            (None, None, Some(float)) if float.fract() == 0.0 => {
                (1.0..=u64::MAX as f64)
                    .contains(&float)
                    .then_some(float as u64)
            }
            _ => {
                self.issue(key, "must be an integer");
                return None;
            }
        };

        match whole {
            Some(value) if value > 0 => Some(value),
            _ => {
                self.issue(key, "must be a positive number");
                None
            }
        }
    }

    fn boolean(&mut self, key: &'static str) -> Option<bool> {
        let value = match self.lookup(key)? {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
            Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        };
        if value.is_none() {
            self.issue(key, "must be a boolean");
        }
        value
    }

    fn nested<T>(
        &mut self,
        key: &'static str,
        build: impl FnOnce(&mut Fields<'_>) -> Option<T>,
    ) -> Option<T> {
        let Value::Object(object) = self.lookup(key)? else {
            self.issue(key, "must be of type object");
            return None;
        };

        let mut inner = Fields::new(object, self.path(key));
        let validated = build(&mut inner);
        inner.reject_unknown();
        let nested_valid = inner.issues.is_empty();
        self.issues.append(&mut inner.issues);

        validated.filter(|_| nested_valid)
    }

    fn reject_unknown(&mut self) {
        let unknown: Vec<String> = self
            .object
            .keys()
            .filter(|key| !self.known.iter().any(|known| *known == key.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            self.issue(&key, "is not allowed");
        }
    }
}

/// Numbers pass through; strings holding a finite number are converted.
fn coerce_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Some(number.clone()),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(integer) = text.parse::<i64>() {
                return Some(Number::from(integer));
            }
            if let Ok(integer) = text.parse::<u64>() {
                return Some(Number::from(integer));
            }
            text.parse::<f64>()
                .ok()
                .filter(|float| float.is_finite())
                .and_then(Number::from_f64)
        }
        _ => None,
    }
}
