//! Core types for the document store
//!
//! - `Collection`: the four collections the daycare app reads and writes
//! - `Document`: an id plus a schema-less JSON object body
//! - `DateRange`: a half-open `[start, end)` interval over the `date` field
//! - patch helpers shared by every backend (top-level merge, nested field set)

use crate::store::error::{StoreError, StoreResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the timestamp field used by range queries
pub const DATE_FIELD: &str = "date";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Collections in the document store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Child roster (reference data)
    #[serde(rename = "kidsInfo")]
    KidsInfo,
    /// One document per calendar day, child name → status
    #[serde(rename = "attendance")]
    Attendance,
    /// One document per child per day
    #[serde(rename = "dailyReports")]
    DailyReports,
    /// Singleton configuration documents
    #[serde(rename = "appConfig")]
    AppConfig,
}

impl Collection {
    /// Get all collections for iteration
    pub fn all() -> &'static [Collection] {
        &[
            Collection::KidsInfo,
            Collection::Attendance,
            Collection::DailyReports,
            Collection::AppConfig,
        ]
    }

    /// Wire name of the collection
    pub fn name(&self) -> &'static str {
        match self {
            Collection::KidsInfo => "kidsInfo",
            Collection::Attendance => "attendance",
            Collection::DailyReports => "dailyReports",
            Collection::AppConfig => "appConfig",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Timestamp of the `date` field in milliseconds, if present and valid
    pub fn date_ms(&self) -> Option<i64> {
        date_field_ms(&self.data)
    }

    /// Deserialize the document body into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            StoreError::Serialization(format!("Failed to decode document {}: {}", self.id, e))
        })
    }
}

/// Extract the `date` field of a document body as milliseconds since epoch
///
/// Dates are stored as RFC 3339 strings. Anything else is not range-queryable.
pub fn date_field_ms(data: &Value) -> Option<i64> {
    data.get(DATE_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.timestamp_millis())
}

/// Half-open date interval `[start_ms, end_ms)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl DateRange {
    /// Create a range, rejecting empty or inverted intervals
    pub fn new(start_ms: i64, end_ms: i64) -> StoreResult<Self> {
        if start_ms >= end_ms {
            return Err(StoreError::InvalidRange);
        }
        Ok(Self { start_ms, end_ms })
    }

    /// `[day 00:00, day+1 00:00)` in the given offset
    pub fn for_day(day: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight_ms = day.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        let start_ms = local_midnight_ms - i64::from(offset.local_minus_utc()) * 1000;
        Self {
            start_ms,
            end_ms: start_ms + DAY_MS,
        }
    }

    pub fn contains(&self, timestamp_ms: i64) -> bool {
        timestamp_ms >= self.start_ms && timestamp_ms < self.end_ms
    }
}

/// Borrow a document body as an object
pub fn as_object_mut(data: &mut Value) -> StoreResult<&mut Map<String, Value>> {
    let kind = value_kind(data);
    data.as_object_mut()
        .ok_or_else(|| StoreError::NotAnObject(kind.to_string()))
}

/// Require that a value is a JSON object
pub fn require_object(data: Value) -> StoreResult<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotAnObject(value_kind(&other).to_string())),
    }
}

/// Merge top-level fields of `patch` into `target`, replacing existing values
pub fn merge_top_level(target: &mut Value, patch: Map<String, Value>) -> StoreResult<()> {
    let object = as_object_mut(target)?;
    for (key, value) in patch {
        object.insert(key, value);
    }
    Ok(())
}

/// Set a nested field addressed by literal path segments
///
/// Missing intermediate objects are created; non-object intermediates are
/// replaced by objects.
pub fn set_path(target: &mut Value, path: &[&str], value: Value) -> StoreResult<()> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| StoreError::InvalidPath("path must not be empty".to_string()))?;

    let mut cursor = as_object_mut(target)?;
    for segment in parents {
        let entry = cursor
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        cursor = as_object_mut(entry)?;
    }
    cursor.insert(last.to_string(), value);
    Ok(())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
