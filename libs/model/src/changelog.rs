//! Change log entries and the `GET /subscriptions/check-logs` response.
//!
//! The backend answers "check updates" with one of two shapes:
//!
//! - a sentinel saying nothing changed, and
//! - a list of per-event groups, each holding that event's change log entries.
//!
//! Newer backends tag the shape (`{"kind": "no_updates", ...}` /
//! `{"kind": "updates", ...}`). Older ones send a bare JSON array: an array of
//! strings for the sentinel, an array of group objects otherwise. Both are
//! classified here, once, into [`UpdatesResponse`].

use chrono::{DateTime, Utc};
use eventboard_id::EventId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ModelError;

/// One recorded edit to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// Human-readable descriptions, in the order the server listed them.
    pub changes: Vec<String>,

    /// Who made the change.
    pub updated_by: String,

    /// When the change was made.
    pub at: DateTime<Utc>,
}

impl ChangeLogEntry {
    /// Timestamp in long form, e.g. `May 1, 2025 at 3:04:05 PM UTC`.
    pub fn formatted_at(&self) -> String {
        self.at.format("%B %-d, %Y at %-I:%M:%S %p UTC").to_string()
    }
}

/// All change log entries for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeGroup {
    pub event_id: EventId,
    pub event_title: String,
    /// Entries in server order; never re-sorted.
    pub updates: Vec<ChangeLogEntry>,
}

/// Classified response of `GET /subscriptions/check-logs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatesResponse {
    /// Nothing changed since the last check.
    NoUpdates { message: String },

    /// Change groups in server order.
    Groups(Vec<ChangeGroup>),
}

/// Tagged form of the response.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedUpdates {
    NoUpdates { message: String },
    Updates { groups: Vec<ChangeGroup> },
}

impl From<TaggedUpdates> for UpdatesResponse {
    fn from(tagged: TaggedUpdates) -> Self {
        match tagged {
            TaggedUpdates::NoUpdates { message } => UpdatesResponse::NoUpdates { message },
            TaggedUpdates::Updates { groups } => UpdatesResponse::Groups(groups),
        }
    }
}

impl UpdatesResponse {
    /// Decode a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ModelError::AmbiguousShape(format!("body is not JSON: {e}")))?;
        Self::classify(value)
    }

    /// Classify a decoded JSON value into one of the two known shapes.
    ///
    /// Anything that is neither is rejected rather than guessed at.
    pub fn classify(value: Value) -> Result<Self, ModelError> {
        if value.as_object().is_some_and(|map| map.contains_key("kind")) {
            return serde_json::from_value::<TaggedUpdates>(value)
                .map(Into::into)
                .map_err(|e| ModelError::AmbiguousShape(format!("tagged response: {e}")));
        }

        match value {
            Value::Array(items) => classify_untagged(items),
            other => Err(ModelError::AmbiguousShape(format!(
                "expected an array or a tagged object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Returns true for the "nothing new" sentinel.
    pub fn is_no_updates(&self) -> bool {
        matches!(self, UpdatesResponse::NoUpdates { .. })
    }
}

fn classify_untagged(items: Vec<Value>) -> Result<UpdatesResponse, ModelError> {
    if items.is_empty() {
        return Ok(UpdatesResponse::Groups(Vec::new()));
    }

    if items.iter().all(Value::is_string) {
        let message = items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        return Ok(UpdatesResponse::NoUpdates { message });
    }

    if items.iter().all(Value::is_object) {
        let groups: Vec<ChangeGroup> = serde_json::from_value(Value::Array(items))
            .map_err(|e| ModelError::AmbiguousShape(format!("group list: {e}")))?;
        return Ok(UpdatesResponse::Groups(groups));
    }

    Err(ModelError::AmbiguousShape(
        "array mixes strings, objects, or other values".to_string(),
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an untagged object",
    }
}
