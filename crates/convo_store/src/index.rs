//! The cross-conversation pointer document.

use std::path::Path;

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::doc::{load_document, save_document};
use crate::error::ConvoStoreError;
use crate::title::{conversation_digits, normalize_title};

/// Tracks which conversation is active and how far the running counter has
/// advanced.
///
/// `convoIndex` never regresses. `carbonFootprint` and `permanent memories`
/// belong to other writers and ride along unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalIndex {
    #[serde(rename = "activeFileDetails")]
    pub active_file_details: ActiveFileDetails,
    #[serde(rename = "convoName")]
    pub convo_name: String,
    #[serde(rename = "convoIndex")]
    pub convo_index: u64,
    #[serde(rename = "carbonFootprint")]
    pub carbon_footprint: Number,
    #[serde(rename = "permanent memories")]
    pub permanent_memories: Vec<Value>,
}

/// Pointer to the active conversation file.
///
/// `existsActive` and `activeChatIndex` are stored as the value or the empty
/// string, so absent values round-trip as `""` rather than `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActiveFileDetails {
    #[serde(rename = "existsActive", serialize_with = "blank_when_none_bool")]
    pub exists_active: Option<bool>,
    #[serde(rename = "activeChatIndex", serialize_with = "blank_when_none_index")]
    pub active_chat_index: Option<i64>,
    #[serde(rename = "activeJsonFilePath")]
    pub active_json_file_path: String,
}

impl Default for GlobalIndex {
    fn default() -> Self {
        Self {
            active_file_details: ActiveFileDetails::default(),
            convo_name: String::new(),
            convo_index: 0,
            carbon_footprint: Number::from(0),
            permanent_memories: Vec::new(),
        }
    }
}

impl GlobalIndex {
    /// Read the index, tolerating a missing or malformed file.
    pub fn load(path: &Path) -> Self {
        Self::from_document(&load_document(path))
    }

    /// Normalize an untyped document into a typed index.
    pub fn from_document(raw: &Map<String, Value>) -> Self {
        let details = raw.get("activeFileDetails").and_then(Value::as_object);

        let exists_active = details
            .and_then(|details| details.get("existsActive"))
            .and_then(Value::as_bool);
        let active_chat_index = details
            .and_then(|details| details.get("activeChatIndex"))
            .and_then(chat_index_from_value);
        let active_json_file_path = details
            .and_then(|details| details.get("activeJsonFilePath"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let convo_name = raw
            .get("convoName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let convo_index = raw
            .get("convoIndex")
            .map(convo_index_from_value)
            .unwrap_or(0);
        let carbon_footprint = raw
            .get("carbonFootprint")
            .and_then(Value::as_number)
            .cloned()
            .unwrap_or_else(|| Number::from(0));
        let permanent_memories = raw
            .get("permanent memories")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            active_file_details: ActiveFileDetails {
                exists_active,
                active_chat_index,
                active_json_file_path,
            },
            convo_name,
            convo_index,
            carbon_footprint,
            permanent_memories,
        }
    }

    /// Point the index at a conversation and advance the running counter.
    ///
    /// A numeric conversation id can only raise `convoIndex`, never lower
    /// it. Non-numeric ids leave both index fields untouched.
    pub fn update(&mut self, conversation_id: &str, conversation_name: &str, json_path: &Path) {
        self.active_file_details.exists_active = Some(true);
        self.active_file_details.active_json_file_path = json_path.display().to_string();
        self.convo_name = normalize_title(conversation_name, conversation_id);

        if let Some(index) = conversation_digits(conversation_id) {
            self.active_file_details.active_chat_index = i64::try_from(index).ok();
            self.convo_index = self.convo_index.max(index);
        }
    }

    /// Atomically persist the index.
    pub fn save(&self, path: &Path) -> Result<(), ConvoStoreError> {
        save_document(path, self)
    }
}

// Stored integers pass through, including negatives; digit strings parse
// after trimming. Everything else coerces to blank.
fn chat_index_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let digits = text.trim();
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()
        }
        _ => None,
    }
}

// Integer coercion for the running counter: numbers truncate toward zero,
// numeric strings parse, booleans count as 0 or 1, anything else is zero.
// Negative results clamp to zero.
fn convo_index_from_value(value: &Value) -> u64 {
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    };

    parsed
        .filter(|index| *index >= 0)
        .map_or(0, |index| index as u64)
}

fn blank_when_none_bool<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(flag) => serializer.serialize_bool(*flag),
        None => serializer.serialize_str(""),
    }
}

fn blank_when_none_index<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(index) => serializer.serialize_i64(*index),
        None => serializer.serialize_str(""),
    }
}
