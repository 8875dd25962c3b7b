//! The per-conversation document: metadata, model, and stored turns.

use std::path::Path;

use dedalus_api::Role;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::doc::{load_document, now_rfc3339, save_document};
use crate::error::ConvoStoreError;

/// Model recorded on bundles that never chose one.
pub const DEFAULT_MODEL_NAME: &str = "anthropic/claude-opus-4-5";

/// Provider family recorded on bundles.
pub const DEFAULT_MODEL_KIND: &str = "dedalus";

/// One durable conversation document.
///
/// Loading is tolerant: wrong-typed fields coerce to their defaults instead
/// of failing, so a damaged file degrades to a fresh conversation rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bundle {
    pub conversation: ConversationMeta,
    pub model: ModelRef,
    #[serde(serialize_with = "serialize_message_container")]
    pub messages: Vec<StoredMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationMeta {
    pub id: String,
    pub name: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRef {
    pub kind: String,
    pub name: String,
}

/// A stored turn. The role is kept as raw text so unknown roles survive to
/// the request normalizer, which is where they get filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMessage {
    pub id: String,
    pub role: String,
    pub text: String,
    pub created_at: String,
}

impl Bundle {
    /// Read a bundle, tolerating a missing or malformed file.
    pub fn load(path: &Path, conversation_id: &str) -> Result<Self, ConvoStoreError> {
        let now = now_rfc3339()?;
        Ok(Self::from_document(&load_document(path), conversation_id, &now))
    }

    /// Normalize an untyped document into a typed bundle. Never fails.
    ///
    /// A top-level `system_prompt` string wins over the conversation-level
    /// one even when blank, so an explicit empty override stays
    /// distinguishable from an absent one. Stored entries that are not
    /// objects or have blank text are dropped; missing `id` / `role` /
    /// `created_at` fields coerce to empty strings, keeping the load pure.
    pub fn from_document(raw: &Map<String, Value>, conversation_id: &str, now: &str) -> Self {
        let conversation = object_field(raw, "conversation");
        let model = object_field(raw, "model");

        let messages = raw
            .get("messages")
            .and_then(Value::as_object)
            .and_then(|container| container.get("messages"))
            .and_then(Value::as_array)
            .map(|stored| stored.iter().filter_map(normalize_stored_message).collect())
            .unwrap_or_default();

        let system_prompt = raw
            .get("system_prompt")
            .and_then(Value::as_str)
            .or_else(|| string_field(conversation, "system_prompt"))
            .map(str::to_owned);

        Self {
            conversation: ConversationMeta {
                id: string_field(conversation, "id")
                    .unwrap_or(conversation_id)
                    .to_owned(),
                name: string_field(conversation, "name")
                    .unwrap_or(conversation_id)
                    .to_owned(),
                updated_at: string_field(conversation, "updated_at")
                    .unwrap_or(now)
                    .to_owned(),
            },
            model: ModelRef {
                kind: string_field(model, "kind")
                    .unwrap_or(DEFAULT_MODEL_KIND)
                    .to_owned(),
                name: string_field(model, "name")
                    .unwrap_or(DEFAULT_MODEL_NAME)
                    .to_owned(),
            },
            messages,
            system_prompt,
        }
    }

    /// Atomically persist the bundle.
    pub fn save(&self, path: &Path) -> Result<(), ConvoStoreError> {
        save_document(path, self)
    }

    /// Append the user side of a completed turn.
    ///
    /// The text is trimmed; blank input is a no-op. The append is also
    /// skipped when the latest stored message is already a user turn with
    /// identical trimmed text, so a retried turn does not duplicate it.
    pub fn append_user_turn(&mut self, text: &str, now: &str) {
        let text = text.trim();
        if text.is_empty() || self.ends_with_user_turn(text) {
            return;
        }
        self.push_message(Role::User, text, now);
    }

    /// Append the assistant side of a completed turn, verbatim.
    ///
    /// Text that trims to nothing is a no-op; ingestion surfaces that case
    /// as an error before persistence is ever reached.
    pub fn append_assistant_turn(&mut self, text: &str, now: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.push_message(Role::Assistant, text, now);
    }

    fn push_message(&mut self, role: Role, text: &str, now: &str) {
        self.messages.push(StoredMessage {
            id: Uuid::new_v4().to_string(),
            role: role.as_str().to_owned(),
            text: text.to_owned(),
            created_at: now.to_owned(),
        });
        self.conversation.updated_at = now.to_owned();
    }

    fn ends_with_user_turn(&self, trimmed_text: &str) -> bool {
        self.messages.last().is_some_and(|message| {
            message.role == Role::User.as_str() && message.text.trim() == trimmed_text
        })
    }
}

fn normalize_stored_message(entry: &Value) -> Option<StoredMessage> {
    let map = entry.as_object()?;
    let text = map.get("text").and_then(Value::as_str)?;
    if text.trim().is_empty() {
        return None;
    }

    Some(StoredMessage {
        id: string_or_empty(map, "id"),
        role: string_or_empty(map, "role"),
        text: text.to_owned(),
        created_at: string_or_empty(map, "created_at"),
    })
}

// The on-disk shape nests the list one level down.
fn serialize_message_container<S>(
    messages: &[StoredMessage],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    #[derive(Serialize)]
    struct Container<'a> {
        messages: &'a [StoredMessage],
    }
    Container { messages }.serialize(serializer)
}

fn object_field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    raw.get(key).and_then(Value::as_object)
}

fn string_field<'a>(map: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a str> {
    map?.get(key)?.as_str()
}

fn string_or_empty(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}
