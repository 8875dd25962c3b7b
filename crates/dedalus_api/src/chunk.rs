use serde_json::Value;
use tracing::debug;

use crate::error::DedalusApiError;

/// Payload value that terminates a stream successfully.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Keys recursed into when hunting for text inside mapping payloads.
const TEXT_KEYS: [&str; 4] = ["text", "content", "value", "output_text"];

/// Tokens and terminal bookkeeping decoded from one stream chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkUpdate {
    pub tokens: Vec<String>,
    pub finish_reason: Option<String>,
}

/// Decode one event payload into a [`ChunkUpdate`].
///
/// Malformed JSON and non-object payloads yield an empty update rather than
/// an error. A chunk carrying a non-blank `error.message` aborts the stream
/// with that exact message.
pub fn update_from_payload(payload: &str) -> Result<ChunkUpdate, DedalusApiError> {
    let chunk = match serde_json::from_str::<Value>(payload) {
        Ok(chunk) => chunk,
        Err(error) => {
            debug!(%error, "skipping malformed stream payload");
            return Ok(ChunkUpdate::default());
        }
    };
    if !chunk.is_object() {
        return Ok(ChunkUpdate::default());
    }

    if let Some(message) = in_band_error_message(&chunk) {
        return Err(DedalusApiError::Provider(message));
    }

    let mut update = ChunkUpdate::default();
    match chunk.get("choices") {
        Some(Value::Array(choices)) => {
            for choice in choices {
                if !choice.is_object() {
                    continue;
                }

                update.tokens.extend(tokens_from_choice(choice));

                if let Some(reason) = choice.get("finish_reason").and_then(Value::as_str) {
                    if !reason.is_empty() {
                        update.finish_reason = Some(map_finish_reason(reason));
                    }
                }
            }
        }
        // No choice list at all: some dialects put the text on the chunk itself.
        _ => update.tokens = extract_text_fragments(&chunk),
    }

    Ok(update)
}

/// Token fragments for one streamed choice: `delta` first, then the
/// non-streaming `text`/`content`/`message.content` spellings.
pub fn tokens_from_choice(choice: &Value) -> Vec<String> {
    let mut raw = Vec::new();
    if let Some(delta) = choice.get("delta") {
        collect_fragments(delta, &mut raw);
    }

    if raw.is_empty() {
        if let Some(text) = choice.get("text") {
            collect_fragments(text, &mut raw);
        }
        if let Some(content) = choice.get("content") {
            collect_fragments(content, &mut raw);
        }
        match choice.get("message") {
            Some(Value::Object(message)) => {
                if let Some(content) = message.get("content") {
                    collect_fragments(content, &mut raw);
                }
            }
            Some(message) => collect_fragments(message, &mut raw),
            None => {}
        }
    }

    collapse_adjacent_duplicates(raw)
}

/// Flatten an arbitrarily nested provider value into ordered text fragments.
///
/// Strings collect as-is, sequences recurse element-wise, and mappings
/// recurse through the known text-bearing keys only.
pub fn extract_text_fragments(value: &Value) -> Vec<String> {
    let mut fragments = Vec::new();
    collect_fragments(value, &mut fragments);
    fragments
}

/// Map provider finish reasons onto the names surfaced to consumers.
pub fn map_finish_reason(reason: &str) -> String {
    match reason {
        "content_filter" => "content-filter".to_owned(),
        "tool_calls" => "tool-calls".to_owned(),
        other => other.to_owned(),
    }
}

fn in_band_error_message(chunk: &Value) -> Option<String> {
    let error = chunk.get("error")?;
    if !error.is_object() {
        return None;
    }
    let message = error.get("message")?.as_str()?;
    if message.trim().is_empty() {
        return None;
    }
    Some(message.to_owned())
}

fn collect_fragments(value: &Value, fragments: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            if !text.is_empty() {
                fragments.push(text.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_fragments(item, fragments);
            }
        }
        Value::Object(map) => {
            for key in TEXT_KEYS {
                if let Some(inner) = map.get(key) {
                    collect_fragments(inner, fragments);
                }
            }
        }
        _ => {}
    }
}

// Guards against providers that echo the same partial delta twice in a row.
fn collapse_adjacent_duplicates(raw: Vec<String>) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::with_capacity(raw.len());
    for fragment in raw {
        if fragment.is_empty() {
            continue;
        }
        if fragments.last() == Some(&fragment) {
            continue;
        }
        fragments.push(fragment);
    }
    fragments
}
