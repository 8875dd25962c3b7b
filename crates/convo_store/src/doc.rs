//! JSON document plumbing shared by bundles and the global index.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::error::ConvoStoreError;

/// Read a JSON document, yielding an empty object for anything unusable.
///
/// Missing files, unreadable files, malformed JSON, and non-object roots all
/// coerce to the empty document. Loading never fails; the unusable cases are
/// logged at debug level.
pub fn load_document(path: &Path) -> Map<String, Value> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %path.display(), %error, "ignoring unreadable document");
            }
            return Map::new();
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            debug!(path = %path.display(), "ignoring non-object document root");
            Map::new()
        }
        Err(error) => {
            debug!(path = %path.display(), %error, "ignoring malformed document");
            Map::new()
        }
    }
}

/// Write a JSON document atomically.
///
/// The document is serialized to a uniquely-named temp file next to the
/// target, then renamed into place. A failed rename removes the temp file
/// before the error propagates, leaving the original untouched.
pub fn save_document<T>(path: &Path, document: &T) -> Result<(), ConvoStoreError>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| {
                ConvoStoreError::io("creating document directory", parent, source)
            })?;
        }
    }

    let mut body = serde_json::to_string_pretty(document)
        .map_err(|source| ConvoStoreError::json_serialize(path, source))?;
    body.push('\n');

    let temp_path = temp_sibling(path);
    fs::write(&temp_path, body)
        .map_err(|source| ConvoStoreError::io("writing temp document", &temp_path, source))?;

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ConvoStoreError::io("replacing document", path, source));
    }

    Ok(())
}

/// Current UTC wall-clock time in RFC 3339.
pub fn now_rfc3339() -> Result<String, ConvoStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(ConvoStoreError::ClockFormat)
}

// Concurrent writers race on the final rename; the unique temp name keeps
// them from clobbering each other's scratch file in the meantime.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_owned());
    let unique = Uuid::new_v4().simple();
    path.with_file_name(format!(".{name}.{}.{unique}.tmp", std::process::id()))
}
