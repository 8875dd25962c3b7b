//! Durable conversation state for the Verdant CLI.
//!
//! Two documents live on disk: the per-conversation bundle (metadata, model
//! choice, stored turns) and the global index that points at the active
//! conversation. Loads are tolerant, coercing damaged fields to defaults
//! instead of failing; saves go through a temp-file-and-rename step so a
//! crashed write never leaves a half-written document behind.

mod bundle;
mod doc;
mod error;
mod index;
mod normalize;
mod title;

pub use bundle::{
    Bundle, ConversationMeta, ModelRef, StoredMessage, DEFAULT_MODEL_KIND, DEFAULT_MODEL_NAME,
};
pub use doc::{load_document, now_rfc3339, save_document};
pub use error::ConvoStoreError;
pub use index::{ActiveFileDetails, GlobalIndex};
pub use normalize::{
    effective_system_prompt, ensure_latest_user, to_request_messages, DEFAULT_SYSTEM_PROMPT,
};
pub use title::{conversation_digits, default_title, normalize_title};
