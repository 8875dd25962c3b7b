//! Transport-only Dedalus chat-completion client primitives.
//!
//! This crate owns request building and response decoding for the Dedalus
//! `/chat/completions` endpoint only. It carries no credential loading and
//! no conversation persistence; callers supply a ready [`DedalusApiConfig`]
//! and observe streamed tokens through a handler.
//!
//! Decoding is deliberately tolerant: completion chunks arrive in several
//! provider dialects, and anything unparsable is skipped rather than
//! failing the whole completion.

pub mod chunk;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod sse;
pub mod url;

pub use chunk::{
    extract_text_fragments, map_finish_reason, tokens_from_choice, ChunkUpdate, DONE_SENTINEL,
};
pub use client::{Completion, DedalusApiClient};
pub use config::{DedalusApiConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::DedalusApiError;
pub use payload::{ChatRequest, RequestMessage, Role};
pub use sse::EventStreamParser;
pub use url::{normalize_chat_url, DEFAULT_DEDALUS_BASE_URL};
