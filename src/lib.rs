//! Streaming chat-completion turns for Verdant conversations.
//!
//! One invocation runs one turn: load the conversation bundle, normalize its
//! history into a chat-completions request, stream the assistant's reply,
//! persist the grown bundle, and optionally advance the shared global index.
//! Progress and the sole terminal result are reported as line-delimited JSON
//! events on stdout.
//!
//! ## Environment
//! - `DEDALUS_API_KEY` (required): bearer credential for the Dedalus API.
//! - `DEDALUS_MODEL`: model override, ranked below the `--model` flag.
//! - `DEDALUS_API_BASE_URL`: endpoint override; defaults to the public API.
//! - `DEDALUS_USER_AGENT`: optional `User-Agent` header value.
//! - `RUST_LOG`: tracing filter. Diagnostics go to stderr so stdout stays a
//!   clean event stream.
//!
//! ## Output contract
//! Every stdout line is one JSON document: zero or more `token` events while
//! streaming, then exactly one terminal `final` or `error` event. The process
//! exits non-zero exactly when the terminal event is `error`.

pub mod cli;
pub mod error;
pub mod events;
pub mod settings;
pub mod turn;
