use thiserror::Error;

/// Failures a single turn can surface.
///
/// Configuration problems short-circuit before any network activity. Every
/// variant maps onto exactly one terminal error event; its `Display` text is
/// the event's `message` field verbatim.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Message cannot be empty.")]
    EmptyMessage,

    #[error("Missing DEDALUS_API_KEY.")]
    MissingApiKey,

    #[error(transparent)]
    Ingest(#[from] dedalus_api::DedalusApiError),

    #[error(transparent)]
    Store(#[from] convo_store::ConvoStoreError),

    #[error("Failed to update global info json: {0}")]
    IndexUpdate(#[source] convo_store::ConvoStoreError),

    #[error("failed to initialize tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
