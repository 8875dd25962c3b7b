//! The turn state machine: load, normalize, ingest, persist, report.

use std::io::Write;

use convo_store::{
    ensure_latest_user, now_rfc3339, to_request_messages, Bundle, GlobalIndex,
};
use dedalus_api::{ChatRequest, Completion, DedalusApiClient, DedalusApiConfig};
use tracing::debug;

use crate::error::TurnError;
use crate::events::{JsonLinesSink, TurnEvent};
use crate::settings::{resolve_model, TurnSettings};

/// One completion round-trip against a provider.
///
/// The controller stays synchronous; the backend owns whatever runtime its
/// transport needs. Streaming backends feed `on_token` as deltas arrive and
/// still return the accumulated completion at the end.
pub trait CompletionBackend {
    fn run(
        &self,
        request: &ChatRequest,
        on_token: &mut dyn FnMut(&str),
    ) -> Result<Completion, TurnError>;
}

/// Backend that talks to the Dedalus chat-completions endpoint.
pub struct HttpBackend {
    client: DedalusApiClient,
    streaming: bool,
}

impl HttpBackend {
    pub fn new(config: DedalusApiConfig, streaming: bool) -> Result<Self, TurnError> {
        let client = DedalusApiClient::new(config)?;
        Ok(Self { client, streaming })
    }
}

impl CompletionBackend for HttpBackend {
    fn run(
        &self,
        request: &ChatRequest,
        on_token: &mut dyn FnMut(&str),
    ) -> Result<Completion, TurnError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TurnError::Runtime)?;
        let completion = if self.streaming {
            runtime.block_on(
                self.client
                    .stream_with_handler(request, |token| on_token(token)),
            )?
        } else {
            runtime.block_on(self.client.complete(request))?
        };
        Ok(completion)
    }
}

/// What a finished turn reports on the final event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub text: String,
    pub finish_reason: String,
}

/// Run one turn end to end: validate, load the bundle, build the request,
/// ingest the response, persist, and hand back the outcome.
///
/// On ingestion failure nothing is written to the conversation bundle; the
/// global index still records the failed turn when index updates are enabled.
pub fn run_turn(
    settings: &TurnSettings,
    backend: &dyn CompletionBackend,
    on_token: &mut dyn FnMut(&str),
) -> Result<TurnOutcome, TurnError> {
    let message = settings.message.trim();
    if message.is_empty() {
        return Err(TurnError::EmptyMessage);
    }
    if settings.api_key.trim().is_empty() {
        return Err(TurnError::MissingApiKey);
    }

    let mut bundle = Bundle::load(&settings.conversation_json_path, &settings.conversation_id)?;
    let model = resolve_model(
        settings.model_override.as_deref(),
        settings.env_model.as_deref(),
        &bundle.model.name,
    );

    let mut messages = to_request_messages(&bundle);
    ensure_latest_user(&mut messages, message);
    let request = ChatRequest::new(model.clone(), messages);

    debug!(%model, streaming = settings.streaming, "dispatching completion request");
    let completion = match backend.run(&request, on_token) {
        Ok(completion) => completion,
        Err(error) => {
            record_failed_turn(settings, &bundle, &error);
            return Err(error);
        }
    };

    persist_turn(settings, &mut bundle, message, &completion)?;
    Ok(TurnOutcome {
        text: completion.text.clone(),
        finish_reason: completion.finish_reason.clone(),
    })
}

fn persist_turn(
    settings: &TurnSettings,
    bundle: &mut Bundle,
    message: &str,
    completion: &Completion,
) -> Result<(), TurnError> {
    let now = now_rfc3339()?;
    bundle.append_user_turn(message, &now);
    bundle.append_assistant_turn(&completion.text, &now);
    bundle.save(&settings.conversation_json_path)?;

    if settings.update_global_index {
        debug!(
            disposition = "completed",
            finish_reason = %completion.finish_reason,
            "updating global index"
        );
        let mut index = GlobalIndex::load(&settings.global_json_path);
        index.update(
            &settings.conversation_id,
            &bundle.conversation.name,
            &settings.conversation_json_path,
        );
        index
            .save(&settings.global_json_path)
            .map_err(TurnError::IndexUpdate)?;
    }
    Ok(())
}

fn record_failed_turn(settings: &TurnSettings, bundle: &Bundle, error: &TurnError) {
    if !settings.update_global_index {
        return;
    }
    debug!(disposition = "error", message = %error, "updating global index");
    let mut index = GlobalIndex::load(&settings.global_json_path);
    index.update(
        &settings.conversation_id,
        &bundle.conversation.name,
        &settings.conversation_json_path,
    );
    // A failed turn may still move the shared pointer when authorized; an
    // index write failure here is logged, the ingestion error stays the one
    // reported.
    if let Err(save_error) = index.save(&settings.global_json_path) {
        debug!(error = %save_error, "global index update failed after turn failure");
    }
}

/// Drive a turn and translate it into the line-delimited event protocol.
///
/// Exactly one terminal event is emitted: `final` on success, `error` on any
/// failure. Returns the process exit code.
pub fn execute<W: Write>(
    settings: &TurnSettings,
    backend: &dyn CompletionBackend,
    sink: &mut JsonLinesSink<W>,
) -> u8 {
    let result = {
        let mut on_token = |token: &str| {
            let _ = sink.emit(&TurnEvent::token(token));
        };
        run_turn(settings, backend, &mut on_token)
    };
    match result {
        Ok(outcome) => {
            let _ = sink.emit(&TurnEvent::final_text(outcome.text, outcome.finish_reason));
            0
        }
        Err(error) => {
            let _ = sink.emit(&TurnEvent::error(error.to_string()));
            1
        }
    }
}
