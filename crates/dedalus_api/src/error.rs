use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

/// Longest raw-body excerpt folded into a status failure message.
const BODY_EXCERPT_LIMIT: usize = 500;

#[derive(Debug)]
pub enum DedalusApiError {
    MissingApiKey,
    InvalidHeader(String),
    Transport(reqwest::Error),
    Status(StatusCode, String),
    Provider(String),
    EmptyResponse,
    Serde(JsonError),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
}

impl fmt::Display for DedalusApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "Dedalus API key is required"),
            Self::InvalidHeader(message) => write!(f, "invalid request header: {message}"),
            Self::Transport(error) => write!(f, "Failed to reach Dedalus API: {error}"),
            Self::Status(_, message) => write!(f, "{message}"),
            Self::Provider(message) => write!(f, "{message}"),
            Self::EmptyResponse => write!(f, "Dedalus returned an empty assistant response."),
            Self::Serde(error) => write!(f, "failed to decode Dedalus response: {error}"),
        }
    }
}

impl std::error::Error for DedalusApiError {}

impl From<reqwest::Error> for DedalusApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<JsonError> for DedalusApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Compose the failure message for a non-2xx response body.
///
/// A non-blank in-band `error.message` wins verbatim; otherwise a generic
/// status sentence is produced, with a bounded raw-body excerpt appended
/// when the body carries anything at all.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = format!("Dedalus request failed with status {}.", status.as_u16());

    if let Some(message) = provider_error_message(body) {
        return message;
    }

    if body.trim().is_empty() {
        fallback
    } else {
        format!("{fallback} {}", body_excerpt(body))
    }
}

/// Non-blank `error.message` extracted from a JSON body, verbatim.
pub(crate) fn provider_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorPayload>(body).ok()?;
    let message = parsed.value?.message?;
    if message.trim().is_empty() {
        return None;
    }
    Some(message)
}

fn body_excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LIMIT) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}
