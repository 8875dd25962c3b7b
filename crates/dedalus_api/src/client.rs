use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::chunk::{map_finish_reason, update_from_payload, ChunkUpdate, DONE_SENTINEL};
use crate::config::DedalusApiConfig;
use crate::error::{parse_error_message, DedalusApiError};
use crate::headers::build_headers;
use crate::payload::ChatRequest;
use crate::sse::EventStreamParser;
use crate::url::normalize_chat_url;

#[derive(Debug)]
pub struct DedalusApiClient {
    http: Client,
    config: DedalusApiConfig,
}

/// Final assistant text and normalized completion reason for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub finish_reason: String,
}

impl DedalusApiClient {
    pub fn new(config: DedalusApiConfig) -> Result<Self, DedalusApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(DedalusApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &DedalusApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_headers(&self, streaming: bool) -> Result<HeaderMap, DedalusApiError> {
        let headers = build_headers(&self.config, streaming)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    DedalusApiError::InvalidHeader(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(&value).map_err(|_| {
                    DedalusApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ChatRequest,
        streaming: bool,
    ) -> Result<reqwest::RequestBuilder, DedalusApiError> {
        let headers = self.build_headers(streaming)?;
        let mut payload = request.clone();
        payload.stream = streaming;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload))
    }

    /// Issue a non-streaming completion and decode the single JSON body.
    pub async fn complete(&self, request: &ChatRequest) -> Result<Completion, DedalusApiError> {
        let response = self.send(request, false).await?;
        let body = response.text().await.map_err(DedalusApiError::from)?;
        completion_from_body(&body)
    }

    /// Stream a completion, handing every token fragment to `on_token` in
    /// arrival order. The returned [`Completion`] carries the concatenation
    /// of all fragments.
    pub async fn stream_with_handler<F>(
        &self,
        request: &ChatRequest,
        mut on_token: F,
    ) -> Result<Completion, DedalusApiError>
    where
        F: FnMut(&str),
    {
        let response = self.send(request, true).await?;
        let mut bytes = response.bytes_stream();
        let mut parser = EventStreamParser::default();
        let mut text = String::new();
        let mut finish_reason: Option<String> = None;
        let mut done = false;

        'stream: while let Some(next) = bytes.next().await {
            let chunk = next.map_err(DedalusApiError::from)?;
            for payload in parser.feed(&chunk) {
                if payload == DONE_SENTINEL {
                    done = true;
                    break 'stream;
                }
                apply_payload(&payload, &mut text, &mut finish_reason, &mut on_token)?;
            }
        }

        if !done {
            if let Some(payload) = parser.finish() {
                if payload != DONE_SENTINEL {
                    apply_payload(&payload, &mut text, &mut finish_reason, &mut on_token)?;
                }
            }
        }

        if text.trim().is_empty() {
            return Err(DedalusApiError::EmptyResponse);
        }

        Ok(Completion {
            text,
            finish_reason: finish_reason.unwrap_or_else(|| "stop".to_owned()),
        })
    }

    async fn send(
        &self,
        request: &ChatRequest,
        streaming: bool,
    ) -> Result<Response, DedalusApiError> {
        let response = self
            .build_request(request, streaming)?
            .send()
            .await
            .map_err(DedalusApiError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DedalusApiError::Status(
            status,
            parse_error_message(status, &body),
        ))
    }
}

fn apply_payload<F>(
    payload: &str,
    text: &mut String,
    finish_reason: &mut Option<String>,
    on_token: &mut F,
) -> Result<(), DedalusApiError>
where
    F: FnMut(&str),
{
    let ChunkUpdate {
        tokens,
        finish_reason: reason,
    } = update_from_payload(payload)?;

    for token in tokens {
        text.push_str(&token);
        on_token(&token);
    }
    if reason.is_some() {
        *finish_reason = reason;
    }
    Ok(())
}

fn completion_from_body(body: &str) -> Result<Completion, DedalusApiError> {
    let parsed: Value = serde_json::from_str(body).map_err(DedalusApiError::from)?;
    let first = parsed
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .filter(|choice| choice.is_object())
        .ok_or(DedalusApiError::EmptyResponse)?;

    let content = first
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty())
        .ok_or(DedalusApiError::EmptyResponse)?;

    let finish_reason = match first.get("finish_reason").and_then(Value::as_str) {
        Some(reason) => map_finish_reason(reason),
        None => "stop".to_owned(),
    };

    Ok(Completion {
        text: content.to_owned(),
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::{apply_payload, completion_from_body};
    use crate::error::DedalusApiError;

    #[test]
    fn apply_payload_accumulates_tokens_and_tracks_finish_reason() {
        let mut text = String::new();
        let mut finish_reason = None;
        let mut observed = Vec::new();

        apply_payload(
            r#"{"choices":[{"delta":{"content":"Hel"}}]}"#,
            &mut text,
            &mut finish_reason,
            &mut |token: &str| observed.push(token.to_owned()),
        )
        .expect("delta chunk should decode");
        apply_payload(
            r#"{"choices":[{"delta":{"content":"lo"},"finish_reason":"stop"}]}"#,
            &mut text,
            &mut finish_reason,
            &mut |token: &str| observed.push(token.to_owned()),
        )
        .expect("final chunk should decode");

        assert_eq!(text, "Hello");
        assert_eq!(observed, vec!["Hel".to_owned(), "lo".to_owned()]);
        assert_eq!(finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn completion_from_body_extracts_first_choice() {
        let completion = completion_from_body(
            r#"{"choices":[{"message":{"content":"Hi"},"finish_reason":"tool_calls"}]}"#,
        )
        .expect("body with a populated first choice should decode");

        assert_eq!(completion.text, "Hi");
        assert_eq!(completion.finish_reason, "tool-calls");
    }

    #[test]
    fn completion_from_body_rejects_missing_choices() {
        assert!(matches!(
            completion_from_body(r#"{"choices":[]}"#),
            Err(DedalusApiError::EmptyResponse)
        ));
        assert!(matches!(
            completion_from_body(r#"{"choices":[{"message":{"content":"   "}}]}"#),
            Err(DedalusApiError::EmptyResponse)
        ));
    }
}
