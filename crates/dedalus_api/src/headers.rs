use std::collections::BTreeMap;

use crate::config::DedalusApiConfig;
use crate::error::DedalusApiError;

pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_USER_AGENT: &str = "user-agent";

pub const ACCEPT_EVENT_STREAM: &str = "text/event-stream";
pub const ACCEPT_JSON: &str = "application/json";

/// Desktop-browser user agent presented when no override is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Build a deterministic header map for chat-completion requests.
pub fn build_headers(
    config: &DedalusApiConfig,
    streaming: bool,
) -> Result<BTreeMap<String, String>, DedalusApiError> {
    if config.api_key.trim().is_empty() {
        return Err(DedalusApiError::MissingApiKey);
    }

    let mut headers = BTreeMap::new();
    headers.insert(
        HEADER_AUTHORIZATION.to_owned(),
        format!("Bearer {}", config.api_key.trim()),
    );
    headers.insert(HEADER_CONTENT_TYPE.to_owned(), ACCEPT_JSON.to_owned());
    headers.insert(
        HEADER_ACCEPT.to_owned(),
        if streaming {
            ACCEPT_EVENT_STREAM.to_owned()
        } else {
            ACCEPT_JSON.to_owned()
        },
    );

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_USER_AGENT);
    headers.insert(HEADER_USER_AGENT.to_owned(), user_agent.to_owned());

    Ok(headers)
}
