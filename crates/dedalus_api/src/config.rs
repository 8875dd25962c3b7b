use std::time::Duration;

use crate::url::DEFAULT_DEDALUS_BASE_URL;

/// Default cap on a single chat-completion request, streaming or not.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Transport configuration for Dedalus chat-completion requests.
#[derive(Debug, Clone)]
pub struct DedalusApiConfig {
    /// Bearer token passed to `authorization`.
    pub api_key: String,
    /// Base URL for the chat-completions endpoint.
    pub base_url: String,
    /// Optional `user-agent` override.
    pub user_agent: Option<String>,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl Default for DedalusApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_DEDALUS_BASE_URL.to_string(),
            user_agent: None,
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl DedalusApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
