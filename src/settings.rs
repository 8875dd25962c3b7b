//! Flag and environment resolution for one turn.

use std::path::{Path, PathBuf};

use convo_store::DEFAULT_MODEL_NAME;
use dedalus_api::{DedalusApiConfig, DEFAULT_DEDALUS_BASE_URL};

use crate::cli::Cli;

/// Everything a turn needs, resolved from flags and the `DEDALUS_*`
/// environment. Plain data so tests can build it directly.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub message: String,
    pub conversation_json_path: PathBuf,
    pub conversation_id: String,
    pub global_json_path: PathBuf,
    pub update_global_index: bool,
    pub streaming: bool,
    pub model_override: Option<String>,
    pub env_model: Option<String>,
    pub api_key: String,
    pub base_url: String,
    pub user_agent: Option<String>,
}

impl TurnSettings {
    pub fn from_cli(cli: Cli) -> Self {
        let conversation_id =
            resolve_conversation_id(cli.conversation_id.as_deref(), &cli.conversation_json_path);
        Self {
            message: cli.message,
            conversation_id,
            conversation_json_path: cli.conversation_json_path,
            global_json_path: cli.global_json_path,
            update_global_index: cli.update_global_index,
            streaming: !cli.no_stream,
            model_override: non_blank(cli.model),
            env_model: non_blank(env_var("DEDALUS_MODEL")),
            api_key: env_var("DEDALUS_API_KEY").unwrap_or_default(),
            base_url: non_blank(env_var("DEDALUS_API_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_DEDALUS_BASE_URL.to_owned()),
            user_agent: non_blank(env_var("DEDALUS_USER_AGENT")),
        }
    }

    /// Transport configuration for the resolved credentials and endpoint.
    pub fn api_config(&self) -> DedalusApiConfig {
        let mut config =
            DedalusApiConfig::new(self.api_key.trim()).with_base_url(self.base_url.clone());
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        config
    }
}

/// Conversation id from the flag when non-blank, else the bundle file stem.
pub fn resolve_conversation_id(flag: Option<&str>, bundle_path: &Path) -> String {
    match flag.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_owned(),
        None => bundle_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Model for this turn: explicit override, then `DEDALUS_MODEL`, then the
/// conversation's stored model, then the default.
///
/// A stored `openai/`-prefixed model is honored only when the override or
/// the environment re-requests it; otherwise it falls back to the default.
pub fn resolve_model(explicit: Option<&str>, env_model: Option<&str>, stored: &str) -> String {
    let explicit = explicit.map(str::trim).filter(|model| !model.is_empty());
    let env_model = env_model.map(str::trim).filter(|model| !model.is_empty());
    let stored = stored.trim();

    let chosen = match explicit.or(env_model) {
        Some(model) => model.to_owned(),
        None if stored.is_empty() => DEFAULT_MODEL_NAME.to_owned(),
        None => stored.to_owned(),
    };

    if chosen.starts_with("openai/") && explicit.is_none() && env_model.is_none() {
        return DEFAULT_MODEL_NAME.to_owned();
    }
    chosen
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
