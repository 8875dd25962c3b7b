//! From stored bundle to API-ready message list.

use dedalus_api::{RequestMessage, Role};

use crate::bundle::Bundle;

/// Fallback system instruction for bundles that carry none.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Verdant, an eco-conscious AI assistant. You are knowledgeable, helpful, and thoughtful.\n\
You have a warm, grounded personality inspired by nature and sustainability.\n\
When appropriate, you weave in eco-friendly perspectives without being preachy.\n\
You provide clear, well-structured responses with practical advice.\n\
You are capable of helping with coding, writing, analysis, brainstorming, and any general knowledge questions.\n\
Always be concise yet thorough. Use markdown formatting when it helps clarity.";

/// The system prompt a request should carry: the bundle's own when it trims
/// to something non-blank, else the default persona.
pub fn effective_system_prompt(bundle: &Bundle) -> &str {
    match bundle.system_prompt.as_deref().map(str::trim) {
        Some(prompt) if !prompt.is_empty() => prompt,
        _ => DEFAULT_SYSTEM_PROMPT,
    }
}

/// Convert a bundle into the ordered message list for a completion request.
///
/// The system prompt leads. Stored messages contribute only when their role
/// is one the API accepts and their text is non-blank; the text of accepted
/// messages is carried verbatim.
pub fn to_request_messages(bundle: &Bundle) -> Vec<RequestMessage> {
    let mut messages = vec![RequestMessage::system(effective_system_prompt(bundle))];

    for stored in &bundle.messages {
        let Some(role) = Role::parse(&stored.role) else {
            continue;
        };
        if stored.text.trim().is_empty() {
            continue;
        }
        messages.push(RequestMessage::new(role, stored.text.clone()));
    }

    messages
}

/// Append the latest user turn unless it already trails the list.
///
/// Blank input is a no-op. Calling this twice with the same trimmed text
/// leaves a single trailing user message.
pub fn ensure_latest_user(messages: &mut Vec<RequestMessage>, user_text: &str) {
    let user_text = user_text.trim();
    if user_text.is_empty() {
        return;
    }

    if let Some(last) = messages.last() {
        if last.role == Role::User && last.content.trim() == user_text {
            return;
        }
    }

    messages.push(RequestMessage::user(user_text));
}
