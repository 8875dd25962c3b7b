//! Display titles derived from `conversation<digits>` ids.

use std::sync::OnceLock;

use regex::Regex;

fn conversation_id_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)^conversation(\d+)$").expect("conversation id regex must compile")
    })
}

/// Numeric suffix of a `conversation<digits>` id, matched case-insensitively.
///
/// Digit runs that do not fit in `u64` are treated as non-matching.
pub fn conversation_digits(id: &str) -> Option<u64> {
    let captures = conversation_id_regex().captures(id)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Display title for a conversation id with no stored name.
pub fn default_title(id: &str) -> String {
    match conversation_digits(id) {
        Some(index) => format!("Conversation {index}"),
        None => id.to_owned(),
    }
}

/// Normalize a raw display name against its conversation id.
///
/// Blank names fall back to [`default_title`]. Names that are themselves a
/// `conversation<digits>` id become `Conversation <n>` with leading zeros
/// dropped. Anything else is kept trimmed.
pub fn normalize_title(raw_name: &str, id: &str) -> String {
    let trimmed = raw_name.trim();
    if trimmed.is_empty() {
        return default_title(id);
    }
    match conversation_digits(trimmed) {
        Some(index) => format!("Conversation {index}"),
        None => trimmed.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_require_the_full_id_shape() {
        assert_eq!(conversation_digits("conversation12"), Some(12));
        assert_eq!(conversation_digits("Conversation007"), Some(7));
        assert_eq!(conversation_digits("conversation"), None);
        assert_eq!(conversation_digits("conversation12b"), None);
        assert_eq!(conversation_digits("chat12"), None);
    }

    #[test]
    fn oversized_digit_runs_do_not_match() {
        assert_eq!(conversation_digits("conversation99999999999999999999"), None);
    }
}
