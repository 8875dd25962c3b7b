use dedalus_api::chunk::update_from_payload;
use dedalus_api::{extract_text_fragments, map_finish_reason, tokens_from_choice, DedalusApiError};
use serde_json::json;

#[test]
fn fragment_extraction_recurses_nested_shapes_in_order() {
    let value = json!({
        "content": [
            {"text": "a"},
            {"value": ["b", {"output_text": "c"}]},
        ]
    });

    assert_eq!(extract_text_fragments(&value), vec!["a", "b", "c"]);
}

#[test]
fn fragment_extraction_drops_empty_strings_and_non_text_leaves() {
    let value = json!({"content": ["", 42, null, true, "x"]});
    assert_eq!(extract_text_fragments(&value), vec!["x"]);
}

#[test]
fn choice_tokens_prefer_delta_over_legacy_fields() {
    let choice = json!({
        "delta": {"content": "streamed"},
        "text": "ignored",
        "message": {"content": "ignored too"},
    });

    assert_eq!(tokens_from_choice(&choice), vec!["streamed"]);
}

#[test]
fn choice_tokens_fall_back_to_text_content_and_message() {
    let choice = json!({
        "text": "a",
        "content": "b",
        "message": {"content": "c"},
    });

    assert_eq!(tokens_from_choice(&choice), vec!["a", "b", "c"]);
}

#[test]
fn choice_tokens_accept_non_mapping_message_values() {
    let choice = json!({"message": "plain string"});
    assert_eq!(tokens_from_choice(&choice), vec!["plain string"]);
}

#[test]
fn choice_tokens_collapse_adjacent_duplicates() {
    let choice = json!({"delta": {"content": ["a", "a", "b"]}});
    assert_eq!(tokens_from_choice(&choice), vec!["a", "b"]);
}

#[test]
fn choice_tokens_keep_non_adjacent_repeats() {
    let choice = json!({"delta": {"content": ["a", "b", "a"]}});
    assert_eq!(tokens_from_choice(&choice), vec!["a", "b", "a"]);
}

#[test]
fn finish_reason_mapping_renames_known_values_and_passes_through_rest() {
    assert_eq!(map_finish_reason("content_filter"), "content-filter");
    assert_eq!(map_finish_reason("tool_calls"), "tool-calls");
    assert_eq!(map_finish_reason("stop"), "stop");
    assert_eq!(map_finish_reason("length"), "length");
}

#[test]
fn payload_update_collects_tokens_across_choices() {
    let update = update_from_payload(
        r#"{"choices":[{"delta":{"content":"Hel"}},{"delta":{"content":"lo"},"finish_reason":"length"}]}"#,
    )
    .expect("well-formed chunk should decode");

    assert_eq!(update.tokens, vec!["Hel", "lo"]);
    assert_eq!(update.finish_reason.as_deref(), Some("length"));
}

#[test]
fn payload_update_skips_malformed_json() {
    let update = update_from_payload("{not json").expect("malformed payloads are skipped");
    assert!(update.tokens.is_empty());
    assert!(update.finish_reason.is_none());
}

#[test]
fn payload_update_skips_non_object_chunks() {
    let update = update_from_payload(r#"["a","b"]"#).expect("non-object payloads are skipped");
    assert!(update.tokens.is_empty());
}

#[test]
fn payload_update_surfaces_in_band_error_message() {
    let result = update_from_payload(r#"{"error":{"message":"rate limited"}}"#);
    assert!(matches!(
        result,
        Err(DedalusApiError::Provider(message)) if message == "rate limited"
    ));
}

#[test]
fn payload_update_ignores_blank_error_message() {
    let update = update_from_payload(r#"{"error":{"message":"  "},"choices":[{"delta":{"content":"ok"}}]}"#)
        .expect("blank error messages do not abort");
    assert_eq!(update.tokens, vec!["ok"]);
}

#[test]
fn payload_update_falls_back_to_whole_chunk_extraction() {
    let update = update_from_payload(r#"{"output_text":"solo"}"#)
        .expect("chunks without a choice list extract from the chunk itself");
    assert_eq!(update.tokens, vec!["solo"]);
}

#[test]
fn payload_update_with_empty_choice_list_yields_nothing() {
    let update = update_from_payload(r#"{"choices":[],"content":"unreached"}"#)
        .expect("empty choice lists decode to an empty update");
    assert!(update.tokens.is_empty());
}

#[test]
fn payload_update_ignores_blank_finish_reason() {
    let update = update_from_payload(r#"{"choices":[{"finish_reason":""}]}"#)
        .expect("blank finish reasons are dropped");
    assert!(update.finish_reason.is_none());
}
