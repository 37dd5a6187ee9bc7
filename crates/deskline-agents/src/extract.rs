//! Lossy extraction of structured data from free text
//!
//! Booking identifiers come from the first contiguous digit run in a
//! message; tool calls come from `<CALL_TOOL=action>{...}` markers in a
//! generated reply. Both are string-pattern extraction, not parsing:
//! only a fixed action set is recognized, and anything malformed
//! degrades to a placeholder or an empty parameter map rather than an
//! error.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use deskline_core::ToolCallRequest;

/// Booking id used when a message carries no digit run.
pub const PLACEHOLDER_BOOKING_ID: i64 = 12345;

/// Action identifiers the extraction layer recognizes. Markers naming
/// anything else are dropped.
pub const RECOGNIZED_ACTIONS: &[&str] = &[
    "refund_status",
    "search_flights",
    "check_booking",
    "file_complaint",
    "get_passenger_details",
    "confirm_booking",
    "check_availability",
];

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static pattern"));

static CALL_TOOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<CALL_TOOL=([a-z_]+)>").expect("static pattern"));

/// First contiguous digit run in the message, or the placeholder.
pub fn extract_booking_id(text: &str) -> i64 {
    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(PLACEHOLDER_BOOKING_ID)
}

/// Recover tool-call requests from a generated reply.
///
/// Each `<CALL_TOOL=action>` marker with a recognized action yields one
/// request; the parameter map comes from the JSON object literal
/// immediately following the marker, and degrades to empty when that
/// literal is missing or malformed.
pub fn extract_tool_calls(reply: &str) -> Vec<ToolCallRequest> {
    let mut calls = Vec::new();

    for captures in CALL_TOOL.captures_iter(reply) {
        let action = &captures[1];
        if !RECOGNIZED_ACTIONS.contains(&action) {
            continue;
        }

        let marker_end = captures
            .get(0)
            .map(|m| m.end())
            .unwrap_or(reply.len());
        let params = leading_json_object(&reply[marker_end..])
            .and_then(|obj| serde_json::from_str::<HashMap<String, serde_json::Value>>(&obj).ok())
            .unwrap_or_default();

        calls.push(ToolCallRequest {
            action: action.to_string(),
            params,
        });
    }

    calls
}

/// Extract the first top-level JSON object at the start of `text`,
/// tolerating leading whitespace. Brace-depth scan, no parsing.
fn leading_json_object(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }

    let mut depth: i32 = 0;
    for (idx, ch) in trimmed.char_indices() {
        if ch == '{' {
            depth += 1;
        } else if ch == '}' {
            depth -= 1;
            if depth == 0 {
                return Some(trimmed[..=idx].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_first_digit_run() {
        assert_eq!(extract_booking_id("refund for booking 789 please"), 789);
        assert_eq!(extract_booking_id("bookings 456 and 999"), 456);
    }

    #[test]
    fn test_booking_id_placeholder() {
        assert_eq!(
            extract_booking_id("when will I get my refund?"),
            PLACEHOLDER_BOOKING_ID
        );
    }

    #[test]
    fn test_extract_single_tool_call() {
        let reply = r#"Checking now. <CALL_TOOL=refund_status>{"booking_id": 456}"#;
        let calls = extract_tool_calls(reply);

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].action, "refund_status");
        assert_eq!(calls[0].params["booking_id"], 456);
    }

    #[test]
    fn test_unrecognized_action_is_dropped() {
        let reply = r#"<CALL_TOOL=launch_rockets>{"count": 3}"#;
        assert!(extract_tool_calls(reply).is_empty());
    }

    #[test]
    fn test_malformed_json_degrades_to_empty_params() {
        let reply = "<CALL_TOOL=confirm_booking>{not json";
        let calls = extract_tool_calls(reply);

        assert_eq!(calls.len(), 1);
        assert!(calls[0].params.is_empty());
        assert!(calls[0].is_structurally_valid());
    }

    #[test]
    fn test_multiple_markers_preserve_order() {
        let reply = concat!(
            r#"<CALL_TOOL=refund_status>{"booking_id": 1} and also "#,
            r#"<CALL_TOOL=check_availability>{"route": "BLR-DEL"}"#,
        );
        let calls = extract_tool_calls(reply);

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].action, "refund_status");
        assert_eq!(calls[1].action, "check_availability");
    }

    #[test]
    fn test_nested_object_literal() {
        let reply = r#"<CALL_TOOL=file_complaint>{"type": "general", "detail": {"area": "staff"}}"#;
        let calls = extract_tool_calls(reply);

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].params["type"], "general");
    }
}
