//! Rule-backed responder generation
//!
//! Each responder is an ordered keyword chain over the lowercased
//! message: the first matching arm wins, the final arm is generic help
//! text. The chains carry the v0 responsibility overlaps on purpose:
//! the policy responder still answers refund-status queries with the
//! same tool call the search responder emits, and the booking responder
//! still checks availability. Evaluation runs measure exactly this.

use crate::extract::{extract_booking_id, PLACEHOLDER_BOOKING_ID};
use crate::responder::{Responder, ResponseRecord};
use deskline_core::{
    MarkerPlacement, Message, ResponderId, ToolCallRequest, TurnRecord, END_CALL_MARKER,
};

fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lowered.contains(k))
}

/// Flight searches and refund status, plus a slice of refund policy.
pub struct SearchResponder {
    history: Vec<ResponseRecord>,
}

impl SearchResponder {
    pub fn new() -> Self {
        Self { history: Vec::new() }
    }
}

impl Default for SearchResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for SearchResponder {
    fn id(&self) -> ResponderId {
        ResponderId::Search
    }

    fn respond(
        &mut self,
        message: &Message,
        _context: &[TurnRecord],
    ) -> (String, Vec<ToolCallRequest>) {
        let lowered = message.text.to_lowercase();

        let (reply, tool_calls) = if lowered.contains("refund status") || lowered.contains("booking id")
        {
            let booking_id = extract_booking_id(&message.text);
            (
                format!("I'll check the refund status for booking ID {booking_id}."),
                vec![ToolCallRequest::new("refund_status").with_param("booking_id", booking_id)],
            )
        } else if contains_any(&lowered, &["search", "find", "flight"]) {
            // Assumes default parameters instead of asking for the
            // missing origin/date/class.
            (
                "I'll search for flights with the default parameters.".to_string(),
                vec![ToolCallRequest::new("search_flights")
                    .with_param("origin", "BLR")
                    .with_param("destination", "DEL")
                    .with_param("date", "today")
                    .with_param("class", "economy")],
            )
        } else if lowered.contains("refund policy") {
            (
                "Refunds are processed within 5-7 business days. (search responder handling a policy query)"
                    .to_string(),
                vec![],
            )
        } else {
            (
                "I can help you with flight searches and refund status. What would you like to know?"
                    .to_string(),
                vec![],
            )
        };

        self.history
            .push(ResponseRecord::new(&message.text, &reply, &tool_calls));
        (reply, tool_calls)
    }

    fn history(&self) -> &[ResponseRecord] {
        &self.history
    }
}

/// Baggage and refund policies; also answers refund status with the
/// same tool call the search responder owns.
pub struct PolicyResponder {
    history: Vec<ResponseRecord>,
}

impl PolicyResponder {
    pub fn new() -> Self {
        Self { history: Vec::new() }
    }
}

impl Default for PolicyResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for PolicyResponder {
    fn id(&self) -> ResponderId {
        ResponderId::Policy
    }

    fn respond(
        &mut self,
        message: &Message,
        _context: &[TurnRecord],
    ) -> (String, Vec<ToolCallRequest>) {
        let lowered = message.text.to_lowercase();

        let (reply, tool_calls) = if contains_any(&lowered, &["baggage", "allowance"]) {
            (
                "Domestic flights allow 15kg check-in and 7kg cabin baggage. International flights allow 23kg check-in and 7kg cabin baggage."
                    .to_string(),
                vec![],
            )
        } else if lowered.contains("refund policy") {
            (
                "Refunds are processed within 5-7 business days. Processing fees may apply."
                    .to_string(),
                vec![],
            )
        } else if lowered.contains("refund status") {
            let booking_id = extract_booking_id(&message.text);
            (
                format!(
                    "I'll check the refund status for booking ID {booking_id}. (policy responder also handling this)"
                ),
                vec![ToolCallRequest::new("refund_status").with_param("booking_id", booking_id)],
            )
        } else if lowered.contains("booking") {
            (
                "I'll check your booking details directly.".to_string(),
                vec![ToolCallRequest::new("check_booking")
                    .with_param("booking_id", PLACEHOLDER_BOOKING_ID)],
            )
        } else {
            (
                "I can help you with policies and refund information. What would you like to know?"
                    .to_string(),
                vec![],
            )
        };

        self.history
            .push(ResponseRecord::new(&message.text, &reply, &tool_calls));
        (reply, tool_calls)
    }

    fn history(&self) -> &[ResponseRecord] {
        &self.history
    }
}

/// Damage reports and general complaints; drifts into refund territory.
pub struct ComplaintResponder {
    history: Vec<ResponseRecord>,
}

impl ComplaintResponder {
    pub fn new() -> Self {
        Self { history: Vec::new() }
    }
}

impl Default for ComplaintResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for ComplaintResponder {
    fn id(&self) -> ResponderId {
        ResponderId::Complaint
    }

    fn respond(
        &mut self,
        message: &Message,
        _context: &[TurnRecord],
    ) -> (String, Vec<ToolCallRequest>) {
        let lowered = message.text.to_lowercase();

        let (reply, tool_calls) = if contains_any(&lowered, &["damage", "luggage"]) {
            (
                "I'm sorry to hear about the luggage damage. I'll file a complaint for you."
                    .to_string(),
                vec![ToolCallRequest::new("file_complaint")
                    .with_param("type", "luggage_damage")
                    .with_param("description", message.text.clone())],
            )
        } else if contains_any(&lowered, &["complaint", "problem", "issue", "bad"]) {
            (
                "I understand your concern. I'll file a complaint and have someone follow up with you."
                    .to_string(),
                vec![ToolCallRequest::new("file_complaint")
                    .with_param("type", "general")
                    .with_param("description", message.text.clone())],
            )
        } else if lowered.contains("refund") {
            (
                "I can help you with refund status. Let me check that for you. (complaint responder handling a refund)"
                    .to_string(),
                vec![],
            )
        } else {
            (
                "I'm here to help with complaints and issues. Please tell me what happened."
                    .to_string(),
                vec![],
            )
        };

        self.history
            .push(ResponseRecord::new(&message.text, &reply, &tool_calls));
        (reply, tool_calls)
    }

    fn history(&self) -> &[ResponseRecord] {
        &self.history
    }
}

/// Passenger details and confirmations; also checks availability even
/// though search owns that domain.
pub struct BookingResponder {
    history: Vec<ResponseRecord>,
}

impl BookingResponder {
    pub fn new() -> Self {
        Self { history: Vec::new() }
    }
}

impl Default for BookingResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for BookingResponder {
    fn id(&self) -> ResponderId {
        ResponderId::Booking
    }

    fn respond(
        &mut self,
        message: &Message,
        _context: &[TurnRecord],
    ) -> (String, Vec<ToolCallRequest>) {
        let lowered = message.text.to_lowercase();

        let (reply, tool_calls) = if contains_any(&lowered, &["passenger", "details", "name", "contact"])
        {
            (
                "I'll retrieve the passenger details for your booking.".to_string(),
                vec![ToolCallRequest::new("get_passenger_details")
                    .with_param("booking_id", PLACEHOLDER_BOOKING_ID)],
            )
        } else if contains_any(&lowered, &["confirm", "confirmation"]) {
            (
                "I'll confirm your booking details.".to_string(),
                vec![ToolCallRequest::new("confirm_booking")
                    .with_param("booking_id", PLACEHOLDER_BOOKING_ID)],
            )
        } else if contains_any(&lowered, &["available", "availability"]) {
            (
                "I'll check flight availability for you. (booking responder handling availability)"
                    .to_string(),
                vec![ToolCallRequest::new("check_availability")
                    .with_param("route", "BLR-DEL")
                    .with_param("date", "today")],
            )
        } else {
            (
                "I can help you with booking details and confirmations. What do you need?"
                    .to_string(),
                vec![],
            )
        };

        self.history
            .push(ResponseRecord::new(&message.text, &reply, &tool_calls));
        (reply, tool_calls)
    }

    fn history(&self) -> &[ResponseRecord] {
        &self.history
    }
}

/// Closes conversations with a fixed reply. Marker placement comes from
/// the active policy configuration.
pub struct CloserResponder {
    marker_placement: MarkerPlacement,
    history: Vec<ResponseRecord>,
}

impl CloserResponder {
    pub fn new(marker_placement: MarkerPlacement) -> Self {
        Self {
            marker_placement,
            history: Vec::new(),
        }
    }
}

/// Attach the termination marker at the configured side of the reply.
pub fn place_marker(body: &str, placement: MarkerPlacement) -> String {
    match placement {
        MarkerPlacement::Start => format!("{END_CALL_MARKER} {body}"),
        MarkerPlacement::End => format!("{body} {END_CALL_MARKER}"),
    }
}

impl Responder for CloserResponder {
    fn id(&self) -> ResponderId {
        ResponderId::Closer
    }

    fn respond(
        &mut self,
        message: &Message,
        _context: &[TurnRecord],
    ) -> (String, Vec<ToolCallRequest>) {
        let reply = place_marker(
            "Thank you for contacting us. Have a great day!",
            self.marker_placement,
        );
        let tool_calls = Vec::new();

        self.history
            .push(ResponseRecord::new(&message.text, &reply, &tool_calls));
        (reply, tool_calls)
    }

    fn history(&self) -> &[ResponseRecord] {
        &self.history
    }
}
