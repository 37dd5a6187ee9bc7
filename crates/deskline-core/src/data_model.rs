//! Data Model: Message, ToolCallRequest, TurnRecord, Transcript
//!
//! Records are created once per turn and never mutated afterwards; a
//! transcript's turn indices are 1-based and contiguous.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Literal token signaling conversation end.
pub const END_CALL_MARKER: &str = "<END_CALL>";

/// The closed responder set. There is no open-ended registration:
/// every dispatch decision lands on exactly one of these five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponderId {
    Search,
    Policy,
    Complaint,
    Booking,
    Closer,
}

impl ResponderId {
    /// All responders, in dispatch-priority order of the baseline policy.
    pub const ALL: [ResponderId; 5] = [
        ResponderId::Search,
        ResponderId::Policy,
        ResponderId::Complaint,
        ResponderId::Booking,
        ResponderId::Closer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponderId::Search => "search",
            ResponderId::Policy => "policy",
            ResponderId::Complaint => "complaint",
            ResponderId::Booking => "booking",
            ResponderId::Closer => "closer",
        }
    }
}

impl fmt::Display for ResponderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ground-truth scenario category. Used only for scoring; the
/// dispatcher's rule evaluation never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    RefundStatus,
    RefundPolicy,
    FlightSearch,
    BaggagePolicy,
    Complaint,
    BookingDetails,
    Mixed,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::RefundStatus => "refund_status",
            Category::RefundPolicy => "refund_policy",
            Category::FlightSearch => "flight_search",
            Category::BaggagePolicy => "baggage_policy",
            Category::Complaint => "complaint",
            Category::BookingDetails => "booking_details",
            Category::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared conversation language. Non-English variants carry the fixed
/// indicator tokens the language-consistency metric looks for in replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
}

impl Language {
    /// Indicator tokens for the reply-side language check. Empty for the
    /// default language, which always passes.
    pub fn indicator_tokens(&self) -> &'static [&'static str] {
        match self {
            Language::English => &[],
            Language::Spanish => &["hola", "gracias", "reembolso", "vuelo"],
            Language::French => &["bonjour", "merci", "remboursement", "vol"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Spanish => write!(f, "spanish"),
            Language::French => write!(f, "french"),
        }
    }
}

/// Where the active policy expects the termination marker in a closing
/// reply. The baseline policy places it at the start, the improved
/// policy at the end; the check is configuration, never hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarkerPlacement {
    #[default]
    Start,
    End,
}

/// One incoming customer message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Raw customer text
    pub text: String,
    /// Declared language, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    /// Ground-truth category label (scoring only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            category: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
}

/// A structured side-effect request extracted from a reply.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Action identifier (e.g. "refund_status")
    pub action: String,
    /// Parameter mapping; may be empty
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

impl ToolCallRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Structural validity: a non-empty action identifier plus a
    /// parameter mapping (possibly empty). Semantics are not checked.
    pub fn is_structurally_valid(&self) -> bool {
        !self.action.trim().is_empty()
    }
}

/// Everything recorded about a single turn. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Owning conversation
    pub conversation_id: Uuid,
    /// 1-based, contiguous within the transcript
    pub turn: u32,
    /// The customer message that opened the turn
    pub message: Message,
    /// The responder the dispatcher selected
    pub responder: ResponderId,
    /// Responder reply text
    pub reply: String,
    /// Ordered tool-call requests emitted with the reply
    pub tool_calls: Vec<ToolCallRequest>,
    /// Wall-clock duration of rule evaluation
    pub dispatch_latency: Duration,
    /// Wall-clock duration of the whole turn
    pub turn_latency: Duration,
    pub ts: DateTime<Utc>,
}

/// The ordered turn history of one simulated conversation. Turn order is
/// significant for flow checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub conversation_id: Uuid,
    /// Display ordinal within a batch (the batch runner numbers from 1)
    pub ordinal: u32,
    /// Scenario label for the whole conversation
    pub scenario: Category,
    /// Declared conversation language
    pub language: Language,
    pub turns: Vec<TurnRecord>,
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    pub fn new(ordinal: u32, scenario: Category, language: Language) -> Self {
        Self {
            conversation_id: Uuid::new_v4(),
            ordinal,
            scenario,
            language,
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Index the next turn record should carry.
    pub fn next_turn(&self) -> u32 {
        self.turns.len() as u32 + 1
    }

    /// Append a turn. Indices must stay 1-based and contiguous.
    pub fn push_turn(&mut self, record: TurnRecord) {
        debug_assert_eq!(record.turn, self.next_turn(), "turn indices must be contiguous");
        self.turns.push(record);
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(transcript: &Transcript, responder: ResponderId) -> TurnRecord {
        TurnRecord {
            conversation_id: transcript.conversation_id,
            turn: transcript.next_turn(),
            message: Message::new("hello"),
            responder,
            reply: "hi".to_string(),
            tool_calls: vec![],
            dispatch_latency: Duration::from_micros(5),
            turn_latency: Duration::from_micros(50),
            ts: Utc::now(),
        }
    }

    #[test]
    fn test_tool_call_validity() {
        let call = ToolCallRequest::new("refund_status").with_param("booking_id", 456);
        assert!(call.is_structurally_valid());

        let empty_params = ToolCallRequest::new("confirm_booking");
        assert!(empty_params.is_structurally_valid());

        let blank = ToolCallRequest::new("  ");
        assert!(!blank.is_structurally_valid());
    }

    #[test]
    fn test_transcript_turn_indices() {
        let mut transcript = Transcript::new(1, Category::FlightSearch, Language::English);
        assert_eq!(transcript.next_turn(), 1);

        transcript.push_turn(record(&transcript, ResponderId::Search));
        transcript.push_turn(record(&transcript, ResponderId::Search));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[1].turn, 2);
    }

    #[test]
    fn test_language_indicators() {
        assert!(Language::English.indicator_tokens().is_empty());
        assert!(Language::Spanish.indicator_tokens().contains(&"gracias"));
        assert!(Language::French.indicator_tokens().contains(&"merci"));
    }

    #[test]
    fn test_responder_display() {
        assert_eq!(ResponderId::Search.to_string(), "search");
        assert_eq!(ResponderId::ALL.len(), 5);
    }

    #[test]
    fn test_message_builder() {
        let message = Message::new("Find me a flight")
            .with_language(Language::English)
            .with_category(Category::FlightSearch);
        assert_eq!(message.category, Some(Category::FlightSearch));
    }
}
