//! Individual route rules
//!
//! A rule is a record: keyword set -> responder. The dispatcher walks an
//! ordered ladder of these and the first hit wins, so rule order IS the
//! routing priority.

use deskline_core::ResponderId;
use serde::{Deserialize, Serialize};

/// A single routing rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    /// Responder selected when this rule matches
    pub responder: ResponderId,

    /// Keywords checked by case-insensitive substring search.
    /// Stored lowercased.
    pub keywords: Vec<String>,

    /// Optional note on known weaknesses of the rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RouteRule {
    /// Create a new rule
    pub fn new(responder: ResponderId) -> Self {
        Self {
            responder,
            keywords: Vec::new(),
            note: None,
        }
    }

    /// Set the keyword set (lowercased on the way in)
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();
        self
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check the rule against already-lowercased message text.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}
