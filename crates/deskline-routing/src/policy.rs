//! Route policies for the two shipped rule-set versions
//!
//! A policy is configuration, not code: the rule ladder, the fallback
//! responder, and where the closing reply carries the termination
//! marker. Swapping policy versions swaps data only.

use crate::rule::RouteRule;
use deskline_core::{DesklineError, MarkerPlacement, ResponderId};
use serde::{Deserialize, Serialize};

/// A named, versioned routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePolicy {
    /// Policy name (e.g. "baseline@v0", "improved@v1")
    pub name: String,

    /// Ordered rule ladder, evaluated top to bottom
    pub rules: Vec<RouteRule>,

    /// Responder selected when no rule matches
    pub fallback: ResponderId,

    /// Where the closing reply carries the termination marker
    pub marker_placement: MarkerPlacement,
}

impl RoutePolicy {
    /// The v0 ladder. Keyword overlaps and the default-to-Search
    /// fallback are part of the contract here: evaluation runs must
    /// reproduce them, so they stay.
    pub fn baseline() -> Self {
        Self {
            name: "baseline@v0".to_string(),
            rules: vec![
                RouteRule::new(ResponderId::Closer)
                    .with_keywords(["bye", "goodbye", "end", "close", "finish"]),
                RouteRule::new(ResponderId::Search)
                    .with_keywords(["search", "find", "flight", "refund status", "booking id"]),
                RouteRule::new(ResponderId::Policy)
                    .with_keywords(["policy", "baggage", "allowance", "refund policy"])
                    .with_note("misses luggage phrasing"),
                RouteRule::new(ResponderId::Complaint)
                    .with_keywords(["complaint", "damage", "problem", "issue"]),
                RouteRule::new(ResponderId::Booking)
                    .with_keywords(["booking", "passenger", "details", "confirm"]),
            ],
            fallback: ResponderId::Search,
            marker_placement: MarkerPlacement::Start,
        }
    }

    /// The v1 ladder: disjoint keyword sets, complaint checked before
    /// policy so damage reports win over allowance questions, and the
    /// marker moved to the end of the closing reply. The fallback is
    /// still Search; no-match traffic remains visible as misrouting.
    pub fn improved() -> Self {
        Self {
            name: "improved@v1".to_string(),
            rules: vec![
                RouteRule::new(ResponderId::Closer)
                    .with_keywords(["bye", "goodbye", "end", "close", "finish"]),
                RouteRule::new(ResponderId::Complaint)
                    .with_keywords(["complaint", "damage", "damaged", "problem", "issue", "rude"]),
                RouteRule::new(ResponderId::Policy)
                    .with_keywords(["policy", "baggage", "luggage", "allowance", "terms"]),
                RouteRule::new(ResponderId::Booking)
                    .with_keywords(["passenger", "details", "confirm", "reservation"]),
                RouteRule::new(ResponderId::Search)
                    .with_keywords([
                        "search",
                        "find",
                        "flight",
                        "refund",
                        "availability",
                        "available",
                        "booking id",
                    ]),
            ],
            fallback: ResponderId::Search,
            marker_placement: MarkerPlacement::End,
        }
    }

    /// Get a policy by version name, defaulting to baseline.
    pub fn for_name(name: &str) -> Self {
        match name {
            "improved" => Self::improved(),
            _ => Self::baseline(),
        }
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Strict variant of `for_name`: unknown version names are an error.
impl std::str::FromStr for RoutePolicy {
    type Err = DesklineError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "improved" => Ok(Self::improved()),
            other => Err(DesklineError::Config(format!(
                "unknown policy version '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_shape() {
        let policy = RoutePolicy::baseline();
        assert_eq!(policy.rules.len(), 5);
        assert_eq!(policy.rules[0].responder, ResponderId::Closer);
        assert_eq!(policy.fallback, ResponderId::Search);
        assert_eq!(policy.marker_placement, MarkerPlacement::Start);
    }

    #[test]
    fn test_improved_marker_at_end() {
        let policy = RoutePolicy::improved();
        assert_eq!(policy.marker_placement, MarkerPlacement::End);
    }

    #[test]
    fn test_for_name_defaults_to_baseline() {
        assert_eq!(RoutePolicy::for_name("improved").name, "improved@v1");
        assert_eq!(RoutePolicy::for_name("nonsense").name, "baseline@v0");
    }

    #[test]
    fn test_strict_parse_rejects_unknown_versions() {
        assert!("baseline".parse::<RoutePolicy>().is_ok());
        let err = "v2".parse::<RoutePolicy>().unwrap_err();
        assert!(err.to_string().starts_with("CONFIG/"));
    }
}
