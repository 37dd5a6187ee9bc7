//! Dispatcher: first-match-wins rule evaluation with a decision trail
//!
//! `select` is pure rule evaluation over the message text; no I/O
//! happens inside it, and an empty message simply falls through to the
//! policy fallback. Every decision is appended to an instance-owned
//! history so harnesses and tests run with independent trails.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::policy::RoutePolicy;
use deskline_core::{Message, ResponderId, TurnRecord};

/// One logged routing decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    pub message: String,
    pub responder: ResponderId,
    pub latency: Duration,
    pub at: DateTime<Utc>,
}

/// Selects exactly one responder per incoming message.
pub struct Dispatcher {
    policy: RoutePolicy,
    history: Vec<RouteDecision>,
}

impl Dispatcher {
    pub fn new(policy: RoutePolicy) -> Self {
        Self {
            policy,
            history: Vec::new(),
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Route a message. `context` is the read-only prior turn history of
    /// the same conversation; rule evaluation does not consult it yet,
    /// but the seam is where multi-turn routing would thread through.
    ///
    /// Returns the selected responder and the wall-clock duration of the
    /// rule evaluation.
    pub fn select(&mut self, message: &Message, _context: &[TurnRecord]) -> (ResponderId, Duration) {
        let started = Instant::now();
        let lowered = message.text.to_lowercase();

        let responder = self
            .policy
            .rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.responder)
            .unwrap_or(self.policy.fallback);

        let latency = started.elapsed();
        debug!(responder = %responder, policy = %self.policy.name, "route decision");

        self.history.push(RouteDecision {
            message: message.text.clone(),
            responder,
            latency,
            at: Utc::now(),
        });

        (responder, latency)
    }

    /// Append-only decision trail, in arrival order.
    pub fn history(&self) -> &[RouteDecision] {
        &self.history
    }
}
