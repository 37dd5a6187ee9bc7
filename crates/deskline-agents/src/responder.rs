//! Responder contract and the closed responder bank
//!
//! The responder set is fixed: five variants, dispatched by exhaustive
//! match on `ResponderId`. A bank carries one instance of each, all of
//! the same backing generation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::completion::CompletionService;
use crate::completion_backed::CompletionResponder;
use crate::rules::{
    BookingResponder, CloserResponder, ComplaintResponder, PolicyResponder, SearchResponder,
};
use deskline_core::{MarkerPlacement, Message, ResponderId, ToolCallRequest, TurnRecord};

/// One logged responder exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub input: String,
    pub reply: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub at: DateTime<Utc>,
}

impl ResponseRecord {
    pub fn new(input: &str, reply: &str, tool_calls: &[ToolCallRequest]) -> Self {
        Self {
            input: input.to_string(),
            reply: reply.to_string(),
            tool_calls: tool_calls.to_vec(),
            at: Utc::now(),
        }
    }
}

/// A responder turns a customer message into a reply plus ordered
/// tool-call requests. Malformed input never errors: missing parameters
/// fall back to placeholders and the reply degrades to help text.
pub trait Responder: Send {
    fn id(&self) -> ResponderId;

    /// Produce the reply and tool calls for one turn. `context` is the
    /// read-only prior turn history of the conversation.
    fn respond(
        &mut self,
        message: &Message,
        context: &[TurnRecord],
    ) -> (String, Vec<ToolCallRequest>);

    /// Append-only exchange history of this instance.
    fn history(&self) -> &[ResponseRecord];
}

/// Exactly the five responders, same backing generation throughout.
pub struct ResponderBank {
    search: Box<dyn Responder>,
    policy: Box<dyn Responder>,
    complaint: Box<dyn Responder>,
    booking: Box<dyn Responder>,
    closer: Box<dyn Responder>,
}

impl ResponderBank {
    /// Rule-backed generation: deterministic keyword chains.
    pub fn rule_based(marker_placement: MarkerPlacement) -> Self {
        Self {
            search: Box::new(SearchResponder::new()),
            policy: Box::new(PolicyResponder::new()),
            complaint: Box::new(ComplaintResponder::new()),
            booking: Box::new(BookingResponder::new()),
            closer: Box::new(CloserResponder::new(marker_placement)),
        }
    }

    /// Completion-backed generation: replies come from the completion
    /// service, tool calls are recovered from the reply text.
    pub fn completion_backed(
        service: Arc<dyn CompletionService>,
        marker_placement: MarkerPlacement,
    ) -> Self {
        Self {
            search: Box::new(CompletionResponder::new(
                ResponderId::Search,
                service.clone(),
                marker_placement,
            )),
            policy: Box::new(CompletionResponder::new(
                ResponderId::Policy,
                service.clone(),
                marker_placement,
            )),
            complaint: Box::new(CompletionResponder::new(
                ResponderId::Complaint,
                service.clone(),
                marker_placement,
            )),
            booking: Box::new(CompletionResponder::new(
                ResponderId::Booking,
                service.clone(),
                marker_placement,
            )),
            closer: Box::new(CompletionResponder::new(
                ResponderId::Closer,
                service,
                marker_placement,
            )),
        }
    }

    /// Borrow the responder for an id. The match is exhaustive; an
    /// unknown id is unrepresentable.
    pub fn get_mut(&mut self, id: ResponderId) -> &mut dyn Responder {
        match id {
            ResponderId::Search => self.search.as_mut(),
            ResponderId::Policy => self.policy.as_mut(),
            ResponderId::Complaint => self.complaint.as_mut(),
            ResponderId::Booking => self.booking.as_mut(),
            ResponderId::Closer => self.closer.as_mut(),
        }
    }

    /// Convenience: route to the right responder and respond.
    pub fn respond(
        &mut self,
        id: ResponderId,
        message: &Message,
        context: &[TurnRecord],
    ) -> (String, Vec<ToolCallRequest>) {
        self.get_mut(id).respond(message, context)
    }
}
