//! Completion-backed responder generation
//!
//! Same contract as the rule-backed chains, but the reply text comes
//! from the completion service and tool calls are recovered from the
//! reply afterwards. Service failures degrade to the fixed fallback
//! reply; they never fail the turn.

use std::sync::Arc;

use crate::completion::{
    complete_or_fallback, ChatMessage, CompletionRequest, CompletionService,
};
use crate::extract::extract_tool_calls;
use crate::responder::{Responder, ResponseRecord};
use deskline_core::{MarkerPlacement, Message, ResponderId, ToolCallRequest, TurnRecord};

/// Output budget for closing replies is tighter; everything else gets
/// room for a tool-call marker plus a sentence or two.
fn max_tokens_for(id: ResponderId) -> u32 {
    match id {
        ResponderId::Closer => 100,
        _ => 150,
    }
}

fn role_prompt(id: ResponderId, marker_placement: MarkerPlacement) -> String {
    let tool_format = "Use the <CALL_TOOL=action>{\"param\":\"value\"} format when a tool call is needed.";
    match id {
        ResponderId::Search => format!(
            "You are the search responder for an airline support desk. You handle flight \
             searches, refund status queries, and sometimes refund policies. If details are \
             missing, assume defaults (economy, today's date). {tool_format}"
        ),
        ResponderId::Policy => format!(
            "You are the policy responder for an airline support desk. You handle refund \
             policies, baggage allowances, and refund status. If unsure, you may also check \
             bookings directly. {tool_format}"
        ),
        ResponderId::Complaint => format!(
            "You are the complaint responder for an airline support desk. You handle damaged \
             luggage and complaints. If a refund comes up, you may also answer refund status. \
             {tool_format}"
        ),
        ResponderId::Booking => format!(
            "You are the booking responder for an airline support desk. You handle passenger \
             details and confirmations. If the customer asks about availability, you may also \
             handle it. {tool_format}"
        ),
        ResponderId::Closer => {
            let placement = match marker_placement {
                MarkerPlacement::Start => "start",
                MarkerPlacement::End => "end",
            };
            format!(
                "You are the closing responder for an airline support desk. You close \
                 conversations politely. Place <END_CALL> at the {placement} of your final \
                 message."
            )
        }
    }
}

/// One responder variant backed by the completion service.
pub struct CompletionResponder {
    id: ResponderId,
    prompt: String,
    service: Arc<dyn CompletionService>,
    history: Vec<ResponseRecord>,
}

impl CompletionResponder {
    pub fn new(
        id: ResponderId,
        service: Arc<dyn CompletionService>,
        marker_placement: MarkerPlacement,
    ) -> Self {
        Self {
            id,
            prompt: role_prompt(id, marker_placement),
            service,
            history: Vec::new(),
        }
    }
}

impl Responder for CompletionResponder {
    fn id(&self) -> ResponderId {
        self.id
    }

    fn respond(
        &mut self,
        message: &Message,
        _context: &[TurnRecord],
    ) -> (String, Vec<ToolCallRequest>) {
        let request = CompletionRequest::new(
            vec![
                ChatMessage::system(self.prompt.clone()),
                ChatMessage::user(message.text.clone()),
            ],
            max_tokens_for(self.id),
        );

        let reply = complete_or_fallback(self.service.as_ref(), &request);
        let tool_calls = extract_tool_calls(&reply);

        self.history
            .push(ResponseRecord::new(&message.text, &reply, &tool_calls));
        (reply, tool_calls)
    }

    fn history(&self) -> &[ResponseRecord] {
        &self.history
    }
}
