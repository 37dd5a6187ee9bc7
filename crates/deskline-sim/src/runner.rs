//! Conversation Runner: drives turns through dispatch and response
//!
//! Pure sequencing: per turn, select a responder, get the reply and tool
//! calls, stamp latencies, append the record. The runner owns the
//! dispatcher and the responder bank, so their histories live and die
//! with it.

use std::time::Instant;

use tracing::{debug, info};

use deskline_agents::ResponderBank;
use deskline_core::{Message, Transcript, TurnRecord};
use deskline_routing::Dispatcher;

use crate::scenario::ConversationPlan;

pub struct ConversationRunner {
    dispatcher: Dispatcher,
    bank: ResponderBank,
}

impl ConversationRunner {
    pub fn new(dispatcher: Dispatcher, bank: ResponderBank) -> Self {
        Self { dispatcher, bank }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Drive one conversation to completion and return its transcript.
    pub fn run_conversation(&mut self, plan: ConversationPlan) -> Transcript {
        let mut transcript = Transcript::new(plan.ordinal, plan.scenario, plan.language);
        info!(
            ordinal = plan.ordinal,
            scenario = %plan.scenario,
            turns = plan.messages.len(),
            "running conversation"
        );

        for message in plan.messages {
            let record = self.run_turn(&transcript, message);
            debug!(turn = record.turn, responder = %record.responder, "turn complete");
            transcript.push_turn(record);
        }

        transcript
    }

    /// Drive a whole batch, one conversation at a time.
    pub fn run_batch(&mut self, plans: Vec<ConversationPlan>) -> Vec<Transcript> {
        plans
            .into_iter()
            .map(|plan| self.run_conversation(plan))
            .collect()
    }

    fn run_turn(&mut self, transcript: &Transcript, message: Message) -> TurnRecord {
        let started = Instant::now();

        let (responder, dispatch_latency) = self.dispatcher.select(&message, transcript.turns());
        let (reply, tool_calls) = self.bank.respond(responder, &message, transcript.turns());

        TurnRecord {
            conversation_id: transcript.conversation_id,
            turn: transcript.next_turn(),
            message,
            responder,
            reply,
            tool_calls,
            dispatch_latency,
            turn_latency: started.elapsed(),
            ts: chrono::Utc::now(),
        }
    }
}
