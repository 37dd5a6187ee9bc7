//! Deskline Agents: responder contract and the two backing generations
//!
//! A responder turns a customer message into a reply plus zero or more
//! tool-call requests. Two generations satisfy the same contract: the
//! rule-backed chains and the completion-backed variant that recovers
//! tool calls from generated text. Which one a bank carries is a
//! constructor choice, not a code path.

pub mod completion;
pub mod completion_backed;
pub mod extract;
pub mod responder;
pub mod rules;

pub use completion::{
    ChatMessage, ChatRole, CompletionError, CompletionRequest, CompletionService,
    ScriptedCompletion, FALLBACK_REPLY,
};
pub use completion_backed::CompletionResponder;
pub use extract::{extract_booking_id, extract_tool_calls, PLACEHOLDER_BOOKING_ID};
pub use responder::{Responder, ResponderBank, ResponseRecord};
