//! Deskline Core: data model and unified error type
//!
//! Shared types for the dispatch-and-score engine: customer messages,
//! tool-call requests, turn records, transcripts, and the closed
//! responder set.

pub mod data_model;
pub mod error;

pub use data_model::{
    Category, Language, MarkerPlacement, Message, ResponderId, ToolCallRequest, Transcript,
    TurnRecord, END_CALL_MARKER,
};
pub use error::DesklineError;

/// Engine version reported in summaries
pub const DESKLINE_VERSION: &str = "1.0.0";
