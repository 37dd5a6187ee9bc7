//! Deskline Sim: scenario generation and conversation driving
//!
//! The runner is a composition point only: dispatch, respond, record,
//! append. Conversations run to completion one at a time; turns within a
//! conversation are strictly sequential.

pub mod runner;
pub mod scenario;

pub use runner::ConversationRunner;
pub use scenario::{ConversationPlan, ScenarioCatalog};
