//! Completion-service boundary
//!
//! The natural-language completion service is an external collaborator:
//! a fallible synchronous call carrying role-tagged fragments and a
//! maximum output length. Failures never cross this boundary; callers
//! get the fixed fallback reply instead. No retries.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Fixed reply used whenever the completion service fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble processing your request right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One role-tagged message fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A single completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Ordered role-tagged fragments
    pub messages: Vec<ChatMessage>,
    /// Maximum output length in tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, max_tokens: u32) -> Self {
        Self {
            messages,
            max_tokens,
        }
    }
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("TRANSPORT/{0}")]
    Transport(String),

    #[error("PARSE/{0}")]
    Parse(String),

    #[error("TIMEOUT/{0}ms")]
    Timeout(u64),
}

/// The external completion service, seen from inside the engine.
/// Implementations must bound their own timeout; the engine never waits
/// unbounded and never retries.
pub trait CompletionService: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Run a completion, absorbing any failure into the fixed fallback.
pub fn complete_or_fallback(service: &dyn CompletionService, request: &CompletionRequest) -> String {
    match service.complete(request) {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "completion failed, using fallback reply");
            FALLBACK_REPLY.to_string()
        }
    }
}

/// Canned completion service for tests and offline runs. Replies are
/// consumed in order; an exhausted script fails, which exercises the
/// fallback path.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedCompletion {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    /// A service that fails every call.
    pub fn failing() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl CompletionService for ScriptedCompletion {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| CompletionError::Transport("script lock poisoned".to_string()))?;
        replies
            .pop_front()
            .ok_or_else(|| CompletionError::Transport("script exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replies_in_order() {
        let service = ScriptedCompletion::new(["first", "second"]);
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")], 20);

        assert_eq!(service.complete(&request).unwrap(), "first");
        assert_eq!(service.complete(&request).unwrap(), "second");
        assert!(service.complete(&request).is_err());
    }

    #[test]
    fn test_fallback_absorbs_failure() {
        let service = ScriptedCompletion::failing();
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")], 20);

        assert_eq!(complete_or_fallback(&service, &request), FALLBACK_REPLY);
    }

    #[test]
    fn test_error_display_prefixes() {
        assert!(CompletionError::Transport("down".into())
            .to_string()
            .starts_with("TRANSPORT/"));
        assert_eq!(CompletionError::Timeout(500).to_string(), "TIMEOUT/500ms");
    }
}
