//! Session state types

use crate::llm::GenerationParams;
use serde::{Deserialize, Serialize};

/// Where a session is in its turn cycle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// Ready for input
    #[default]
    Idle,

    /// An example question was appended to history and is waiting for the
    /// follow-up tick that sends it
    PendingExample,

    /// A completion request is in flight for `query`
    AwaitingResponse { query: String },
}

impl SessionState {
    /// The pending-example flag, derived from the state
    pub fn pending_example(&self) -> bool {
        matches!(self, SessionState::PendingExample)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::PendingExample => "pending_example",
            SessionState::AwaitingResponse { .. } => "awaiting_response",
        }
    }
}

/// Immutable per-session context
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Correlates log entries. Survives `Clear`.
    pub conversation_id: String,
    /// Injected as the first request message, never stored in history
    pub system_prompt: String,
    pub params: GenerationParams,
}

impl SessionContext {
    pub fn new(
        conversation_id: impl Into<String>,
        system_prompt: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            system_prompt: system_prompt.into(),
            params,
        }
    }
}
