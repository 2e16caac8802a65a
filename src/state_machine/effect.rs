//! Effects produced by state transitions

use crate::llm::Message;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Push a message onto the history
    AppendMessage { message: Message },

    /// Schedule the `Tick` that sends a pending example
    ProcessPendingExample,

    /// Call the completion provider with `[system] + history`
    RequestCompletion,

    /// Hand one completed exchange to the log sink
    WriteLog {
        user_query: String,
        bot_response: String,
    },

    /// Show the assistant reply for this turn
    ShowResponse { text: String },

    /// Show the fixed apology for this turn only
    ShowApology,

    /// Empty the history
    ClearHistory,
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: Message::user(content),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: Message::assistant(content),
        }
    }
}
