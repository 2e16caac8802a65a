//! Events that drive a session

use crate::llm::LlmErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit { text: String },
    ClickExample { question: String },
    Clear,

    /// Follow-up that sends a pending example question
    Tick,

    // Provider events
    Complete { response: String },
    Fail { kind: LlmErrorKind, message: String },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Submit { .. } => "submit",
            Event::ClickExample { .. } => "click_example",
            Event::Clear => "clear",
            Event::Tick => "tick",
            Event::Complete { .. } => "complete",
            Event::Fail { .. } => "fail",
        }
    }
}
