//! API request and response types

use crate::citation::format_citations;
use crate::llm::{Message, MessageRole};
use crate::runtime::{ConversationSession, LlmService, LogSink, Reply};
use serde::{Deserialize, Serialize};

/// Typed user input
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Example-question click
#[derive(Debug, Deserialize)]
pub struct ExampleRequest {
    pub question: String,
}

/// One history message as displayed
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub role: MessageRole,
    pub content: String,
}

impl MessageView {
    /// Assistant content is citation-formatted; user content is shown as typed
    pub fn render(message: &Message) -> Self {
        let content = match message.role {
            MessageRole::Assistant => format_citations(&message.content),
            MessageRole::User | MessageRole::System => message.content.clone(),
        };
        Self {
            role: message.role,
            content,
        }
    }
}

/// Displayable snapshot of a session
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    pub state: &'static str,
    pub pending_example: bool,
    pub messages: Vec<MessageView>,
}

impl SessionView {
    pub fn of<L: LlmService, S: LogSink>(session: &ConversationSession<L, S>) -> Self {
        Self {
            id: session.id().to_string(),
            state: session.state().name(),
            pending_example: session.pending_example(),
            messages: session.history().iter().map(MessageView::render).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplyView {
    pub content: String,
    pub is_error: bool,
}

impl From<Reply> for ReplyView {
    fn from(reply: Reply) -> Self {
        Self {
            content: reply.content,
            is_error: reply.is_error,
        }
    }
}

/// Response to a chat or example turn
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub reply: Option<ReplyView>,
    pub session: SessionView,
}

/// Response for simple success operations
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
