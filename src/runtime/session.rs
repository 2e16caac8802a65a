//! Conversation session: owns history and state, executes effects

use super::traits::{LlmService, LogSink};
use crate::audit_log::LogEntry;
use crate::citation::format_citations;
use crate::llm::{LlmRequest, Message};
use crate::state_machine::{
    transition, Effect, Event, SessionContext, SessionState, TransitionError,
};
use std::collections::VecDeque;
use std::time::Instant;

/// Shown in place of a reply when the provider fails. Never stored.
pub const APOLOGY: &str =
    "I'm sorry, I encountered an error processing your request. Please try again later.";

/// What the user sees for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Citation-formatted for display
    pub content: String,
    pub is_error: bool,
}

/// Result of handling one user event
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: Option<Reply>,
}

/// One user's chat. Events are handled one at a time; the provider call is
/// awaited inline, so a session is never re-entered mid-turn.
pub struct ConversationSession<L: LlmService, S: LogSink> {
    context: SessionContext,
    state: SessionState,
    history: Vec<Message>,
    llm: L,
    sink: S,
    last_activity: Instant,
}

impl<L: LlmService, S: LogSink> ConversationSession<L, S> {
    pub fn new(context: SessionContext, llm: L, sink: S) -> Self {
        Self {
            context,
            state: SessionState::Idle,
            history: Vec::new(),
            llm,
            sink,
            last_activity: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.context.conversation_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn pending_example(&self) -> bool {
        self.state.pending_example()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Mark the session as in use
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Typed input
    pub async fn submit(&mut self, text: impl Into<String>) -> Result<TurnOutcome, TransitionError> {
        self.handle_event(Event::Submit { text: text.into() }).await
    }

    /// Example-question click. The follow-up tick runs within the same call.
    pub async fn click_example(
        &mut self,
        question: impl Into<String>,
    ) -> Result<TurnOutcome, TransitionError> {
        self.handle_event(Event::ClickExample {
            question: question.into(),
        })
        .await
    }

    /// Empty the history. The conversation id is kept.
    pub async fn clear(&mut self) -> Result<(), TransitionError> {
        self.handle_event(Event::Clear).await.map(|_| ())
    }

    /// Run an event and every event its effects produce until the session
    /// settles.
    pub async fn handle_event(&mut self, event: Event) -> Result<TurnOutcome, TransitionError> {
        let mut outcome = TurnOutcome::default();
        let mut pending = VecDeque::from([event]);

        while let Some(current) = pending.pop_front() {
            if let Event::Fail { kind, message } = &current {
                tracing::warn!(
                    conv_id = %self.context.conversation_id,
                    kind = kind.as_str(),
                    error = %message,
                    "Completion failed, showing apology"
                );
            }

            let event_name = current.name();
            let result = transition(&self.state, &self.history, current).inspect_err(|e| {
                tracing::debug!(
                    conv_id = %self.context.conversation_id,
                    state = self.state.name(),
                    event = event_name,
                    error = %e,
                    "Transition rejected"
                );
            })?;

            self.state = result.new_state;

            for effect in result.effects {
                if let Some(next) = self.execute_effect(effect, &mut outcome).await {
                    pending.push_back(next);
                }
            }
        }

        self.touch();
        Ok(outcome)
    }

    async fn execute_effect(&mut self, effect: Effect, outcome: &mut TurnOutcome) -> Option<Event> {
        match effect {
            Effect::AppendMessage { message } => {
                self.history.push(message);
                None
            }

            Effect::ProcessPendingExample => Some(Event::Tick),

            Effect::RequestCompletion => {
                let request = self.build_request();
                match self.llm.complete(&request).await {
                    Ok(response) => Some(Event::Complete {
                        response: response.text,
                    }),
                    Err(e) => Some(Event::Fail {
                        kind: e.kind,
                        message: e.message,
                    }),
                }
            }

            Effect::WriteLog {
                user_query,
                bot_response,
            } => {
                let entry = LogEntry::now(&self.context.conversation_id, user_query, bot_response);
                if let Err(e) = self.sink.append(&entry).await {
                    tracing::warn!(
                        conv_id = %self.context.conversation_id,
                        error = %e,
                        "Failed to write conversation log entry"
                    );
                }
                None
            }

            Effect::ShowResponse { text } => {
                outcome.reply = Some(Reply {
                    content: format_citations(&text),
                    is_error: false,
                });
                None
            }

            Effect::ShowApology => {
                outcome.reply = Some(Reply {
                    content: APOLOGY.to_string(),
                    is_error: true,
                });
                None
            }

            Effect::ClearHistory => {
                self.history.clear();
                None
            }
        }
    }

    /// `[system] + history`
    fn build_request(&self) -> LlmRequest {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(Message::system(self.context.system_prompt.clone()));
        messages.extend(self.history.iter().cloned());
        LlmRequest {
            messages,
            params: self.context.params.clone(),
        }
    }
}
