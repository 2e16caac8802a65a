//! Pure state transition function
//!
//! Given the same state, history and event it always produces the same
//! result. History is read-only here; changes to it come back as effects.

use super::{Effect, Event, SessionState};
use crate::llm::{Message, MessageRole};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Session is busy, wait for the current response")]
    SessionBusy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    history: &[Message],
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User input
        // ============================================================

        // Idle + Submit -> AwaitingResponse
        (SessionState::Idle, Event::Submit { text }) => Ok(TransitionResult::new(
            SessionState::AwaitingResponse {
                query: text.clone(),
            },
        )
        .with_effect(Effect::append_user(text))
        .with_effect(Effect::RequestCompletion)),

        // Idle + ClickExample -> PendingExample
        (SessionState::Idle, Event::ClickExample { question }) => {
            Ok(TransitionResult::new(SessionState::PendingExample)
                .with_effect(Effect::append_user(question))
                .with_effect(Effect::ProcessPendingExample))
        }

        // PendingExample + Tick -> AwaitingResponse, or Idle with nothing to send
        (SessionState::PendingExample, Event::Tick) => {
            match history
                .iter()
                .rev()
                .find(|m| m.role == MessageRole::User)
            {
                Some(last_user) => Ok(TransitionResult::new(SessionState::AwaitingResponse {
                    query: last_user.content.clone(),
                })
                .with_effect(Effect::RequestCompletion)),
                None => Ok(TransitionResult::new(SessionState::Idle)),
            }
        }

        // Busy states reject new input
        (
            SessionState::AwaitingResponse { .. } | SessionState::PendingExample,
            Event::Submit { .. } | Event::ClickExample { .. },
        )
        | (SessionState::AwaitingResponse { .. }, Event::Clear) => {
            Err(TransitionError::SessionBusy)
        }

        // ============================================================
        // Provider outcome
        // ============================================================

        // AwaitingResponse + Complete -> Idle
        (SessionState::AwaitingResponse { query }, Event::Complete { response }) => {
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::append_assistant(response.clone()))
                .with_effect(Effect::WriteLog {
                    user_query: query.clone(),
                    bot_response: response.clone(),
                })
                .with_effect(Effect::ShowResponse { text: response }))
        }

        // AwaitingResponse + Fail -> Idle; the user message stays, nothing is logged
        (SessionState::AwaitingResponse { .. }, Event::Fail { .. }) => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::ShowApology))
        }

        // ============================================================
        // Clear
        // ============================================================
        (SessionState::Idle | SessionState::PendingExample, Event::Clear) => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::ClearHistory))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} in state {}",
            event.name(),
            state.name()
        ))),
    }
}
