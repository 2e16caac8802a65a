//! Property-based tests for the session state machine
//!
//! Events are folded through `transition` with a minimal effect interpreter
//! that only touches history and the log, then history invariants are checked.

use super::transition::*;
use super::*;
use crate::llm::{LlmErrorKind, Message, MessageRole};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Debug, Default)]
struct Model {
    state: SessionState,
    history: Vec<Message>,
    logged: Vec<(String, String)>,
    apologies: usize,
}

impl Model {
    /// Apply one event. Rejected events leave the model untouched.
    fn step(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = transition(&self.state, &self.history, event)?;
        self.state = result.new_state;
        for effect in result.effects {
            match effect {
                Effect::AppendMessage { message } => self.history.push(message),
                Effect::WriteLog {
                    user_query,
                    bot_response,
                } => self.logged.push((user_query, bot_response)),
                Effect::ShowApology => self.apologies += 1,
                Effect::ClearHistory => self.history.clear(),
                Effect::ProcessPendingExample
                | Effect::RequestCompletion
                | Effect::ShowResponse { .. } => {}
            }
        }
        Ok(())
    }

    fn count(&self, role: MessageRole) -> usize {
        self.history.iter().filter(|m| m.role == role).count()
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 \\[\\]?]{1,40}"
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::MalformedResponse),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::Submit { text }),
        arb_text().prop_map(|question| Event::ClickExample { question }),
        Just(Event::Tick),
        Just(Event::Clear),
        arb_text().prop_map(|response| Event::Complete { response }),
        (arb_error_kind(), arb_text()).prop_map(|(kind, message)| Event::Fail { kind, message }),
    ]
}

/// What the provider does with one user turn
#[derive(Debug, Clone)]
enum Turn {
    Typed { text: String, reply: Result<String, LlmErrorKind> },
    Example { question: String, reply: Result<String, LlmErrorKind> },
}

fn arb_reply() -> impl Strategy<Value = Result<String, LlmErrorKind>> {
    prop_oneof![
        3 => arb_text().prop_map(Ok),
        1 => arb_error_kind().prop_map(Err),
    ]
}

fn arb_turn() -> impl Strategy<Value = Turn> {
    prop_oneof![
        (arb_text(), arb_reply()).prop_map(|(text, reply)| Turn::Typed { text, reply }),
        (arb_text(), arb_reply()).prop_map(|(question, reply)| Turn::Example { question, reply }),
    ]
}

fn reply_event(reply: Result<String, LlmErrorKind>) -> Event {
    match reply {
        Ok(response) => Event::Complete { response },
        Err(kind) => Event::Fail {
            kind,
            message: "provider error".to_string(),
        },
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Arbitrary event sequences never produce two assistant messages in a row
    /// and never put a system message in history.
    #[test]
    fn prop_history_never_has_consecutive_assistant_messages(
        events in proptest::collection::vec(arb_event(), 0..40)
    ) {
        let mut model = Model::default();
        for event in events {
            let _ = model.step(event);
        }

        for pair in model.history.windows(2) {
            prop_assert!(
                !(pair[0].role == MessageRole::Assistant && pair[1].role == MessageRole::Assistant),
                "consecutive assistant messages: {:?}", model.history
            );
        }
        prop_assert!(model.history.iter().all(|m| m.role != MessageRole::System));
        if let Some(first) = model.history.first() {
            prop_assert_eq!(first.role, MessageRole::User);
        }
    }

    /// Driving well-formed turns: one user message per turn, one assistant
    /// message and one log entry per successful turn, in order.
    #[test]
    fn prop_turns_grow_history_and_log(turns in proptest::collection::vec(arb_turn(), 0..20)) {
        let mut model = Model::default();
        let mut expected_log = Vec::new();
        let mut successes = 0;
        let mut failures = 0;

        for turn in turns.clone() {
            let (query, reply) = match turn {
                Turn::Typed { text, reply } => {
                    model.step(Event::Submit { text: text.clone() }).unwrap();
                    (text, reply)
                }
                Turn::Example { question, reply } => {
                    model.step(Event::ClickExample { question: question.clone() }).unwrap();
                    prop_assert!(model.state.pending_example());
                    model.step(Event::Tick).unwrap();
                    (question, reply)
                }
            };
            prop_assert_eq!(&model.state, &SessionState::AwaitingResponse { query: query.clone() });

            match &reply {
                Ok(response) => {
                    successes += 1;
                    expected_log.push((query, response.clone()));
                }
                Err(_) => failures += 1,
            }
            model.step(reply_event(reply)).unwrap();
            prop_assert_eq!(&model.state, &SessionState::Idle);
        }

        prop_assert_eq!(model.count(MessageRole::User), turns.len());
        prop_assert_eq!(model.count(MessageRole::Assistant), successes);
        prop_assert_eq!(model.apologies, failures);
        prop_assert_eq!(model.logged, expected_log);
    }

    /// While a response is pending, user input and clear are rejected and
    /// leave the session untouched.
    #[test]
    fn prop_awaiting_rejects_user_input(
        query in arb_text(),
        text in arb_text(),
    ) {
        let mut model = Model::default();
        model.step(Event::Submit { text: query.clone() }).unwrap();
        let before = model.history.clone();

        for event in [
            Event::Submit { text: text.clone() },
            Event::ClickExample { question: text.clone() },
            Event::Clear,
        ] {
            prop_assert_eq!(model.step(event), Err(TransitionError::SessionBusy));
        }
        prop_assert_eq!(&model.history, &before);
        prop_assert_eq!(&model.state, &SessionState::AwaitingResponse { query });
    }

    /// Idle always accepts a submit.
    #[test]
    fn prop_idle_accepts_submit(
        history in proptest::collection::vec(arb_text().prop_map(Message::user), 0..5),
        text in arb_text(),
    ) {
        let result = transition(&SessionState::Idle, &history, Event::Submit { text });
        prop_assert!(result.is_ok());
    }

    /// Clear from an idle session empties history and restarts alternation.
    #[test]
    fn prop_clear_resets_history(
        turns in proptest::collection::vec((arb_text(), arb_text()), 1..10),
        next in arb_text(),
    ) {
        let mut model = Model::default();
        for (text, response) in turns {
            model.step(Event::Submit { text }).unwrap();
            model.step(Event::Complete { response }).unwrap();
        }

        model.step(Event::Clear).unwrap();
        prop_assert!(model.history.is_empty());
        prop_assert!(!model.state.pending_example());

        model.step(Event::Submit { text: next.clone() }).unwrap();
        prop_assert_eq!(model.history, vec![Message::user(next)]);
    }
}
