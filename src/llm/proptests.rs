//! Property-based tests for the provider translation layer
//!
//! - Message order and roles survive translation
//! - Responses without text are rejected
//! - Error statuses keep the provider detail message

use super::openai::{OpenAIChoice, OpenAIMessage, OpenAIResponse, OpenAIService, OpenAIUsage};
use super::types::{GenerationParams, LlmRequest, Message, MessageRole};
use proptest::prelude::*;
use reqwest::StatusCode;

fn arb_role() -> impl Strategy<Value = MessageRole> {
    prop_oneof![
        Just(MessageRole::System),
        Just(MessageRole::User),
        Just(MessageRole::Assistant),
    ]
}

fn arb_message() -> impl Strategy<Value = Message> {
    (arb_role(), "[a-zA-Z0-9 \\[\\]_.!?,]{0,80}")
        .prop_map(|(role, content)| Message { role, content })
}

fn arb_params() -> impl Strategy<Value = GenerationParams> {
    ("[a-z0-9-]{3,12}", 0u32..=20, 1u32..8000).prop_map(|(model, t, max_tokens)| {
        GenerationParams {
            model,
            temperature: f64::from(t) / 10.0,
            max_tokens,
        }
    })
}

proptest! {
    #[test]
    fn prop_translation_preserves_order_and_roles(
        messages in proptest::collection::vec(arb_message(), 0..12),
        params in arb_params()
    ) {
        let request = LlmRequest { messages: messages.clone(), params: params.clone() };
        let wire = OpenAIService::translate_request(&request);

        prop_assert_eq!(wire.messages.len(), messages.len());
        for (sent, original) in wire.messages.iter().zip(&messages) {
            prop_assert_eq!(sent.role.as_str(), original.role.as_str());
            prop_assert_eq!(sent.content.as_deref(), Some(original.content.as_str()));
        }
        prop_assert_eq!(wire.model, params.model);
        prop_assert_eq!(wire.max_tokens, params.max_tokens);
        prop_assert!(!wire.stream);
    }

    #[test]
    fn prop_non_empty_text_is_returned_verbatim(
        text in "[a-zA-Z0-9 \\[\\]]{1,100}",
        prompt in 0u32..10_000,
        completion in 0u32..10_000
    ) {
        let resp = OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIMessage { role: "assistant".to_string(), content: Some(text.clone()) },
            }],
            usage: Some(OpenAIUsage { prompt_tokens: prompt, completion_tokens: completion }),
        };
        let normalized = OpenAIService::normalize_response(resp).unwrap();
        prop_assert_eq!(normalized.text, text);
        prop_assert_eq!(normalized.usage.total_tokens(), u64::from(prompt) + u64::from(completion));
    }

    #[test]
    fn prop_empty_or_missing_content_is_rejected(content in prop_oneof![Just(None), Just(Some(String::new()))]) {
        let resp = OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIMessage { role: "assistant".to_string(), content },
            }],
            usage: None,
        };
        prop_assert!(OpenAIService::normalize_response(resp).is_err());
    }

    #[test]
    fn prop_error_statuses_keep_detail(code in 400u16..600, detail in "[a-z ]{1,30}") {
        let status = StatusCode::from_u16(code).unwrap();
        let body = serde_json::json!({ "error": { "message": detail } }).to_string();
        let err = OpenAIService::classify_status(status, &body);
        prop_assert!(err.message.contains(detail.as_str()));
    }
}

#[test]
fn test_empty_choices_rejected() {
    let resp = OpenAIResponse {
        choices: vec![],
        usage: None,
    };
    assert!(OpenAIService::normalize_response(resp).is_err());
}
