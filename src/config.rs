//! Application configuration, read once at startup from the environment

use crate::llm::{GenerationParams, DEFAULT_BASE_URL};
use crate::system_prompt::build_system_prompt;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const APP_TITLE: &str = "Investment Management Assistant";
pub const APP_SUBTITLE: &str =
    "Ask questions about investment policies, portfolio construction, and risk management";
pub const ABOUT_TEXT: &str = "This Investment Management Assistant helps answer questions about \
investment policies, portfolio construction, and risk management.";
pub const ABOUT_FEATURES: &[&str] = &[
    "Real-time investment insights",
    "Citations to information sources",
    "Conversation logging for compliance",
];
pub const INPUT_PLACEHOLDER: &str = "Ask me about investment management...";

pub const DEFAULT_EXAMPLE_QUESTIONS: &[&str] = &[
    "What are the key components of an investment policy statement?",
    "How should I diversify a portfolio during market volatility?",
    "What risk management strategies work best for institutional investors?",
    "How do asset allocation models adjust for different risk tolerances?",
    "What factors should I consider when constructing a fixed income portfolio?",
];

const DEFAULT_PORT: u16 = 8501;
const DEFAULT_LOG_PATH: &str = "logs/conversation_logs.jsonl";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Completion provider settings
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub params: GenerationParams,
    pub timeout: Duration,
    pub system_prompt: String,
}

/// Static content served to the chat UI
#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub title: String,
    pub subtitle: String,
    pub about: String,
    pub features: Vec<String>,
    pub placeholder: String,
    pub example_questions: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: APP_TITLE.to_string(),
            subtitle: APP_SUBTITLE.to_string(),
            about: ABOUT_TEXT.to_string(),
            features: ABOUT_FEATURES.iter().map(ToString::to_string).collect(),
            placeholder: INPUT_PLACEHOLDER.to_string(),
            example_questions: DEFAULT_EXAMPLE_QUESTIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub log_path: PathBuf,
    pub llm: LlmSettings,
    pub ui: UiConfig,
    /// Sessions untouched for this long are dropped
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    /// Read from the process environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = GenerationParams::default();

        let temperature = match get("TEMPERATURE") {
            Some(raw) => {
                let t: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|e| ConfigError::invalid("TEMPERATURE", &raw, format!("{e}")))?;
                if !(0.0..=2.0).contains(&t) {
                    return Err(ConfigError::invalid(
                        "TEMPERATURE",
                        &raw,
                        "must be between 0.0 and 2.0",
                    ));
                }
                t
            }
            None => defaults.temperature,
        };

        let max_tokens = match get("MAX_TOKENS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::invalid("MAX_TOKENS", &raw, "must be positive"))
                }
                Ok(n) => n,
                Err(e) => return Err(ConfigError::invalid("MAX_TOKENS", &raw, format!("{e}"))),
            },
            None => defaults.max_tokens,
        };

        let timeout = positive_secs(
            "OPENAI_TIMEOUT_SECS",
            get("OPENAI_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let session_idle_timeout = positive_secs(
            "SESSION_IDLE_TIMEOUT_SECS",
            get("SESSION_IDLE_TIMEOUT_SECS"),
            DEFAULT_SESSION_IDLE_SECS,
        )?;

        let port = match get("ADVISOR_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("ADVISOR_PORT", &raw, format!("{e}")))?,
            None => DEFAULT_PORT,
        };

        let mut ui = UiConfig::default();
        if let Some(raw) = get("EXAMPLE_QUESTIONS") {
            let questions: Vec<String> = raw
                .split('|')
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(ToString::to_string)
                .collect();
            if questions.is_empty() {
                return Err(ConfigError::invalid(
                    "EXAMPLE_QUESTIONS",
                    &raw,
                    "no questions after splitting on '|'",
                ));
            }
            ui.example_questions = questions;
        }

        Ok(Self {
            port,
            log_path: get("CONVERSATION_LOG_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_PATH), PathBuf::from),
            llm: LlmSettings {
                api_key: get("OPENAI_API_KEY"),
                base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                params: GenerationParams {
                    model: get("OPENAI_MODEL").unwrap_or(defaults.model),
                    temperature,
                    max_tokens,
                },
                timeout,
                system_prompt: build_system_prompt(get("SYSTEM_PROMPT").as_deref()),
            },
            ui,
            session_idle_timeout,
        })
    }
}

fn positive_secs(
    key: &'static str,
    raw: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(key, &raw, "must be positive")),
        Ok(n) => Ok(Duration::from_secs(n)),
        Err(e) => Err(ConfigError::invalid(key, &raw, format!("{e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 8501);
        assert_eq!(config.log_path, PathBuf::from("logs/conversation_logs.jsonl"));
        assert_eq!(config.llm.api_key, None);
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.params, GenerationParams::default());
        assert_eq!(config.llm.timeout, Duration::from_secs(120));
        assert_eq!(config.ui.example_questions.len(), 5);
        assert_eq!(config.ui.title, "Investment Management Assistant");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk-abc"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("TEMPERATURE", "0.7"),
            ("MAX_TOKENS", "512"),
            ("ADVISOR_PORT", "9000"),
            ("CONVERSATION_LOG_PATH", "/tmp/x.jsonl"),
            ("EXAMPLE_QUESTIONS", "One? | Two? ||"),
            ("SYSTEM_PROMPT", "Be terse."),
            ("SESSION_IDLE_TIMEOUT_SECS", "90"),
        ])
        .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-abc"));
        assert_eq!(config.llm.params.model, "gpt-4o-mini");
        assert!((config.llm.params.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.llm.params.max_tokens, 512);
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_path, PathBuf::from("/tmp/x.jsonl"));
        assert_eq!(config.ui.example_questions, vec!["One?", "Two?"]);
        assert_eq!(config.llm.system_prompt, "Be terse.");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("OPENAI_API_KEY", ""), ("OPENAI_MODEL", "  ")]).unwrap();
        assert_eq!(config.llm.api_key, None);
        assert_eq!(config.llm.params.model, "gpt-4o");
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("TEMPERATURE", "hot"),
            ("TEMPERATURE", "2.5"),
            ("MAX_TOKENS", "0"),
            ("MAX_TOKENS", "-5"),
            ("ADVISOR_PORT", "70000"),
            ("OPENAI_TIMEOUT_SECS", "0"),
            ("SESSION_IDLE_TIMEOUT_SECS", "0"),
            ("SESSION_IDLE_TIMEOUT_SECS", "soon"),
            ("EXAMPLE_QUESTIONS", "|  |"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            let ConfigError::Invalid { key: got, .. } = err;
            assert_eq!(got, key);
        }
    }
}
