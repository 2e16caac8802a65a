//! advisor-diagnose - check that the completion API is reachable
//!
//! Verifies the API key is present, lists models and optionally runs a tiny
//! chat completion. Exits non-zero if any check fails.

use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::process::ExitCode;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model used for the chat completion test
    #[arg(long, default_value = "gpt-3.5-turbo")]
    model: String,

    /// API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Only check the key and the models endpoint
    #[arg(long)]
    skip_chat: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default, Serialize)]
struct Report {
    api_key_set: bool,
    masked_key: Option<String>,
    connection: Option<ConnectionCheck>,
    chat: Option<ChatCheck>,
}

impl Report {
    fn passed(&self) -> bool {
        self.api_key_set
            && self.connection.as_ref().is_some_and(|c| c.success)
            && self.chat.as_ref().map_or(true, |c| c.success)
    }
}

#[derive(Debug, Serialize)]
struct ConnectionCheck {
    success: bool,
    models: Vec<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCheck {
    model: String,
    success: bool,
    response: Option<String>,
    usage: Option<Value>,
    error: Option<String>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advisor_diagnose=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(cli.timeout))
        .build();
    let base_url = cli.base_url.trim_end_matches('/');

    let mut report = Report::default();
    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    if let Some(key) = &api_key {
        report.api_key_set = true;
        report.masked_key = Some(mask_key(key));
        tracing::info!("API key is set in environment");

        report.connection = Some(check_models(&agent, base_url, key));
        if !cli.skip_chat {
            report.chat = Some(check_chat(&agent, base_url, key, &cli.model));
        }
    } else {
        tracing::error!("OPENAI_API_KEY not found in environment");
    }

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("failed to encode report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&report);
    }

    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// ============================================================================
// Checks
// ============================================================================

fn check_models(agent: &ureq::Agent, base_url: &str, key: &str) -> ConnectionCheck {
    tracing::info!("Testing connection");
    let result = agent
        .get(&format!("{base_url}/models"))
        .set("Authorization", &format!("Bearer {key}"))
        .call();

    match result {
        Ok(response) => match response.into_json::<Value>() {
            Ok(body) => {
                let models: Vec<String> = body["data"]
                    .as_array()
                    .map(|data| {
                        data.iter()
                            .filter_map(|m| m["id"].as_str().map(ToString::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                tracing::info!(count = models.len(), "Connection successful");
                ConnectionCheck {
                    success: true,
                    models,
                    error: None,
                }
            }
            Err(e) => connection_failure(format!("Unexpected error: {e}")),
        },
        Err(e) => connection_failure(describe_error(e)),
    }
}

fn connection_failure(error: String) -> ConnectionCheck {
    tracing::error!(%error, "Connection test failed");
    ConnectionCheck {
        success: false,
        models: Vec::new(),
        error: Some(error),
    }
}

fn check_chat(agent: &ureq::Agent, base_url: &str, key: &str, model: &str) -> ChatCheck {
    tracing::info!(model, "Testing chat completion");
    let result = agent
        .post(&format!("{base_url}/chat/completions"))
        .set("Authorization", &format!("Bearer {key}"))
        .send_json(json!({
            "model": model,
            "messages": [{ "role": "user", "content": "Say hello world" }],
            "max_tokens": 10
        }));

    let outcome = result
        .map_err(describe_error)
        .and_then(|r| {
            r.into_json::<Value>()
                .map_err(|e| format!("Unexpected error: {e}"))
        });

    match outcome {
        Ok(body) => ChatCheck {
            model: model.to_string(),
            success: true,
            response: body["choices"][0]["message"]["content"]
                .as_str()
                .map(ToString::to_string),
            usage: body.get("usage").cloned(),
            error: None,
        },
        Err(error) => {
            tracing::error!(%error, "Chat completion test failed");
            ChatCheck {
                model: model.to_string(),
                success: false,
                response: None,
                usage: None,
                error: Some(error),
            }
        }
    }
}

fn describe_error(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            classify_status(code, &response.into_string().unwrap_or_default())
        }
        ureq::Error::Transport(t) => format!("Unexpected error: {t}"),
    }
}

fn classify_status(code: u16, body: &str) -> String {
    match code {
        401 => "Authentication Error: Invalid API key".to_string(),
        429 => "Rate Limit Error: You've exceeded your rate limit".to_string(),
        _ => {
            let detail = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(ToString::to_string))
                .unwrap_or_else(|| body.trim().to_string());
            format!("Unexpected error: HTTP {code}: {detail}")
        }
    }
}

/// `sk-abcdef...wxyz` style masking. Short keys are hidden entirely.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// ============================================================================
// Output
// ============================================================================

fn print_report(report: &Report) {
    println!("Environment Check");
    match &report.masked_key {
        Some(masked) => println!("  [ok]   OPENAI_API_KEY is set ({masked})"),
        None => println!("  [fail] OPENAI_API_KEY not found in environment"),
    }

    if let Some(conn) = &report.connection {
        println!("\nConnection Test");
        if conn.success {
            println!("  [ok]   Found {} available models", conn.models.len());
            for model in &conn.models {
                println!("         {model}");
            }
        } else {
            println!(
                "  [fail] {}",
                conn.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if let Some(chat) = &report.chat {
        println!("\nChat Completion Test ({})", chat.model);
        if chat.success {
            println!(
                "  [ok]   Response: {}",
                chat.response.as_deref().unwrap_or("")
            );
            if let Some(usage) = &chat.usage {
                println!("         Usage: {usage}");
            }
        } else {
            println!(
                "  [fail] {}",
                chat.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
