//! Advisor Chat - investment management assistant
//!
//! Serves a chat UI that forwards questions to an OpenAI-compatible
//! completion API and appends every exchange to a JSON Lines log.

mod api;
mod audit_log;
mod citation;
mod config;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;

use api::{create_router, AppState};
use audit_log::JsonlLogSink;
use config::AppConfig;
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::{LogSink, SessionManager, SessionSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional .env for local development
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advisor_chat=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded .env");
    }

    let config = AppConfig::from_env()?;

    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set. Every chat turn will return the apology.");
    }

    // Completion provider
    let openai = OpenAIService::new(
        config.llm.api_key.clone(),
        &config.llm.base_url,
        config.llm.timeout,
    )?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(openai)));
    tracing::info!(
        model = %config.llm.params.model,
        base_url = %config.llm.base_url,
        temperature = config.llm.params.temperature,
        max_tokens = config.llm.params.max_tokens,
        "Completion provider initialized"
    );

    // Conversation log
    let sink = JsonlLogSink::new(&config.log_path);
    tracing::info!(path = %sink.path().display(), "Conversation log");
    let sink: Arc<dyn LogSink> = Arc::new(sink);

    let sessions = Arc::new(SessionManager::new(
        llm,
        sink,
        SessionSettings {
            system_prompt: config.llm.system_prompt.clone(),
            params: config.llm.params.clone(),
        },
    ));
    sessions.spawn_idle_sweeper(config.session_idle_timeout);
    let state = AppState::new(sessions, config.ui.clone());

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Advisor Chat listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
