//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{
    ChatRequest, ErrorResponse, ExampleRequest, SessionView, SuccessResponse, TurnResponse,
};
use super::AppState;
use crate::config::UiConfig;
use crate::runtime::{ProductionSession, SessionHandle, TurnOutcome};
use crate::state_machine::TransitionError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat UI
        .route("/", get(serve_index))
        .route("/assets/*path", get(serve_static))
        .route("/api/config", get(get_config))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/:id",
            get(get_session).delete(discard_session),
        )
        // User actions
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/example", post(send_example))
        .route("/api/sessions/:id/clear", post(clear_session))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// UI
// ============================================================

async fn serve_index() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

async fn get_config(State(state): State<AppState>) -> Json<UiConfig> {
    Json(state.ui.as_ref().clone())
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let (_, handle) = state.sessions.create().await;
    let session = handle.lock().await;
    (StatusCode::CREATED, Json(SessionView::of(&*session)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let session = lock_session(&state, &id).await?;
    Ok(Json(SessionView::of(&*session)))
}

async fn discard_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.discard(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Session not found: {id}")))
    }
}

// ============================================================
// User Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message text is empty".to_string()));
    }

    let mut session = lock_session(&state, &id).await?;
    let turn = tokio::spawn(async move {
        let outcome = session.submit(req.text).await?;
        Ok::<_, TransitionError>(turn_response(outcome, &*session))
    });
    Ok(Json(join_turn(turn).await?))
}

async fn send_example(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ExampleRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if req.question.trim().is_empty() {
        return Err(AppError::BadRequest("Question is empty".to_string()));
    }

    let mut session = lock_session(&state, &id).await?;
    let turn = tokio::spawn(async move {
        let outcome = session.click_example(req.question).await?;
        Ok::<_, TransitionError>(turn_response(outcome, &*session))
    });
    Ok(Json(join_turn(turn).await?))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = lock_session(&state, &id).await?;
    session.clear().await?;
    Ok(Json(SessionView::of(&*session)))
}

async fn get_version() -> &'static str {
    concat!("advisor-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Helpers
// ============================================================

/// Look up a session and take its lock without waiting. A held lock means a
/// turn is in flight.
async fn lock_session(
    state: &AppState,
    id: &str,
) -> Result<OwnedMutexGuard<ProductionSession>, AppError> {
    let handle: SessionHandle = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;

    let mut session = handle
        .try_lock_owned()
        .map_err(|_| AppError::Conflict(TransitionError::SessionBusy.to_string()))?;
    session.touch();
    Ok(session)
}

/// Wait for a turn spawned with the session lock moved into it. The task
/// keeps running if the client hangs up, so the session always settles.
async fn join_turn(
    turn: JoinHandle<Result<TurnResponse, TransitionError>>,
) -> Result<TurnResponse, AppError> {
    turn.await
        .map_err(|e| AppError::Internal(format!("Turn task failed: {e}")))?
        .map_err(AppError::from)
}

fn turn_response(outcome: TurnOutcome, session: &ProductionSession) -> TurnResponse {
    TurnResponse {
        reply: outcome.reply.map(Into::into),
        session: SessionView::of(session),
    }
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::SessionBusy => AppError::Conflict(e.to_string()),
            TransitionError::InvalidTransition(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
