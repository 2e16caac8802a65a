//! HTTP API and embedded chat UI

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::config::UiConfig;
use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub ui: Arc<UiConfig>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>, ui: UiConfig) -> Self {
        Self {
            sessions,
            ui: Arc::new(ui),
        }
    }
}
