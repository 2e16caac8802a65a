//! Runtime for live conversation sessions
//!
//! The `SessionManager` owns every session. Sessions share only the
//! completion provider and the log sink.

mod session;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use session::{ConversationSession, Reply, TurnOutcome, APOLOGY};
pub use traits::*;

use crate::llm::GenerationParams;
use crate::state_machine::SessionContext;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Floor for the sweep period so tiny timeouts don't spin
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Session type used by the server
pub type ProductionSession = ConversationSession<Arc<dyn LlmService>, Arc<dyn LogSink>>;

/// Shared handle to one session. Locked for the whole of a turn.
pub type SessionHandle = Arc<Mutex<ProductionSession>>;

/// Settings every new session starts with
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub system_prompt: String,
    pub params: GenerationParams,
}

/// Manager for all live sessions
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    llm: Arc<dyn LlmService>,
    sink: Arc<dyn LogSink>,
    settings: SessionSettings,
}

impl SessionManager {
    pub fn new(llm: Arc<dyn LlmService>, sink: Arc<dyn LogSink>, settings: SessionSettings) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            llm,
            sink,
            settings,
        }
    }

    /// Start a session with a fresh conversation id
    pub async fn create(&self) -> (String, SessionHandle) {
        let id = Uuid::new_v4().to_string();
        let context = SessionContext::new(
            id.clone(),
            self.settings.system_prompt.clone(),
            self.settings.params.clone(),
        );
        let session = Arc::new(Mutex::new(ConversationSession::new(
            context,
            self.llm.clone(),
            self.sink.clone(),
        )));

        let live = {
            let mut sessions = self.sessions.write().await;
            sessions.insert(id.clone(), session.clone());
            sessions.len()
        };
        tracing::info!(conv_id = %id, live, "Session created");
        (id, session)
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove sessions whose last activity is older than `max_idle` as of
    /// `now`. Sessions locked by an in-flight turn are skipped.
    pub async fn sweep_idle(&self, now: Instant, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| {
            let Ok(session) = handle.try_lock() else {
                return true;
            };
            let idle = now.saturating_duration_since(session.last_activity());
            if idle > max_idle {
                tracing::info!(
                    conv_id = %id,
                    idle_secs = idle.as_secs(),
                    "Cleaning up idle session"
                );
                false
            } else {
                true
            }
        });
        before - sessions.len()
    }

    /// Periodically drop idle sessions. The task ends once the manager is gone.
    pub fn spawn_idle_sweeper(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let manager: Weak<Self> = Arc::downgrade(self);
        let period = (max_idle / 4).max(MIN_SWEEP_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    tracing::debug!("Session manager dropped, stopping idle sweep");
                    break;
                };
                let removed = manager.sweep_idle(Instant::now(), max_idle).await;
                if removed > 0 {
                    tracing::debug!(removed, "Idle session sweep");
                }
            }
        })
    }

    /// Drop a session. Returns false if it did not exist.
    pub async fn discard(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(conv_id = %id, "Session discarded");
        }
        removed
    }
}
