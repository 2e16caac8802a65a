//! Append-only JSON Lines conversation log
//!
//! One line per completed exchange:
//! `{"conversation_id", "timestamp", "user_query", "bot_response"}`.

use crate::runtime::LogSink;
use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Local time, second precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One completed exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub conversation_id: String,
    pub timestamp: String,
    pub user_query: String,
    pub bot_response: String,
}

impl LogEntry {
    /// Build an entry stamped with the current local time
    pub fn now(
        conversation_id: impl Into<String>,
        user_query: impl Into<String>,
        bot_response: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            user_query: user_query.into(),
            bot_response: bot_response.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LogSinkError {
    #[error("log write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("log entry could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed sink. Appends are serialized so concurrent sessions never
/// interleave partial lines.
pub struct JsonlLogSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for JsonlLogSink {
    async fn append(&self, entry: &LogEntry) -> Result<(), LogSinkError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
