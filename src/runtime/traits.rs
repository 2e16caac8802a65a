//! Trait abstractions for runtime I/O
//!
//! Sessions are generic over these so tests can swap in mocks.

use crate::audit_log::{LogEntry, LogSinkError};
use async_trait::async_trait;
use std::sync::Arc;

pub use crate::llm::LlmService;

/// Append-only store for completed exchanges
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one entry. Callers treat failure as non-fatal.
    async fn append(&self, entry: &LogEntry) -> Result<(), LogSinkError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    async fn append(&self, entry: &LogEntry) -> Result<(), LogSinkError> {
        (**self).append(entry).await
    }
}
