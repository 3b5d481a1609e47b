//! Per-session evaluation history.
//!
//! Each session owns an append-only log of [`EvaluationResult`] values. The
//! store is shared between request handlers, so implementations must be safe
//! to use from several threads: appends to one session are serialised and a
//! history read never observes a partially written log.

mod id;

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::evaluation::EvaluationResult;

pub use self::id::SessionId;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Concurrent storage for session logs.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Appends `result` to the log of `id`, creating the log when absent.
    fn append(&self, id: &SessionId, result: EvaluationResult);

    /// Returns a copy of the log of `id`, or an empty list when unknown.
    fn history(&self, id: &SessionId) -> Vec<EvaluationResult>;
}

impl<T> SessionStore for Arc<T>
where
    T: SessionStore + ?Sized,
{
    fn append(&self, id: &SessionId, result: EvaluationResult) {
        (**self).append(id, result);
    }

    fn history(&self, id: &SessionId) -> Vec<EvaluationResult> {
        (**self).history(id)
    }
}

/// Process-local store backed by a sharded concurrent map.
///
/// Logs live for the lifetime of the store and are never trimmed.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, Vec<EvaluationResult>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with at least one recorded result.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn append(&self, id: &SessionId, result: EvaluationResult) {
        // The entry guard holds the shard lock until the push completes.
        let mut log = self.sessions.entry(id.clone()).or_default();
        log.push(result);
        debug!(
            target: SESSION_TARGET,
            session = %id,
            entries = log.len(),
            "result appended"
        );
    }

    fn history(&self, id: &SessionId) -> Vec<EvaluationResult> {
        self.sessions
            .get(id)
            .map(|log| log.value().clone())
            .unwrap_or_default()
    }
}
