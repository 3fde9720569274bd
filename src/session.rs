//! # Practice Session State
//!
//! Tracks which sound each practice session is currently drilling. A session
//! is named by the client through the `X-Session-Id` header; clients that do
//! not send one all share the [`DEFAULT_SESSION`] slot, where the last
//! selection wins.
//!
//! Selection is the only mutation: it unconditionally replaces the session's
//! active symbol. Sessions live for the lifetime of the process.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Session id used when a request does not name one.
pub const DEFAULT_SESSION: &str = "default";

/// Thread-safe map from session id to the session's active phoneme symbol.
///
/// Lock discipline: callers copy the symbol out and release the lock before
/// doing anything slow. The transcription call in particular must never run
/// under this lock.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active symbol for a session, replacing any previous selection.
    pub fn select(&self, session_id: &str, symbol: &str) {
        let mut sessions = self.inner.write().unwrap();
        sessions.insert(session_id.to_string(), symbol.to_string());
    }

    /// The session's active symbol, if one has been selected.
    pub fn active_symbol(&self, session_id: &str) -> Option<String> {
        let sessions = self.inner.read().unwrap();
        sessions.get(session_id).cloned()
    }

    /// Number of sessions that have made a selection.
    pub fn active_count(&self) -> usize {
        let sessions = self.inner.read().unwrap();
        sessions.len()
    }
}
