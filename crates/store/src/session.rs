use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use datalens_core::constants::MAX_HISTORY_TURNS;
use datalens_core::Turn;
use serde::Serialize;
use tokio::sync::Mutex;

/// Bounded per-session conversation history.
///
/// Implementations must treat append-then-trim as one atomic step per
/// session; concurrent appends to the same session must not lose turns or
/// leave the history over its bound.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Append a turn, evicting the oldest once the bound is exceeded.
    async fn append(&self, session_id: &str, turn: Turn);

    /// Full retained history, oldest first.
    async fn history(&self, session_id: &str) -> Vec<Turn>;

    /// Drop a session entirely. Returns false for an unknown session id.
    async fn clear(&self, session_id: &str) -> bool;

    /// The last `n` turns rendered as "Role: text" lines.
    async fn context_window(&self, session_id: &str, n: usize) -> String;

    async fn stats(&self) -> SessionStats;
}

/// Aggregate numbers over all live sessions.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SessionStats {
    pub sessions: usize,
    pub turns: usize,
}

/// The in-memory session store used by a single-process gateway.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<HashMap<String, VecDeque<Turn>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn append(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.inner.lock().await;
        let history = sessions.entry(session_id.to_owned()).or_default();
        history.push_back(turn);
        while history.len() > MAX_HISTORY_TURNS {
            history.pop_front();
        }
    }

    async fn history(&self, session_id: &str) -> Vec<Turn> {
        let sessions = self.inner.lock().await;
        sessions.get(session_id).map(|h| h.iter().cloned().collect()).unwrap_or_default()
    }

    async fn clear(&self, session_id: &str) -> bool {
        let mut sessions = self.inner.lock().await;
        sessions.remove(session_id).is_some()
    }

    async fn context_window(&self, session_id: &str, n: usize) -> String {
        let sessions = self.inner.lock().await;
        let Some(history) = sessions.get(session_id) else {
            return String::new();
        };
        let turns: Vec<Turn> = history.iter().cloned().collect();
        render_context(&turns, n)
    }

    async fn stats(&self) -> SessionStats {
        let sessions = self.inner.lock().await;
        SessionStats {
            sessions: sessions.len(),
            turns: sessions.values().map(VecDeque::len).sum(),
        }
    }
}

/// Render the last `n` of `turns` as "Role: text" lines.
#[must_use]
pub fn render_context(turns: &[Turn], n: usize) -> String {
    let skip = turns.len().saturating_sub(n);
    turns
        .iter()
        .skip(skip)
        .map(|t| format!("{}: {}", t.role.label(), t.text))
        .collect::<Vec<_>>()
        .join("\n")
}
