//! Concurrent session store
//!
//! Each session sits behind its own async mutex, so turns for one key run
//! one at a time while different keys proceed in parallel.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use sales_agent_core::ConversationSession;

pub type SessionHandle = Arc<Mutex<ConversationSession>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.get(session_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        let entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationSession::new(session_id))));
        Arc::clone(entry.value())
    }

    /// Insert or replace a session. Handles obtained earlier keep pointing
    /// at the replaced state.
    pub fn set(&self, session: ConversationSession) {
        let key = session.session_id.clone();
        self.sessions.insert(key, Arc::new(Mutex::new(session)));
    }

    /// Returns whether a session was removed
    pub fn clear(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::info!(session_id, "Session cleared");
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Copy of the current state, waiting for any in-flight turn
    pub async fn snapshot(&self, session_id: &str) -> Option<ConversationSession> {
        let handle = self.get(session_id)?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Remove sessions idle for longer than `max_idle`
    ///
    /// A session with a turn in progress is never idle and is skipped.
    pub fn clear_idle(&self, max_idle: Duration) -> usize {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            return 0;
        };
        let cutoff = Utc::now() - max_idle;

        let candidates: Vec<String> = self
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        candidates
            .into_iter()
            .filter(|key| {
                self.sessions
                    .remove_if(key, |_, handle| {
                        handle
                            .try_lock()
                            .map(|session| session.metadata.last_activity_at < cutoff)
                            .unwrap_or(false)
                    })
                    .is_some()
            })
            .count()
    }
}
