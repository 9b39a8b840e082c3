//! Session storage with automatic expiry cleanup

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::dialogue::DialogueSession;

/// Concurrent store of dialogue sessions keyed by session id.
///
/// A background task sweeps expired sessions once a minute.
pub struct SessionManager {
    sessions: Arc<DashMap<String, DialogueSession>>,
    timeout_secs: u64,
}

impl SessionManager {
    #[must_use]
    pub fn new(timeout_secs: u64) -> Self {
        let sessions = Arc::new(DashMap::new());

        let sessions_clone = sessions.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Self::cleanup_expired(&sessions_clone, timeout_secs);
            }
        });

        Self {
            sessions,
            timeout_secs,
        }
    }

    pub fn insert(&self, session: DialogueSession) {
        self.sessions.insert(session.id.clone(), session);
    }

    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<DialogueSession> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    pub fn update(&self, session: DialogueSession) {
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn delete(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn cleanup_expired(sessions: &DashMap<String, DialogueSession>, timeout_secs: u64) {
        let expired: Vec<String> = sessions
            .iter()
            .filter(|entry| entry.value().is_expired(timeout_secs))
            .map(|entry| entry.key().clone())
            .collect();

        for session_id in expired {
            sessions.remove(&session_id);
            tracing::info!("Cleaned up expired session: {}", session_id);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_delete() {
        let manager = SessionManager::new(3600);
        let session = DialogueSession::new();
        let id = session.id.clone();

        manager.insert(session);
        assert_eq!(manager.session_count(), 1);
        assert!(manager.get(&id).is_some());

        manager.delete(&id);
        assert!(manager.get(&id).is_none());
        assert_eq!(manager.session_count(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_state() {
        let manager = SessionManager::new(3600);
        let mut session = DialogueSession::new();
        let id = session.id.clone();
        manager.insert(session.clone());

        session.profile.age = Some("42".to_string());
        manager.update(session);

        let stored = manager.get(&id).unwrap();
        assert_eq!(stored.profile.age.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_expired_session_sweep() {
        let manager = SessionManager::new(0);
        let mut session = DialogueSession::new();
        session.last_activity = 0;
        let id = session.id.clone();
        manager.insert(session);

        SessionManager::cleanup_expired(&manager.sessions, 0);
        assert!(manager.get(&id).is_none());
    }
}
