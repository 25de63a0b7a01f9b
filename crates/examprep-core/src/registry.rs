//! In-memory session registry.
//!
//! Each session sits behind its own async mutex, so operations on one
//! session are serialized while different sessions never contend beyond the
//! brief map lookup. The map lock is never held while awaiting a session
//! mutex. Sessions live only in process memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::EngineError;
use crate::session::{ExamSession, SessionParams};

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<ExamSession>>;

/// A registered session. The parameters are immutable, so they are kept
/// outside the session mutex.
struct Entry {
    params: SessionParams,
    handle: SessionHandle,
}

/// Maps session ids to sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
    idle_ttl: Option<Duration>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire sessions that have been idle for longer than `ttl`.
    pub fn with_idle_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.idle_ttl = ttl;
        self
    }

    /// Create a session, or re-affirm an existing one, and return its id.
    ///
    /// A supplied id that already exists with the same parameters leaves the
    /// existing session untouched; with different parameters the call fails
    /// with [`EngineError::SessionConflict`].
    pub async fn create(
        &self,
        session_id: Option<&str>,
        mode: &str,
        term: &str,
        subject: &str,
    ) -> Result<String, EngineError> {
        let id = match session_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        // Validate before taking the write lock.
        let session = ExamSession::new(id.clone(), mode, term, subject)?;
        let params = session.params();

        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(&id) {
            if existing.params.matches(&params) {
                tracing::debug!(session = %id, "session re-affirmed");
                return Ok(id);
            }
            return Err(EngineError::SessionConflict { session_id: id });
        }

        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id.clone(), Entry { params, handle });
        tracing::info!(session = %id, mode, term, subject, "session started");
        Ok(id)
    }

    /// Look up a session by id.
    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, EngineError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| Arc::clone(&entry.handle))
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions idle for longer than the configured TTL. Sessions that
    /// are locked by an in-flight operation are never dropped.
    pub async fn purge_idle(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.handle.try_lock() {
            Ok(session) => now.duration_since(session.last_touched()) <= ttl,
            Err(_) => true,
        });
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::info!(purged, "expired idle sessions");
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_unique_ids() {
        let registry = SessionRegistry::new();
        let a = registry.create(None, "practice", "First term", "Maths").await.unwrap();
        let b = registry.create(None, "practice", "First term", "Maths").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.get(&a).await.unwrap().lock().await.id(), a);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn supplied_id_is_idempotent() {
        let registry = SessionRegistry::new();
        let a = registry.create(Some("abc"), "practice", "First term", "Maths").await.unwrap();
        let first = registry.get(&a).await.unwrap();
        let b = registry.create(Some("abc"), "Practice", "first", "Maths").await.unwrap();
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&first, &registry.get(&b).await.unwrap()));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn supplied_id_with_other_parameters_conflicts() {
        let registry = SessionRegistry::new();
        registry.create(Some("abc"), "practice", "First term", "Maths").await.unwrap();
        let err = registry
            .create(Some("abc"), "practice", "First term", "Science")
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::SessionConflict { session_id: "abc".into() });
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let registry = SessionRegistry::new();
        let err = registry.get("nope").await.unwrap_err();
        assert_eq!(err, EngineError::SessionNotFound("nope".into()));
    }

    #[tokio::test]
    async fn invalid_parameters_do_not_register() {
        let registry = SessionRegistry::new();
        assert!(registry.create(Some("x"), "", "First term", "Maths").await.is_err());
        assert!(registry.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn purges_idle_sessions() {
        let registry = SessionRegistry::new().with_idle_ttl(Some(Duration::from_secs(60)));
        registry.create(Some("old"), "practice", "First term", "Maths").await.unwrap();
        tokio::time::advance(Duration::from_secs(120)).await;
        registry.create(Some("new"), "practice", "First term", "Maths").await.unwrap();

        assert_eq!(registry.purge_idle().await, 1);
        assert!(registry.get("old").await.is_err());
        assert!(registry.get("new").await.is_ok());
    }

    #[tokio::test]
    async fn without_ttl_nothing_expires() {
        let registry = SessionRegistry::new();
        registry.create(Some("a"), "real", "Third term", "English").await.unwrap();
        assert_eq!(registry.purge_idle().await, 0);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reaffirm_does_not_wait_for_a_busy_session() {
        let registry = Arc::new(SessionRegistry::new());
        registry.create(Some("busy"), "practice", "First term", "Maths").await.unwrap();
        registry.create(Some("other"), "practice", "First term", "Science").await.unwrap();

        let busy = registry.get("busy").await.unwrap();
        let _guard = busy.lock().await;

        let id = tokio::time::timeout(
            Duration::from_secs(1),
            registry.create(Some("busy"), "practice", "first", "Maths"),
        )
        .await
        .expect("re-affirming a locked session must not block")
        .unwrap();
        assert_eq!(id, "busy");

        let conflict = tokio::time::timeout(
            Duration::from_secs(1),
            registry.create(Some("busy"), "real", "First term", "Maths"),
        )
        .await
        .expect("a conflicting start must not block either");
        assert!(matches!(conflict, Err(EngineError::SessionConflict { .. })));

        assert!(registry.get("other").await.is_ok());
    }
}
