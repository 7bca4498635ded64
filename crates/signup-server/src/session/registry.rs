//! In-memory session registry.

use super::SignupSession;
use crate::error::ServiceError;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default age at which an unfinished session is closed.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Default upper bound on open sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Open registration sessions indexed by id.
///
/// Sessions older than the TTL are invisible to [`get`](Self::get) and are
/// dropped by [`prune_expired`](Self::prune_expired), which also runs before
/// every insert.
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Arc<SignupSession>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Create a new empty registry with the default limits.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }

    /// Create a new empty registry.
    pub fn with_limits(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
            max_sessions,
        }
    }

    /// Get a live session by id.
    pub fn get(&self, id: &Uuid) -> Option<Arc<SignupSession>> {
        let now = Utc::now();
        self.sessions
            .get(id)
            .filter(|session| !session.is_expired(now, self.ttl))
            .cloned()
    }

    /// Register a session, returning a shared handle to it.
    ///
    /// Fails with [`ServiceError::TooManySessions`] when the registry is
    /// still full after expired sessions are pruned.
    pub fn insert(&mut self, session: SignupSession) -> Result<Arc<SignupSession>, ServiceError> {
        self.prune_expired();
        if self.sessions.len() >= self.max_sessions {
            warn!(max_sessions = self.max_sessions, "Session limit reached");
            return Err(ServiceError::TooManySessions);
        }

        let session = Arc::new(session);
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    /// Remove a session.
    pub fn remove(&mut self, id: &Uuid) -> Option<Arc<SignupSession>> {
        self.sessions.remove(id)
    }

    /// Drop every expired session that is not mid-submission.
    ///
    /// Returns how many sessions were removed.
    pub fn prune_expired(&mut self) -> usize {
        let now = Utc::now();
        let ttl = self.ttl;
        let before = self.sessions.len();

        self.sessions
            .retain(|_, session| session.is_busy() || !session.is_expired(now, ttl));

        let removed = before - self.sessions.len();
        if removed > 0 {
            debug!(removed, "Pruned expired sessions");
        }
        removed
    }

    /// Get the number of open sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}
