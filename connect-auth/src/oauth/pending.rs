//! Session-scoped storage of in-flight authorization attempts.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::secret::PendingAuthorization;
use super::session::SessionId;
use crate::error::Error;

struct PendingEntry {
    authorization: PendingAuthorization,
    expires_at: DateTime<Utc>,
}

/// Holds at most one pending authorization per session, with expiration.
///
/// Issuing a new authorization for a session replaces the previous one, so an
/// abandoned login can never be completed with stale values.
pub struct PendingStore {
    pending: DashMap<SessionId, PendingEntry>,
    ttl: Duration,
}

impl PendingStore {
    /// Create a pending store whose entries expire `ttl` after issue.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            ttl,
        }
    }

    /// Generate a fresh state/verifier pair for `session` and remember it.
    pub fn issue(&self, session: &SessionId) -> Result<PendingAuthorization, Error> {
        let authorization = PendingAuthorization::generate()?;
        let entry = PendingEntry {
            authorization: authorization.clone(),
            expires_at: Utc::now() + self.ttl,
        };
        if self.pending.insert(session.clone(), entry).is_some() {
            debug!("Replaced pending authorization for session {}", session);
        }
        Ok(authorization)
    }

    /// Remove and return the pending authorization for `session`.
    ///
    /// Returns `None` if nothing was issued or the entry expired. Either way the
    /// entry is gone afterwards.
    pub fn take(&self, session: &SessionId) -> Option<PendingAuthorization> {
        let (_, entry) = self.pending.remove(session)?;
        if Utc::now() > entry.expires_at {
            debug!("Pending authorization for session {} expired", session);
            return None;
        }
        Some(entry.authorization)
    }

    /// Whether `session` has an unexpired pending authorization.
    pub fn contains(&self, session: &SessionId) -> bool {
        self.pending
            .get(session)
            .map(|entry| Utc::now() <= entry.expires_at)
            .unwrap_or(false)
    }

    /// Drop the pending authorization for `session`, if any.
    pub fn discard(&self, session: &SessionId) {
        self.pending.remove(session);
    }

    /// Clean up expired entries.
    ///
    /// Should be called periodically to prevent memory leaks.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.pending.len();
        self.pending.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.pending.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionId {
        SessionId::new("session-1")
    }

    #[test]
    fn test_issue_and_take() {
        let store = PendingStore::with_ttl(Duration::minutes(10));
        let issued = store.issue(&session()).unwrap();

        let taken = store.take(&session()).unwrap();
        assert_eq!(taken.state, issued.state);
        assert_eq!(taken.code_verifier.as_str(), issued.code_verifier.as_str());
    }

    #[test]
    fn test_pending_consumed_after_take() {
        let store = PendingStore::with_ttl(Duration::minutes(10));
        store.issue(&session()).unwrap();

        assert!(store.take(&session()).is_some());
        assert!(store.take(&session()).is_none());
        assert!(!store.contains(&session()));
    }

    #[test]
    fn test_reissue_replaces_previous_values() {
        let store = PendingStore::with_ttl(Duration::minutes(10));
        let first = store.issue(&session()).unwrap();
        let second = store.issue(&session()).unwrap();
        assert_ne!(first.state, second.state);

        let taken = store.take(&session()).unwrap();
        assert_eq!(taken.state, second.state);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = PendingStore::with_ttl(Duration::minutes(10));
        store.issue(&SessionId::new("a")).unwrap();
        assert!(store.take(&SessionId::new("b")).is_none());
        assert!(store.contains(&SessionId::new("a")));
    }

    #[test]
    fn test_expired_pending() {
        let store = PendingStore::with_ttl(Duration::seconds(-1));
        store.issue(&session()).unwrap();

        assert!(!store.contains(&session()));
        assert!(store.take(&session()).is_none());
    }

    #[test]
    fn test_cleanup_expired() {
        let store = PendingStore::with_ttl(Duration::seconds(-1));
        store.issue(&SessionId::new("a")).unwrap();
        store.issue(&SessionId::new("b")).unwrap();

        assert_eq!(store.cleanup_expired(), 2);
        assert_eq!(store.cleanup_expired(), 0);
    }
}
