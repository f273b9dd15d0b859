//! Session-scoped credential storage.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::TokenRecord;
use crate::error::Error;
use crate::oauth::SessionId;

/// Trait for storing and retrieving the tokens of a login session.
///
/// The store is the only owner of token state: the flow writes through it on
/// a successful exchange and clears through it on logout. Implementations must
/// keep sessions isolated from each other.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store tokens for a session, replacing whatever was there.
    async fn put(&self, session: &SessionId, tokens: TokenRecord) -> Result<(), Error>;

    /// Retrieve tokens for a session.
    ///
    /// # Returns
    ///
    /// `Some(TokenRecord)` if the session is authenticated, `None` otherwise.
    async fn get(&self, session: &SessionId) -> Result<Option<TokenRecord>, Error>;

    /// Remove the tokens for a session. Clearing an absent session is not an error.
    async fn clear(&self, session: &SessionId) -> Result<(), Error>;
}

struct StoredTokens {
    tokens: TokenRecord,
    last_access: DateTime<Utc>,
}

/// In-process credential store.
///
/// Tokens never leave server memory; the browser only holds the session cookie.
/// A record not read or written for longer than the idle TTL is treated as
/// absent, matching the inactivity expiry of the cookie session it belongs to.
pub struct MemoryCredentialStore {
    tokens: DashMap<SessionId, StoredTokens>,
    idle_ttl: Duration,
}

impl MemoryCredentialStore {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            tokens: DashMap::new(),
            idle_ttl,
        }
    }

    /// Number of records held, including idle ones not yet purged.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Drop records idle past the TTL. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let cutoff = Utc::now() - self.idle_ttl;
        let before = self.tokens.len();
        self.tokens.retain(|_, stored| stored.last_access > cutoff);
        before.saturating_sub(self.tokens.len())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn put(&self, session: &SessionId, tokens: TokenRecord) -> Result<(), Error> {
        let stored = StoredTokens {
            tokens,
            last_access: Utc::now(),
        };
        self.tokens.insert(session.clone(), stored);
        Ok(())
    }

    async fn get(&self, session: &SessionId) -> Result<Option<TokenRecord>, Error> {
        let now = Utc::now();
        let Some(mut stored) = self.tokens.get_mut(session) else {
            return Ok(None);
        };
        if now - stored.last_access > self.idle_ttl {
            drop(stored);
            self.tokens.remove(session);
            debug!("Credentials for session {} expired from inactivity", session);
            return Ok(None);
        }
        stored.last_access = now;
        Ok(Some(stored.tokens.clone()))
    }

    async fn clear(&self, session: &SessionId) -> Result<(), Error> {
        self.tokens.remove(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::{ExposeSecret, SecretString};

    fn store() -> MemoryCredentialStore {
        MemoryCredentialStore::with_idle_ttl(Duration::hours(1))
    }

    fn tokens(access: &str) -> TokenRecord {
        TokenRecord {
            access_token: SecretString::from(access.to_string()),
            refresh_token: Some(SecretString::from("xyz".to_string())),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            issued_at: Utc::now(),
            scopes: vec!["user.info.basic".to_string()],
            open_id: None,
        }
    }

    #[tokio::test]
    async fn test_put_then_get_returns_same_values() {
        let store = store();
        let session = SessionId::new("s1");
        store.put(&session, tokens("abc")).await.unwrap();

        let stored = store.get(&session).await.unwrap().unwrap();
        assert_eq!(stored.access_token.expose_secret(), "abc");
        assert_eq!(stored.refresh_token.unwrap().expose_secret(), "xyz");
        assert_eq!(stored.expires_in, 3600);
        assert_eq!(stored.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_put_replaces_existing_record() {
        let store = store();
        let session = SessionId::new("s1");
        store.put(&session, tokens("first")).await.unwrap();
        store.put(&session, tokens("second")).await.unwrap();

        let stored = store.get(&session).await.unwrap().unwrap();
        assert_eq!(stored.access_token.expose_secret(), "second");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_record() {
        let store = store();
        let session = SessionId::new("s1");
        store.put(&session, tokens("abc")).await.unwrap();
        store.clear(&session).await.unwrap();

        assert!(store.get(&session).await.unwrap().is_none());
        assert!(store.is_empty());
        // Clearing twice is fine.
        store.clear(&session).await.unwrap();
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = store();
        store.put(&SessionId::new("a"), tokens("abc")).await.unwrap();
        assert!(store.get(&SessionId::new("b")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_idle_record_reads_as_absent_and_is_removed() {
        let store = MemoryCredentialStore::with_idle_ttl(Duration::milliseconds(50));
        let session = SessionId::new("s1");
        store.put(&session, tokens("abc")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(120)).await;

        assert!(store.get(&session).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_reads_keep_a_record_alive() {
        let store = MemoryCredentialStore::with_idle_ttl(Duration::milliseconds(300));
        let session = SessionId::new("s1");
        store.put(&session, tokens("abc")).await.unwrap();

        for _ in 0..3 {
            tokio::time::sleep(std::time::Duration::from_millis(150)).await;
            assert!(store.get(&session).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_cleanup_purges_only_idle_records() {
        let store = MemoryCredentialStore::with_idle_ttl(Duration::milliseconds(100));
        store.put(&SessionId::new("idle"), tokens("abc")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        store.put(&SessionId::new("fresh"), tokens("def")).await.unwrap();

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&SessionId::new("fresh")).await.unwrap().is_some());
    }
}
