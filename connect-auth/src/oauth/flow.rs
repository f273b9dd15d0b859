//! Per-session authorization code flow.
//!
//! `AuthorizationFlow` ties the secret generator, the provider and both stores
//! together. Every operation takes the caller's [`SessionId`]; no session state
//! is held anywhere else.

use chrono::Duration;
use tracing::{debug, info, warn};

use super::callback::{self, CallbackParams};
use super::pending::PendingStore;
use super::provider::{AuthorizationRequest, Provider};
use super::session::{SessionId, SessionState};
use super::token::{CredentialStore, TokenRecord};
use crate::error::Error;

pub struct AuthorizationFlow<P, C> {
    provider: P,
    credentials: C,
    pending: PendingStore,
}

impl<P: Provider, C: CredentialStore> AuthorizationFlow<P, C> {
    pub fn new(provider: P, credentials: C, pending_ttl: Duration) -> Self {
        Self {
            provider,
            credentials,
            pending: PendingStore::with_ttl(pending_ttl),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Start a login: issue a fresh pending authorization and build the redirect.
    ///
    /// Any earlier pending authorization for the session is replaced.
    pub fn begin(&self, session: &SessionId) -> Result<AuthorizationRequest, Error> {
        let pending = self.pending.issue(session)?;
        let request = self.provider.authorization_url(&pending);
        debug!(
            "Issued {} authorization request for session {}",
            self.provider.provider().as_str(),
            session
        );
        Ok(request)
    }

    /// Finish a login from the provider's callback parameters.
    ///
    /// The pending authorization is removed before validation, so a second
    /// callback with the same state always fails. The token exchange only runs
    /// once validation passed.
    pub async fn complete(
        &self,
        session: &SessionId,
        params: &CallbackParams,
    ) -> Result<TokenRecord, Error> {
        let pending = self.pending.take(session);

        let validated = callback::validate(params, pending).map_err(|e| {
            warn!("Callback validation failed for session {}: {}", session, e);
            e
        })?;

        let tokens = self
            .provider
            .exchange_code(&validated.code, &validated.code_verifier)
            .await?;

        self.credentials.put(session, tokens.clone()).await?;
        info!(
            "Session {} authenticated with {}",
            session,
            self.provider.provider().as_str()
        );
        Ok(tokens)
    }

    /// Forget everything held for the session.
    pub async fn logout(&self, session: &SessionId) -> Result<(), Error> {
        self.pending.discard(session);
        self.credentials.clear(session).await?;
        debug!("Cleared credentials for session {}", session);
        Ok(())
    }

    /// Tokens held for the session, if it is authenticated.
    pub async fn tokens(&self, session: &SessionId) -> Result<Option<TokenRecord>, Error> {
        self.credentials.get(session).await
    }

    pub async fn session_state(&self, session: &SessionId) -> Result<SessionState, Error> {
        if self.credentials.get(session).await?.is_some() {
            Ok(SessionState::Authenticated)
        } else if self.pending.contains(session) {
            Ok(SessionState::PendingLogin)
        } else {
            Ok(SessionState::Anonymous)
        }
    }

    /// Drop pending authorizations past their TTL. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.pending.cleanup_expired()
    }
}
