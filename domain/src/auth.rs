//! TikTok login: starting it, finishing it from the callback, and guarding
//! access to the tokens it produced.

use crate::error::{config_error, AuthErrorKind, DomainErrorKind, Error};
use crate::gateway::tiktok::TikTokApiClient;
use crate::platform_user::{self, ProfilePersistence};
use connect_auth::oauth::providers::tiktok;
use connect_auth::oauth::token::{
    encryption::TokenCipher, CredentialStore, MemoryCredentialStore, TokenRecord,
};
use connect_auth::oauth::{
    AuthorizationFlow, CallbackParams, Provider, ProviderConfig, SessionId, SessionState,
};
use log::*;
use sea_orm::DatabaseConnection;
use secrecy::SecretString;
use service::config::Config;
use std::time::Duration;

/// The flow the server runs: TikTok provider, tokens held in memory per session.
pub type TikTokFlow = AuthorizationFlow<tiktok::Provider, MemoryCredentialStore>;

/// Result of a completed login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub tokens: TokenRecord,
    pub profile: ProfilePersistence,
}

/// Build the TikTok flow from config. Client key and secret are required.
pub fn new_flow(config: &Config) -> Result<TikTokFlow, Error> {
    let client_id = config
        .client_key()
        .ok_or_else(|| config_error("TIKTOK_CLIENT_KEY is not set"))?;
    let client_secret = config
        .client_secret()
        .ok_or_else(|| config_error("TIKTOK_CLIENT_SECRET is not set"))?;

    let provider = tiktok::Provider::new(ProviderConfig {
        client_id: client_id.to_string(),
        client_secret: SecretString::from(client_secret.to_string()),
        redirect_uri: config.redirect_uri().to_string(),
        scopes: config.scopes(),
        auth_url: config.auth_url().to_string(),
        token_url: config.token_url().to_string(),
        exchange_timeout: Duration::from_secs(config.token_exchange_timeout_secs),
    })?;

    Ok(AuthorizationFlow::new(
        provider,
        MemoryCredentialStore::with_idle_ttl(chrono::Duration::seconds(
            config.backend_session_expiry_seconds as i64,
        )),
        chrono::Duration::seconds(config.pending_authorization_ttl_secs),
    ))
}

/// Start a login for `session` and return the URL to redirect the browser to.
///
/// Tokens an already authenticated session holds stay valid until the new
/// login completes and replaces them.
pub async fn begin_login<P: Provider, C: CredentialStore>(
    flow: &AuthorizationFlow<P, C>,
    session: &SessionId,
) -> Result<String, Error> {
    match flow.session_state(session).await? {
        SessionState::Authenticated => info!("Session {} is logging in again", session),
        SessionState::PendingLogin => debug!("Session {} restarts an unfinished login", session),
        SessionState::Anonymous => {}
    }
    let request = flow.begin(session).inspect_err(|e| {
        error!("Failed to start login for session {}: {}", session, e);
    })?;
    info!("Redirecting session {} to TikTok authorization", session);
    Ok(request.url)
}

/// Finish a login from the callback and record the account's profile.
///
/// Only the token exchange decides success; the profile write is reported in
/// the outcome and never turns a login into an error. Its user info call is a
/// single attempt bounded by `profile_fetch_timeout_secs`.
pub async fn complete_login<P: Provider, C: CredentialStore>(
    db: &DatabaseConnection,
    flow: &AuthorizationFlow<P, C>,
    api: &TikTokApiClient,
    cipher: Option<&TokenCipher>,
    session: &SessionId,
    params: &CallbackParams,
) -> Result<LoginOutcome, Error> {
    let tokens = flow.complete(session, params).await.inspect_err(|e| {
        warn!("Login failed for session {}: {}", session, e);
    })?;

    let profile = platform_user::persist_best_effort(db, api, cipher, &tokens).await;
    if let ProfilePersistence::Failed(e) = &profile {
        warn!("Login for session {} succeeded without a stored profile: {}", session, e);
    }

    Ok(LoginOutcome { tokens, profile })
}

pub async fn logout<P: Provider, C: CredentialStore>(
    flow: &AuthorizationFlow<P, C>,
    session: &SessionId,
) -> Result<(), Error> {
    flow.logout(session).await?;
    info!("Session {} logged out", session);
    Ok(())
}

/// Tokens for an authenticated session, or `Unauthenticated`.
///
/// Expired access tokens are still returned; TikTok rejects them and that
/// answer is forwarded to the caller.
pub async fn require_tokens<P: Provider, C: CredentialStore>(
    flow: &AuthorizationFlow<P, C>,
    session: &SessionId,
) -> Result<TokenRecord, Error> {
    let tokens = flow.tokens(session).await?.ok_or_else(unauthenticated)?;
    if tokens.is_expired() {
        warn!(
            "Access token of session {} expired at {}",
            session,
            tokens.expires_at()
        );
    }
    Ok(tokens)
}

pub fn unauthenticated() -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::Auth(AuthErrorKind::Unauthenticated),
    }
}
