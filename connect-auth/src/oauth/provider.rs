//! OAuth provider trait and types.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::secret::{PendingAuthorization, PkceVerifier};
use super::token::TokenRecord;
use crate::error::Error;

/// Default bound on the token exchange round trip.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Known OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    TikTok,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::TikTok => "tiktok",
        }
    }
}

/// Client registration and endpoints for a provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Client identifier issued by the provider.
    pub client_id: String,
    /// Client secret issued by the provider.
    pub client_secret: SecretString,
    /// Where the provider sends the browser back to.
    pub redirect_uri: String,
    /// Requested scopes, joined with commas in the authorization URL.
    pub scopes: Vec<String>,
    /// Authorization endpoint (browser redirect).
    pub auth_url: String,
    /// Token endpoint (form POST).
    pub token_url: String,
    /// Upper bound on the token exchange request.
    pub exchange_timeout: Duration,
}

/// Authorization request with URL and the state it carries.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// CSRF state parameter embedded in the URL.
    pub state: String,
}

/// Trait for OAuth 2.0 providers.
///
/// Implementations handle platform-specific details of:
/// - Authorization URL generation with PKCE
/// - Authorization code exchange for tokens
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Build the authorization URL for a freshly issued pending authorization.
    ///
    /// Pure: no network or storage access.
    fn authorization_url(&self, pending: &PendingAuthorization) -> AuthorizationRequest;

    /// Exchange an authorization code for tokens.
    ///
    /// Performs exactly one request. Codes are single use at the provider, so
    /// this never retries; a caller that wants to retry must restart the login.
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &PkceVerifier,
    ) -> Result<TokenRecord, Error>;
}
