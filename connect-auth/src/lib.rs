//! # connect-auth
//!
//! OAuth 2.0 authorization code flow with PKCE for social platform logins:
//! - State and PKCE secret generation
//! - Authorization URL building and callback validation
//! - Token exchange against the provider (TikTok)
//! - Session-scoped credential storage and token encryption at rest
//! - HTTP client building for provider resource APIs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use connect_auth::oauth::{AuthorizationFlow, SessionId, providers::tiktok};
//! use connect_auth::oauth::token::MemoryCredentialStore;
//!
//! let flow = AuthorizationFlow::new(tiktok::Provider::new(config)?, MemoryCredentialStore::with_idle_ttl(idle), ttl);
//! let request = flow.begin(&session)?;
//! // redirect to request.url, then on callback:
//! let tokens = flow.complete(&session, &params).await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth;

pub use error::{Error, ErrorKind};
