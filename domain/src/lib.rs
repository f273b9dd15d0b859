//! Business logic for connecting TikTok accounts.
//!
//! This crate re-exports the records and auth types `web` needs, so that `web` does not
//! depend on `entity_api` or `connect-auth` directly.
pub use entity_api::{platform_tokens, platform_users, OpenId};

pub use connect_auth::oauth::token::{encryption::TokenCipher, TokenRecord};
pub use connect_auth::oauth::{CallbackParams, SessionId, SessionState};

pub mod auth;
pub mod error;
pub mod gateway;
pub mod platform_user;
