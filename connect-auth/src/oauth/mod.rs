//! OAuth 2.0 authorization code flow with PKCE.

mod pending;
mod provider;
mod secret;
mod session;

pub mod callback;
pub mod flow;
pub mod providers;
pub mod token;

pub use callback::{CallbackParams, ValidatedCallback};
pub use flow::AuthorizationFlow;
pub use pending::PendingStore;
pub use provider::{
    AuthorizationRequest, Provider, ProviderConfig, ProviderKind, DEFAULT_EXCHANGE_TIMEOUT,
};
pub use secret::{PendingAuthorization, PkceChallenge, PkceVerifier, StateToken};
pub use session::{SessionId, SessionState};
