//! OAuth token types, session-scoped storage and encryption at rest.

pub mod encryption;
mod store;
mod tokens;

pub use store::{CredentialStore, MemoryCredentialStore};
pub use tokens::TokenRecord;
