//! HTTP client building with middleware for calls against provider resource APIs.

mod client;
mod retry;

pub use client::{ApiClient, ApiClientBuilder, HttpClientConfig};
pub use retry::BackoffPolicy;
