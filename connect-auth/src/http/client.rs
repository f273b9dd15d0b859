//! Resource API client builder with retry middleware.

use std::time::Duration;

use reqwest_middleware::ClientBuilder;
use reqwest_retry::RetryTransientMiddleware;

use super::BackoffPolicy;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries for transient failures.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub retry_base_delay: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
            user_agent: format!("connect-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client for provider resource APIs.
pub type ApiClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for [`ApiClient`].
///
/// Only resource calls go through this client. The token exchange uses a
/// plain client because authorization codes are single use.
pub struct ApiClientBuilder {
    config: HttpClientConfig,
}

impl ApiClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.config.retry_base_delay = delay;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<ApiClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let retry_policy = BackoffPolicy::new(self.config.max_retries, self.config.retry_base_delay);
        let client_with_middleware = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(client_with_middleware)
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let builder = ApiClientBuilder::new();
        assert_eq!(builder.config.timeout, Duration::from_secs(10));
        assert_eq!(builder.config.max_retries, 2);
    }

    #[test]
    fn test_builder_overrides() {
        let builder = ApiClientBuilder::new()
            .with_timeout(Duration::from_secs(3))
            .with_max_retries(0)
            .with_retry_base_delay(Duration::from_millis(1));
        assert_eq!(builder.config.timeout, Duration::from_secs(3));
        assert_eq!(builder.config.max_retries, 0);
        assert_eq!(builder.config.retry_base_delay, Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = ApiClientBuilder::new()
            .with_max_retries(2)
            .with_retry_base_delay(Duration::from_millis(1))
            .build()
            .unwrap();
        let response = client
            .get(format!("{}/flaky", server.url()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        mock.assert_async().await;
    }
}
