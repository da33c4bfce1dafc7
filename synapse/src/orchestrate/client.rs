//! HTTP client for the Orchestrate REST API
//!
//! This module provides the low-level HTTP client with bearer-token
//! injection, retry logic, and error mapping shared by the directory and
//! run layers.

use super::auth::AuthManager;
use super::models::ThreadId;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Orchestrate client error types
#[derive(Debug, Error)]
pub enum OrchestrateError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Platform unreachable
    #[error("Orchestrate unavailable: {0}")]
    Unavailable(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Platform returned a non-success status
    #[error("Orchestrate error (HTTP {status}): {body}")]
    Api { status: StatusCode, body: String },

    /// Authentication against the platform failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No agent matched the given identifier
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// No thread matched the given identifier
    #[error("Thread not found: {0}")]
    ThreadNotFound(ThreadId),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for OrchestrateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OrchestrateError::Timeout(err.to_string())
        } else if err.is_connect() {
            OrchestrateError::Unavailable(err.to_string())
        } else {
            OrchestrateError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for OrchestrateError {
    fn from(err: serde_json::Error) -> Self {
        OrchestrateError::Serialization(err.to_string())
    }
}

/// Result type for Orchestrate operations
pub type Result<T> = std::result::Result<T, OrchestrateError>;

/// Configuration for the Orchestrate client
#[derive(Debug, Clone)]
pub struct OrchestrateConfig {
    /// Base URL of the Orchestrate API
    pub base_url: String,
    /// API key exchanged for a bearer token
    pub api_key: String,
    /// Seconds between re-authentications (0 = re-authenticate on every request)
    pub auth_refresh_secs: u64,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connection pool size
    pub connection_pool_size: usize,
    /// Maximum retry attempts for retryable failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Delay between completion-poll fetches in milliseconds
    pub poll_interval_ms: u64,
    /// Give up polling for a completed reply after this many seconds
    pub poll_max_wait_secs: u64,
    /// Below this elapsed wait, short replies are not yet judged complete
    pub poll_min_wait_secs: u64,
}

impl Default for OrchestrateConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4321".to_string(),
            api_key: String::new(),
            auth_refresh_secs: 300,
            request_timeout_secs: 30,
            connection_pool_size: 10,
            max_retries: 3,
            retry_delay_ms: 1000,
            poll_interval_ms: 2000,
            poll_max_wait_secs: 300,
            poll_min_wait_secs: 30,
        }
    }
}

/// Internal Orchestrate HTTP client
#[derive(Clone)]
pub(crate) struct OrchestrateClient {
    client: HttpClient,
    base_url: String,
    auth: Arc<AuthManager>,
    config: OrchestrateConfig,
}

impl OrchestrateClient {
    /// Create a new Orchestrate client
    pub fn new(config: OrchestrateConfig) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(config.connection_pool_size)
            .build()?;

        let auth = Arc::new(AuthManager::new(
            client.clone(),
            config.base_url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.auth_refresh_secs),
        ));

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            auth,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &OrchestrateConfig {
        &self.config
    }

    /// Get the auth manager
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(Method::GET, path, None).await
    }

    /// Make a POST request
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.dispatch(Method::POST, path, Some(body)).await
    }

    /// Execute a request, re-authenticating once on a 401 response.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let response = self.send(method.clone(), &url, body.as_ref(), false).await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Received 401 from {}, refreshing token and retrying once", url);
            self.send(method, &url, body.as_ref(), true).await?
        } else {
            response
        };

        Self::parse_response(response).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        force_fresh_token: bool,
    ) -> Result<Response> {
        let token = if force_fresh_token {
            self.auth.force_refresh().await?
        } else {
            self.auth.token().await?
        };

        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Parse a response body, surfacing status + body text on failure
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("HTTP error {}: {}", status, body);
            return Err(OrchestrateError::Api { status, body });
        }

        let text = response.text().await?;
        debug!("Response body: {}", text);

        serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse response: {}", e);
            OrchestrateError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }

    /// Execute an operation with retry logic for retryable failures
    pub async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Request succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(e) if attempt < self.config.max_retries && Self::is_retryable(&e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}",
                        attempt + 1,
                        self.config.max_retries,
                        e
                    );

                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f32(2.0);
                    attempt += 1;
                }
                Err(e) => {
                    error!("Request failed permanently: {}", e);
                    return Err(e);
                }
            }
        }
    }

    /// Check if an error is retryable
    fn is_retryable(error: &OrchestrateError) -> bool {
        matches!(
            error,
            OrchestrateError::Network(_)
                | OrchestrateError::Timeout(_)
                | OrchestrateError::Unavailable(_)
        )
    }
}

/// Map a missing-agent lookup into the dedicated error variant
pub(crate) fn agent_not_found(descriptor: impl Into<String>) -> OrchestrateError {
    OrchestrateError::AgentNotFound(descriptor.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = OrchestrateConfig::default();
        assert_eq!(config.auth_refresh_secs, 300);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.poll_max_wait_secs, 300);
    }

    #[test]
    fn test_is_retryable() {
        assert!(OrchestrateClient::is_retryable(&OrchestrateError::Network(
            "test".to_string()
        )));
        assert!(OrchestrateClient::is_retryable(&OrchestrateError::Timeout(
            "test".to_string()
        )));
        assert!(OrchestrateClient::is_retryable(
            &OrchestrateError::Unavailable("test".to_string())
        ));
        assert!(!OrchestrateClient::is_retryable(&OrchestrateError::Api {
            status: StatusCode::BAD_REQUEST,
            body: "test".to_string(),
        }));
        assert!(!OrchestrateClient::is_retryable(&OrchestrateError::Auth(
            "test".to_string()
        )));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = OrchestrateConfig {
            base_url: "http://localhost:4321/".to_string(),
            ..Default::default()
        };
        let client = OrchestrateClient::new(config).unwrap();
        assert_eq!(client.base_url, "http://localhost:4321");
    }
}
