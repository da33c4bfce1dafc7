//! Authentication against the Orchestrate platform
//!
//! The platform exchanges an API key for a short-lived bearer token. This
//! module caches the token and re-authenticates on a configurable interval,
//! when the token's own `exp` claim is about to lapse, or on demand.

use super::client::{OrchestrateError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Safety margin subtracted from the token's `exp` claim
const EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
struct TokenRequest<'a> {
    api_key: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    token: String,
}

/// A cached bearer token
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// The bearer token value
    pub token: String,
    /// When this token was acquired
    pub acquired_at: DateTime<Utc>,
    /// Unix seconds from the token's `exp` claim, when one is present
    pub expires_at: Option<i64>,
}

/// Token cache with interval-based refresh
pub struct AuthManager {
    http: HttpClient,
    base_url: String,
    api_key: String,
    /// Zero means re-authenticate on every request
    refresh_interval: Duration,
    state: RwLock<Option<AuthToken>>,
}

impl AuthManager {
    /// Create a token cache for the given platform and refresh interval
    pub fn new(
        http: HttpClient,
        base_url: String,
        api_key: String,
        refresh_interval: Duration,
    ) -> Self {
        if refresh_interval.is_zero() {
            info!("Configured to re-authenticate on every request");
        } else {
            info!(
                "Configured to re-authenticate every {} seconds",
                refresh_interval.as_secs()
            );
        }

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            refresh_interval,
            state: RwLock::new(None),
        }
    }

    /// Return a valid bearer token, re-authenticating when needed
    pub async fn token(&self) -> Result<String> {
        {
            let guard = self.state.read().await;
            if let Some(cached) = guard.as_ref() {
                if !self.needs_refresh(cached) {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut guard = self.state.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(cached) = guard.as_ref() {
            if !self.needs_refresh(cached) {
                return Ok(cached.token.clone());
            }
        }

        debug!("Bearer token missing or stale, authenticating");
        let fresh = self.authenticate().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token and authenticate immediately
    pub async fn force_refresh(&self) -> Result<String> {
        info!("Forcing authentication refresh");
        {
            let mut guard = self.state.write().await;
            *guard = None;
        }
        self.token().await
    }

    fn needs_refresh(&self, cached: &AuthToken) -> bool {
        if self.refresh_interval.is_zero() {
            return true;
        }

        let age = Utc::now()
            .signed_duration_since(cached.acquired_at)
            .num_seconds();
        if age >= self.refresh_interval.as_secs() as i64 {
            return true;
        }

        if let Some(exp) = cached.expires_at {
            if Utc::now().timestamp() >= exp - EXPIRY_MARGIN_SECS {
                return true;
            }
        }

        false
    }

    async fn authenticate(&self) -> Result<AuthToken> {
        let url = format!("{}/auth/token", self.base_url);
        let request = TokenRequest {
            api_key: &self.api_key,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OrchestrateError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrchestrateError::Auth(format!(
                "token endpoint returned HTTP {}: {}",
                status, body
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OrchestrateError::Auth(format!("invalid token response: {}", e)))?;

        let expires_at = decode_jwt_exp(&body.token);
        if expires_at.is_none() {
            warn!("Bearer token carries no readable exp claim, relying on refresh interval");
        }

        info!("Authentication successful");
        Ok(AuthToken {
            token: body.token,
            acquired_at: Utc::now(),
            expires_at,
        })
    }
}

/// Read the `exp` claim from a JWT payload without verifying the signature.
/// Verification belongs to the platform; this layer only schedules refresh.
fn decode_jwt_exp(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    claims.get("exp")?.as_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp, "sub": "tester" }).to_string());
        format!("{}.{}.signature", header, payload)
    }

    fn manager(refresh_secs: u64) -> AuthManager {
        AuthManager::new(
            HttpClient::new(),
            "http://localhost:4321".to_string(),
            "key".to_string(),
            Duration::from_secs(refresh_secs),
        )
    }

    #[test]
    fn test_decode_jwt_exp() {
        let token = jwt_with_exp(1_900_000_000);
        assert_eq!(decode_jwt_exp(&token), Some(1_900_000_000));
    }

    #[test]
    fn test_decode_jwt_exp_opaque_token() {
        assert_eq!(decode_jwt_exp("not-a-jwt"), None);
        assert_eq!(decode_jwt_exp("a.b.c"), None);
    }

    #[test]
    fn test_zero_interval_always_refreshes() {
        let manager = manager(0);
        let cached = AuthToken {
            token: "t".to_string(),
            acquired_at: Utc::now(),
            expires_at: None,
        };
        assert!(manager.needs_refresh(&cached));
    }

    #[test]
    fn test_fresh_token_is_kept() {
        let manager = manager(300);
        let cached = AuthToken {
            token: "t".to_string(),
            acquired_at: Utc::now(),
            expires_at: Some(Utc::now().timestamp() + 3600),
        };
        assert!(!manager.needs_refresh(&cached));
    }

    #[test]
    fn test_aged_token_is_refreshed() {
        let manager = manager(300);
        let cached = AuthToken {
            token: "t".to_string(),
            acquired_at: Utc::now() - chrono::Duration::seconds(301),
            expires_at: None,
        };
        assert!(manager.needs_refresh(&cached));
    }

    #[test]
    fn test_near_expiry_token_is_refreshed() {
        let manager = manager(300);
        let cached = AuthToken {
            token: "t".to_string(),
            acquired_at: Utc::now(),
            expires_at: Some(Utc::now().timestamp() + EXPIRY_MARGIN_SECS - 1),
        };
        assert!(manager.needs_refresh(&cached));
    }
}
