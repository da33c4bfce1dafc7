//! Configuration for the Synapse gateway
//!
//! Everything is environment-driven so the gateway deploys unchanged to
//! container platforms. A local `.env` file is honored for development.
//!
//! Required variables: `ORCHESTRATE_BASE_URL`, `ORCHESTRATE_API_KEY`.

use crate::agent::LlmConfig;
use crate::orchestrate::OrchestrateConfig;
use anyhow::{Context, Result};
use std::str::FromStr;

/// Bind address and public URL of the A2A server
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Externally visible URL advertised in the agent card. `"auto"` resolves
    /// from the platform-injected `SERVICE_URL`; unset falls back to the bind
    /// address.
    pub public_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: None,
        }
    }
}

impl ServerSettings {
    /// Resolve the URL to advertise in the agent card.
    ///
    /// `service_url` is the value of the `SERVICE_URL` environment variable,
    /// passed in so the resolution stays a pure function.
    pub fn resolve_public_url(&self, service_url: Option<String>) -> String {
        let bind_url = format!("http://{}:{}/", self.host, self.port);
        match self.public_url.as_deref() {
            None => bind_url,
            Some("auto") => service_url.unwrap_or(bind_url),
            Some(explicit) => explicit.to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default)]
pub struct SynapseConfig {
    /// A2A server settings
    pub server: ServerSettings,
    /// Orchestrate platform client settings
    pub orchestrate: OrchestrateConfig,
    /// LLM backend settings
    pub llm: LlmConfig,
}

impl SynapseConfig {
    /// Read configuration from the environment.
    ///
    /// Missing required variables and unparsable numeric values are hard
    /// errors; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env for local development; absence is not an error
        dotenvy::dotenv().ok();

        let mut orchestrate = OrchestrateConfig {
            base_url: require("ORCHESTRATE_BASE_URL")?,
            api_key: require("ORCHESTRATE_API_KEY")?,
            ..Default::default()
        };
        if let Some(value) = parse_env("ORCHESTRATE_AUTH_REFRESH_SECS")? {
            orchestrate.auth_refresh_secs = value;
        }
        if let Some(value) = parse_env("ORCHESTRATE_TIMEOUT_SECS")? {
            orchestrate.request_timeout_secs = value;
        }
        if let Some(value) = parse_env("ORCHESTRATE_MAX_RETRIES")? {
            orchestrate.max_retries = value;
        }
        if let Some(value) = parse_env("ORCHESTRATE_POLL_INTERVAL_MS")? {
            orchestrate.poll_interval_ms = value;
        }
        if let Some(value) = parse_env("ORCHESTRATE_POLL_MAX_WAIT_SECS")? {
            orchestrate.poll_max_wait_secs = value;
        }
        if let Some(value) = parse_env("ORCHESTRATE_POLL_MIN_WAIT_SECS")? {
            orchestrate.poll_min_wait_secs = value;
        }

        let mut server = ServerSettings::default();
        if let Ok(host) = std::env::var("SYNAPSE_HOST") {
            server.host = host;
        }
        if let Some(port) = parse_env("SYNAPSE_PORT")? {
            server.port = port;
        }
        // Container platforms inject the listening port as PORT
        if let Some(port) = parse_env("PORT")? {
            server.port = port;
        }
        server.public_url = std::env::var("SYNAPSE_PUBLIC_URL").ok();

        let mut llm = LlmConfig::default();
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            llm.base_url = base_url;
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            llm.api_key = api_key;
        }
        if let Ok(model) = std::env::var("SYNAPSE_MODEL") {
            llm.model = model;
        }
        if let Some(max_turns) = parse_env("SYNAPSE_MAX_TURNS")? {
            llm.max_turns = max_turns;
        }

        Ok(Self {
            server,
            orchestrate,
            llm,
        })
    }
}

fn require(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} environment variable not set", key))
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => {
            let parsed = value
                .parse()
                .with_context(|| format!("invalid value for {}: {}", key, value))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let settings = ServerSettings::default();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8080);
        assert!(settings.public_url.is_none());
    }

    #[test]
    fn test_public_url_defaults_to_bind_address() {
        let settings = ServerSettings::default();
        assert_eq!(
            settings.resolve_public_url(None),
            "http://0.0.0.0:8080/".to_string()
        );
    }

    #[test]
    fn test_public_url_auto_prefers_service_url() {
        let settings = ServerSettings {
            public_url: Some("auto".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.resolve_public_url(Some("https://gw.example.run/".to_string())),
            "https://gw.example.run/"
        );
        // Without an injected URL, auto falls back to the bind address
        assert_eq!(settings.resolve_public_url(None), "http://0.0.0.0:8080/");
    }

    #[test]
    fn test_public_url_explicit_wins() {
        let settings = ServerSettings {
            public_url: Some("https://agents.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.resolve_public_url(Some("https://gw.example.run/".to_string())),
            "https://agents.example.com/"
        );
    }
}
