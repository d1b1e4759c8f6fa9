//! Relay configuration
//!
//! Values come from the environment (optionally a `.env` file). The agent
//! host and the public callback URL are supplied externally; nothing is
//! derived at runtime.

use reqwest::Url;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::RelayError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
pub const DEFAULT_AGENT_BASE_URL: &str = "https://webhook.operacaocodigodeouro.com.br/webhook";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Settings for the relay server and its agent gateway
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket server listens on
    pub bind_addr: SocketAddr,
    /// Base URL of the agent webhooks; the agent path is appended to it
    pub agent_base_url: String,
    /// Static bearer token sent to the agent
    pub bearer_token: String,
    /// Public URL of this relay's `/callback`, sent as `targetHost`
    pub callback_target_url: String,
    /// Connect timeout for outbound agent calls
    pub connect_timeout: Duration,
    /// Largest accepted `/send-to-agent` body
    pub max_upload_bytes: u64,
}

impl RelayConfig {
    /// Create a configuration with the required credentials and defaults for the rest
    pub fn new(bearer_token: impl Into<String>, callback_target_url: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 3001))),
            agent_base_url: DEFAULT_AGENT_BASE_URL.to_string(),
            bearer_token: bearer_token.into(),
            callback_target_url: callback_target_url.into(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    pub fn with_agent_base_url(mut self, agent_base_url: impl Into<String>) -> Self {
        self.agent_base_url = agent_base_url.into();
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| RelayError::Config(format!("{key} must be set")))
        };

        let mut config = Self::new(
            required("AGENT_BEARER_TOKEN")?,
            required("CALLBACK_TARGET_URL")?,
        );

        if let Some(addr) = lookup("RELAY_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|e| RelayError::Config(format!("RELAY_BIND_ADDR {addr:?}: {e}")))?;
        }
        if let Some(url) = lookup("AGENT_BASE_URL") {
            config.agent_base_url = url;
        }
        if let Some(secs) = lookup("AGENT_CONNECT_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| {
                RelayError::Config(format!("AGENT_CONNECT_TIMEOUT_SECS {secs:?}: {e}"))
            })?;
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = lookup("RELAY_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = bytes.parse().map_err(|e| {
                RelayError::Config(format!("RELAY_MAX_UPLOAD_BYTES {bytes:?}: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that both URLs parse
    pub fn validate(&self) -> Result<(), RelayError> {
        Url::parse(&self.agent_base_url)
            .map_err(|e| RelayError::Config(format!("AGENT_BASE_URL: {e}")))?;
        Url::parse(&self.callback_target_url)
            .map_err(|e| RelayError::Config(format!("CALLBACK_TARGET_URL: {e}")))?;
        Ok(())
    }
}
