//! Core configuration types and loading.

use super::defaults::{
    default_listen_address, default_liveness_interval_ms, default_nickname_prefix,
    default_outbound_queue, default_server_name,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity and naming.
    #[serde(default)]
    pub server: ServerConfig,
    /// WebSocket listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Optional HTTP listener for the landing page and `/metrics`.
    pub http: Option<HttpConfig>,
    /// Liveness probing configuration.
    #[serde(default)]
    pub liveness: LivenessConfig,
    /// Per-connection resource limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prefix of generated default display names (default: "AnonymousUser").
    #[serde(default = "default_nickname_prefix")]
    pub nickname_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            nickname_prefix: default_nickname_prefix(),
        }
    }
}

/// WebSocket listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:3333").
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
    /// Allowed `Origin` header values for the websocket handshake.
    /// Empty list allows every origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
            allow_origins: Vec::new(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to (e.g., "0.0.0.0:3334").
    pub address: SocketAddr,
}

/// Liveness probing configuration.
///
/// Every `interval_ms` each connection is probed. A connection still
/// unanswered at the next sweep is terminated, so a dead peer is dropped
/// after at most two intervals.
#[derive(Debug, Clone, Deserialize)]
pub struct LivenessConfig {
    /// Milliseconds between sweeps (default: 3000).
    #[serde(default = "default_liveness_interval_ms")]
    pub interval_ms: u64,
}

impl LivenessConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_liveness_interval_ms(),
        }
    }
}

/// Per-connection resource limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Outbound messages queued per connection before sends to it fail
    /// (default: 256).
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            outbound_queue: default_outbound_queue(),
        }
    }
}
