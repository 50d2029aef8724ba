//! Gateway settings as read from TOML.
//!
//! Only `secret` has no usable default. Everything else (listener address,
//! outbound client knobs, edge cache bounds, log level and metrics) can be
//! left out of the file entirely.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Shared secret expected in the `X-Proxy-Secret` header.
    pub secret: String,

    /// Version string reported by `/health` and `X-Proxy-Version`.
    pub version: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound client settings.
    pub upstream: UpstreamConfig,

    /// In-process edge cache honouring `cacheTtl`.
    pub edge_cache: EdgeCacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            edge_cache: EdgeCacheConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Build a config with the given secret and defaults everywhere else.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Outbound HTTP client configuration.
///
/// The gateway itself imposes no request timeout; a connect timeout is the
/// only knob exposed here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: Option<u64>,

    /// User-Agent applied only when the caller did not send one.
    pub user_agent: Option<String>,

    /// Honour HTTP_PROXY / HTTPS_PROXY / NO_PROXY for outbound calls.
    pub system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            user_agent: None,
            system_proxy: true,
        }
    }
}

/// Edge cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeCacheConfig {
    /// Store responses when a positive `cacheTtl` is supplied.
    pub enabled: bool,

    /// Maximum number of cached targets.
    pub max_entries: usize,

    /// Responses with larger bodies are streamed but never stored.
    pub max_entry_bytes: usize,
}

impl Default for EdgeCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1024,
            max_entry_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
