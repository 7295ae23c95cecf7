//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the router process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Public listener for proxied traffic.
    pub listener: ListenerConfig,

    /// Diagnostics listener (stats, reload, healthcheck).
    pub admin: AdminConfig,

    /// Where backend and route records are read from.
    pub store: StoreConfig,

    /// Backend transport timeouts.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
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

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,

    /// Admin bind address; keep this off the public interface.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Route store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the TOML route store.
    pub path: String,

    /// Reload automatically when the store file changes.
    pub watch: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "routes.toml".to_string(),
            watch: false,
        }
    }
}

/// Timeouts applied when dispatching to backends.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TCP connect timeout in milliseconds.
    pub backend_connect_ms: u64,

    /// Time allowed for the backend's response headers, in milliseconds.
    pub backend_header_ms: u64,
}

impl TimeoutConfig {
    pub fn backend_connect(&self) -> Duration {
        Duration::from_millis(self.backend_connect_ms)
    }

    pub fn backend_header(&self) -> Duration {
        Duration::from_millis(self.backend_header_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            backend_connect_ms: 1_000,
            backend_header_ms: 15_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
