//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config files.
//! Every field except `upstream.target_base_url` has a usable default so a
//! minimal config (or CLI flags alone) is enough to run.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// The single upstream origin all requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Optional forwarding behaviors layered on top of the core relay.
    pub forwarding: ForwardingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream origin (scheme + host + port).
    /// Required; there is no sensible default.
    pub target_base_url: String,

    /// Overall budget for one request/connection attempt in seconds,
    /// covering connect, write, and read as a whole.
    pub timeout_secs: u64,

    /// Maximum number of concurrent upstream connections.
    pub max_conn: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            target_base_url: String::new(),
            timeout_secs: 30,
            max_conn: 100,
        }
    }
}

/// Optional forwarding behaviors.
///
/// Both default to off, which leaves the header rewrite policy at its plain
/// pass-through-except-Host form.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Answer CORS preflight requests locally and stamp permissive CORS
    /// headers on forwarded responses.
    pub cors_enabled: bool,

    /// Stamp `X-Real-IP`, `X-Forwarded-For`, and `X-Forwarded-Proto` on
    /// upstream requests.
    pub forwarded_headers: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
