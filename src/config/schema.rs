//! Router configuration schema.
//!
//! All types derive Serde traits for deserialization from a TOML file; the
//! binaries can override individual fields from the command line.

use serde::{Deserialize, Serialize};

/// Root configuration for the router process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Which selection policy this deployment runs. Explicit; the two
    /// policies are never mixed at runtime.
    pub policy: PolicyKind,

    /// Load probing settings.
    pub probe: ProbeConfig,

    /// Retry settings for the dispatch path.
    pub retries: RetryConfig,

    /// Audit log settings.
    pub audit: AuditConfig,

    /// Server-side timeout settings.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}

/// Selection policy choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Probe every backend and pick the smallest reported load.
    #[default]
    LeastLoaded,
    /// Rotate through the registry without probing.
    RoundRobin,
}

/// Load probing configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-probe timeout. Must be shorter than the request deadline.
    pub timeout_ms: u64,

    /// Cap on concurrent probes in one selection round.
    pub max_in_flight: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            max_in_flight: 16,
        }
    }
}

/// Retry configuration for one logical request.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,

    /// Fixed delay between attempts (no backoff, no jitter).
    pub delay_ms: u64,

    /// Overall deadline shared by all attempts of one request.
    pub deadline_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1_000,
            deadline_secs: 10,
        }
    }
}

/// Audit log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,

    /// CSV file the writer task appends to.
    pub path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "responses.csv".to_string(),
        }
    }
}

/// Server-side timeouts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout applied by the HTTP layer.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}
