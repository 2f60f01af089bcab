//! Error types for the routing pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::registry::BackendAddr;

/// Fatal startup errors. None of these are retryable; the process exits.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Server list file could not be read.
    #[error("failed to read server list {path}: {source}")]
    ServerList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line in the server list did not parse as host:port.
    #[error("invalid backend address '{0}'")]
    InvalidAddress(String),

    /// The server list contained no addresses.
    #[error("server list is empty")]
    EmptyRegistry,

    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config values are out of range or inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors produced by one dispatch attempt (probe, select, forward).
///
/// All variants are recoverable by retrying the whole attempt; the retry
/// layer decides whether to re-drive or surface them.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Every probe in the selection round failed.
    #[error("no backend available")]
    NoBackendAvailable,

    /// The chosen backend could not be reached or errored mid-request.
    #[error("forward to {addr} failed: {reason}")]
    Forward { addr: BackendAddr, reason: String },

    /// The chosen backend answered with a non-success status.
    #[error("backend {addr} returned status {status}")]
    BackendStatus { addr: BackendAddr, status: u16 },
}
