//! Backend registry.
//!
//! # Responsibilities
//! - Hold the ordered list of backend addresses for this run
//! - Load the list from a newline-delimited file at startup
//! - Reject empty or unreadable sources as fatal configuration errors
//!
//! The registry is immutable once constructed; order matters because it is
//! the tie-break for least-loaded selection.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;

/// Address of a single backend (host:port).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendAddr(SocketAddr);

impl BackendAddr {
    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for BackendAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl FromStr for BackendAddr {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>()
            .map(Self)
            .map_err(|_| ConfigError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for BackendAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordered, non-empty list of backends. Immutable for the life of a run.
#[derive(Debug, Clone)]
pub struct Registry {
    addrs: Vec<BackendAddr>,
}

impl Registry {
    /// Build a registry from explicit addresses.
    pub fn new(addrs: Vec<BackendAddr>) -> Result<Self, ConfigError> {
        if addrs.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }
        Ok(Self { addrs })
    }

    /// Load a registry from a newline-delimited file.
    ///
    /// Blank lines and `#` comments are skipped. An unreadable file, a bad
    /// address, or an empty result are all fatal.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ServerList {
            path: path.to_path_buf(),
            source,
        })?;
        let addrs = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(BackendAddr::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(addrs)
    }

    pub fn addrs(&self) -> &[BackendAddr] {
        &self.addrs
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
