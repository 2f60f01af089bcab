//! Configuration subsystem.
//!
//! Settings come from an optional TOML file plus command-line overrides,
//! both resolved at startup. The backend registry itself is loaded
//! separately from the newline-delimited server list (see `registry`).

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate};
pub use schema::{
    AuditConfig, ListenerConfig, PolicyKind, ProbeConfig, RetryConfig, RouterConfig, TimeoutConfig,
};
