//! Load-aware work router.
//!
//! Clients submit work units to the router; the router concurrently probes
//! every backend's in-flight load, forwards to the least loaded one, and
//! retries transient failures under a shared deadline. A round-robin policy
//! is available for deployments without a useful load signal.
//!
//! ```text
//! client ──▶ router /process
//!               │
//!               ├─ probe ──▶ backend A /load ─┐
//!               ├─ probe ──▶ backend B /load ─┼─▶ selector (min load,
//!               └─ probe ──▶ backend C /load ─┘    registry-order ties)
//!               │
//!               └─ forward ──▶ chosen backend /process ──▶ response
//!                                   │
//!                                   └─▶ audit writer task (CSV, serialized)
//! ```

// Core pipeline
pub mod balancer;
pub mod dispatch;
pub mod forward;
pub mod probe;
pub mod registry;
pub mod retry;

// Process surfaces
pub mod http;
pub mod load;
pub mod wire;
pub mod workload;

// Cross-cutting concerns
pub mod audit;
pub mod config;
pub mod error;

pub use config::RouterConfig;
pub use http::RouterServer;
pub use registry::Registry;
