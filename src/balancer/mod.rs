//! Backend selection policies.
//!
//! # Data Flow
//! ```text
//! Request arrives at the dispatcher
//!     → policy.needs_probe()?
//!         yes → probe every backend (probe.rs) → samples
//!         no  → empty sample set
//!     → policy.pick(registry, samples)
//!         - least_loaded.rs (minimum reported load, registry-order ties)
//!         - round_robin.rs (rotate a per-instance cursor)
//!     → Return chosen address or NoBackendAvailable
//! ```
//!
//! # Design Decisions
//! - Both policies sit behind one trait so the dispatch path is agnostic
//! - The round-robin cursor lives in its policy instance, never in a global
//! - Which policy runs is explicit configuration; they are never mixed

pub mod least_loaded;
pub mod round_robin;

use crate::config::PolicyKind;
use crate::error::DispatchError;
use crate::probe::LoadSample;
use crate::registry::{BackendAddr, Registry};

/// A backend selection policy for one router instance.
pub trait SelectionPolicy: Send + Sync + std::fmt::Debug {
    /// Whether this policy needs a fresh probe round before [`pick`].
    ///
    /// [`pick`]: SelectionPolicy::pick
    fn needs_probe(&self) -> bool;

    /// Choose a backend for one request.
    ///
    /// `samples` holds one entry per registry address in registry order when
    /// `needs_probe` returned true, and is empty otherwise.
    fn pick(&self, registry: &Registry, samples: &[LoadSample]) -> Result<BackendAddr, DispatchError>;

    fn name(&self) -> &'static str;
}

/// Instantiate the configured policy.
pub fn build(kind: PolicyKind) -> Box<dyn SelectionPolicy> {
    match kind {
        PolicyKind::LeastLoaded => Box::new(least_loaded::LeastLoaded::new()),
        PolicyKind::RoundRobin => Box::new(round_robin::RoundRobin::new()),
    }
}
