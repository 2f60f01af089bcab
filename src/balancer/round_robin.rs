//! Round-robin selection strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::balancer::SelectionPolicy;
use crate::error::DispatchError;
use crate::probe::LoadSample;
use crate::registry::{BackendAddr, Registry};

/// Rotates through the registry with a per-instance cursor.
///
/// Needs no load signal, so it never triggers a probe round and cannot fail
/// for a non-empty registry. Two router instances in the same process each
/// keep their own cursor.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionPolicy for RoundRobin {
    fn needs_probe(&self) -> bool {
        false
    }

    fn pick(&self, registry: &Registry, _samples: &[LoadSample]) -> Result<BackendAddr, DispatchError> {
        let addrs = registry.addrs();
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % addrs.len();
        Ok(addrs[index])
    }

    fn name(&self) -> &'static str {
        "round-robin"
    }
}
