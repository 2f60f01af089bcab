//! Least-loaded selection strategy.

use crate::balancer::SelectionPolicy;
use crate::error::DispatchError;
use crate::probe::LoadSample;
use crate::registry::{BackendAddr, Registry};

/// Selects the backend that reported the smallest load this round.
///
/// Ties go to the earlier registry entry. Samples arrive in registry order,
/// so `min_by_key` (which keeps the first minimum) gives a deterministic
/// pick regardless of which backend answered first.
#[derive(Debug, Default)]
pub struct LeastLoaded;

impl LeastLoaded {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionPolicy for LeastLoaded {
    fn needs_probe(&self) -> bool {
        true
    }

    fn pick(&self, _registry: &Registry, samples: &[LoadSample]) -> Result<BackendAddr, DispatchError> {
        samples
            .iter()
            .filter(|sample| sample.ok)
            .min_by_key(|sample| sample.load)
            .map(|sample| sample.addr)
            .ok_or(DispatchError::NoBackendAvailable)
    }

    fn name(&self) -> &'static str {
        "least-loaded"
    }
}
