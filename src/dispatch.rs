//! End-to-end dispatch: probe, select, forward.
//!
//! Per request the dispatcher walks RECEIVED → PROBING → SELECTED →
//! FORWARDING → COMPLETED/FAILED; under round-robin the probing step is
//! skipped. A failure at probing (no backend responded) or forwarding (the
//! chosen backend errored) feeds the retry policy, which re-drives the whole
//! cycle from the top under the shared deadline.
//!
//! Nothing here is serialized across requests: concurrent selection rounds
//! are independent, and the only shared state (the round-robin cursor and
//! the audit channel) synchronizes itself.

use std::time::Duration;

use axum::body::Body;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::audit::{AuditLog, RoutedRow};
use crate::balancer::{self, SelectionPolicy};
use crate::config::RouterConfig;
use crate::error::DispatchError;
use crate::forward::Forwarder;
use crate::probe::LoadProber;
use crate::registry::Registry;
use crate::retry::{RetryError, RetryPolicy};
use crate::wire::{WorkRequest, WorkResponse};

/// Routes work requests to backends.
pub struct Dispatcher {
    registry: Registry,
    policy: Box<dyn SelectionPolicy>,
    prober: LoadProber,
    forwarder: Forwarder,
    retry: RetryPolicy,
    audit: Option<AuditLog<RoutedRow>>,
}

impl Dispatcher {
    /// Assemble a dispatcher from configuration. One hyper client is shared
    /// between probing and forwarding.
    pub fn from_config(config: &RouterConfig, registry: Registry) -> Self {
        let client: Client<HttpConnector, Body> =
            Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let prober = LoadProber::new(
            client.clone(),
            Duration::from_millis(config.probe.timeout_ms),
            config.probe.max_in_flight,
        );
        let audit = config
            .audit
            .enabled
            .then(|| AuditLog::spawn(config.audit.path.clone().into()));

        Self {
            registry,
            policy: balancer::build(config.policy),
            prober,
            forwarder: Forwarder::new(client),
            retry: config.retries.into(),
            audit,
        }
    }

    /// Build a dispatcher from parts. Used by tests and by callers that
    /// want a non-default policy wiring.
    pub fn new(
        registry: Registry,
        policy: Box<dyn SelectionPolicy>,
        prober: LoadProber,
        forwarder: Forwarder,
        retry: RetryPolicy,
        audit: Option<AuditLog<RoutedRow>>,
    ) -> Self {
        Self {
            registry,
            policy,
            prober,
            forwarder,
            retry,
            audit,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// One full attempt: probe (if the policy needs it), pick, forward.
    pub async fn dispatch_once(&self, request: &WorkRequest) -> Result<WorkResponse, DispatchError> {
        let samples = if self.policy.needs_probe() {
            self.prober.probe_all(&self.registry).await
        } else {
            Vec::new()
        };

        let addr = self.policy.pick(&self.registry, &samples)?;
        tracing::debug!(
            work_id = request.work_id,
            backend = %addr,
            policy = self.policy.name(),
            "backend selected"
        );

        let response = self.forwarder.forward(addr, request).await?;

        if let Some(audit) = &self.audit {
            audit.record(RoutedRow {
                work_id: request.work_id,
                backend: addr.to_string(),
                result: response.result.clone(),
            });
        }

        Ok(response)
    }

    /// Dispatch with retries under the shared deadline.
    pub async fn dispatch(
        &self,
        request: &WorkRequest,
    ) -> Result<WorkResponse, RetryError<DispatchError>> {
        self.retry.run(|_attempt| self.dispatch_once(request)).await
    }
}
