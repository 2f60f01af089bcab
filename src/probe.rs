//! Concurrent load probing.
//!
//! # Responsibilities
//! - Query every backend's `GET /load` for one selection round
//! - Bound each query with its own short timeout
//! - Cap fan-out so a large registry does not open unbounded connections
//! - Always return one sample per backend, in registry order
//!
//! A failed probe never aborts its siblings, and there is no early exit once
//! a fast backend has answered: the selector needs every load to compare.

use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use futures_util::stream::{self, StreamExt};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use tokio::time;

use crate::registry::{BackendAddr, Registry};
use crate::wire::{self, LoadReport};

const LOAD_BODY_LIMIT: usize = 16 * 1024;

/// Outcome of probing one backend.
#[derive(Debug, Clone)]
pub struct LoadSample {
    pub addr: BackendAddr,
    pub load: u64,
    pub ok: bool,
    pub error: Option<String>,
}

impl LoadSample {
    pub fn reported(addr: BackendAddr, load: u64) -> Self {
        Self {
            addr,
            load,
            ok: true,
            error: None,
        }
    }

    pub fn failed(addr: BackendAddr, error: impl Into<String>) -> Self {
        Self {
            addr,
            load: 0,
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Fans load queries out to every backend and fans the samples back in.
#[derive(Clone)]
pub struct LoadProber {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    max_in_flight: usize,
}

impl LoadProber {
    pub fn new(client: Client<HttpConnector, Body>, timeout: Duration, max_in_flight: usize) -> Self {
        Self {
            client,
            timeout,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Probe every backend once.
    ///
    /// Waits for all queries to finish (success or failure) and returns the
    /// samples in registry order, independent of which backend answered
    /// first.
    pub async fn probe_all(&self, registry: &Registry) -> Vec<LoadSample> {
        stream::iter(registry.addrs().iter().copied())
            .map(|addr| self.probe_one(addr))
            .buffered(self.max_in_flight)
            .collect()
            .await
    }

    async fn probe_one(&self, addr: BackendAddr) -> LoadSample {
        // The timeout covers the whole exchange, body read included; a
        // backend that sends headers and then stalls its body must still
        // resolve to a failed sample within the probe budget.
        match time::timeout(self.timeout, self.query(addr)).await {
            Ok(sample) => sample,
            Err(_) => LoadSample::failed(addr, format!("load query timed out after {:?}", self.timeout)),
        }
    }

    async fn query(&self, addr: BackendAddr) -> LoadSample {
        let request = match Request::builder()
            .method("GET")
            .uri(wire::load_url(addr))
            .header("user-agent", "load-router-probe")
            .body(Body::empty())
        {
            Ok(request) => request,
            Err(e) => return LoadSample::failed(addr, e.to_string()),
        };

        match self.client.request(request).await {
            Ok(response) if response.status().is_success() => {
                let body = Body::new(response.into_body());
                match axum::body::to_bytes(body, LOAD_BODY_LIMIT).await {
                    Ok(bytes) => match serde_json::from_slice::<LoadReport>(&bytes) {
                        Ok(report) => {
                            tracing::debug!(addr = %addr, load = report.load, "probe ok");
                            LoadSample::reported(addr, report.load)
                        }
                        Err(e) => LoadSample::failed(addr, format!("bad load report: {}", e)),
                    },
                    Err(e) => LoadSample::failed(addr, format!("failed to read load report: {}", e)),
                }
            }
            Ok(response) => {
                LoadSample::failed(addr, format!("load query returned status {}", response.status()))
            }
            Err(e) => {
                tracing::debug!(addr = %addr, error = %e, "probe failed");
                LoadSample::failed(addr, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::{Json, Router};
    use hyper_util::rt::TokioExecutor;
    use std::str::FromStr;

    async fn spawn_load_endpoint(load: u64) -> BackendAddr {
        let app = Router::new().route("/load", get(move || async move { Json(LoadReport { load }) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        BackendAddr::from(addr)
    }

    fn prober() -> LoadProber {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        LoadProber::new(client, Duration::from_millis(500), 16)
    }

    #[tokio::test]
    async fn test_probe_all_returns_samples_in_registry_order() {
        let a = spawn_load_endpoint(5).await;
        let b = spawn_load_endpoint(2).await;
        let registry = Registry::new(vec![a, b]).unwrap();

        let samples = prober().probe_all(&registry).await;
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].addr, a);
        assert_eq!(samples[0].load, 5);
        assert!(samples[0].ok);
        assert_eq!(samples[1].addr, b);
        assert_eq!(samples[1].load, 2);
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_failed_sample() {
        let live = spawn_load_endpoint(1).await;
        // Bind and immediately drop a listener so the port is (almost
        // certainly) dead by the time we probe it.
        let dead = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            BackendAddr::from(listener.local_addr().unwrap())
        };
        let registry = Registry::new(vec![live, dead]).unwrap();

        let samples = prober().probe_all(&registry).await;
        assert_eq!(samples.len(), 2);
        assert!(samples[0].ok);
        assert!(!samples[1].ok);
        assert!(samples[1].error.is_some());
    }

    #[tokio::test]
    async fn test_stalled_body_is_bounded_by_probe_timeout() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Raw TCP backend: answers 200 with headers, starts the body, then
        // stalls forever without finishing it.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let stalled = BackendAddr::from(listener.local_addr().unwrap());
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket
                        .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 64\r\n\r\n{\"load\"")
                        .await;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                });
            }
        });
        let live = spawn_load_endpoint(4).await;
        let registry = Registry::new(vec![stalled, live]).unwrap();

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let prober = LoadProber::new(client, Duration::from_millis(300), 16);

        let started = tokio::time::Instant::now();
        let samples = prober.probe_all(&registry).await;

        // The stall costs at most the probe timeout, not the whole round.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(samples.len(), 2);
        assert!(!samples[0].ok);
        assert!(samples[0].error.as_deref().unwrap().contains("timed out"));
        assert!(samples[1].ok);
        assert_eq!(samples[1].load, 4);
    }

    #[test]
    fn test_failed_sample_shape() {
        let addr = BackendAddr::from_str("127.0.0.1:50051").unwrap();
        let sample = LoadSample::failed(addr, "connection refused");
        assert!(!sample.ok);
        assert_eq!(sample.load, 0);
        assert_eq!(sample.error.as_deref(), Some("connection refused"));
    }
}
