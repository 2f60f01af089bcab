//! Router HTTP server.
//!
//! # Responsibilities
//! - Serve the routing RPC surface (`/process`, `/load`)
//! - Wire up middleware (trace, whole-request timeout)
//! - Track the router's own in-flight count so `/load` is meaningful
//! - Translate dispatch failures into HTTP statuses

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::RouterConfig;
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::load::LoadTracker;
use crate::registry::Registry;
use crate::retry::RetryError;
use crate::wire::{LoadReport, WorkRequest};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct RouterState {
    pub dispatcher: Arc<Dispatcher>,
    pub tracker: Arc<LoadTracker>,
}

/// HTTP server for the router process.
pub struct RouterServer {
    router: Router,
}

impl RouterServer {
    /// Create a server with the given configuration and backend registry.
    pub fn new(config: &RouterConfig, registry: Registry) -> Self {
        let state = RouterState {
            dispatcher: Arc::new(Dispatcher::from_config(config, registry)),
            tracker: Arc::new(LoadTracker::new()),
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    fn build_router(config: &RouterConfig, state: RouterState) -> Router {
        Router::new()
            .route("/process", post(process_handler))
            .route("/load", get(load_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "router listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("router stopped");
        Ok(())
    }
}

async fn process_handler(
    State(state): State<RouterState>,
    Json(request): Json<WorkRequest>,
) -> Response {
    let _guard = state.tracker.begin();
    tracing::info!(work_id = request.work_id, "request received");

    match state.dispatcher.dispatch(&request).await {
        Ok(response) => {
            tracing::info!(work_id = request.work_id, "request completed");
            Json(response).into_response()
        }
        Err(error) => {
            tracing::error!(work_id = request.work_id, %error, "dispatch failed");
            (status_for(&error), error.to_string()).into_response()
        }
    }
}

async fn load_handler(State(state): State<RouterState>) -> Json<LoadReport> {
    Json(LoadReport {
        load: state.tracker.current(),
    })
}

fn status_for(error: &RetryError<DispatchError>) -> StatusCode {
    match error {
        RetryError::Exhausted(DispatchError::NoBackendAvailable) => StatusCode::SERVICE_UNAVAILABLE,
        RetryError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
