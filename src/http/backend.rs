//! Backend HTTP surface.
//!
//! A backend runs the simulated heavy workload for `/process` and reports
//! its in-flight count on `/load`. The load guard is held for the whole
//! handler, so the count is accurate for any probe that lands mid-request
//! and returns to its prior value on every exit path.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::audit::{AuditLog, HandledRow};
use crate::load::LoadTracker;
use crate::wire::{LoadReport, WorkRequest, WorkResponse};
use crate::workload;

/// State shared by the backend handlers.
#[derive(Clone)]
pub struct BackendState {
    pub tracker: Arc<LoadTracker>,
    pub audit: Option<AuditLog<HandledRow>>,
    /// Iteration count for the simulated workload.
    pub work_size: u64,
}

impl BackendState {
    pub fn new(work_size: u64, audit: Option<AuditLog<HandledRow>>) -> Self {
        Self {
            tracker: Arc::new(LoadTracker::new()),
            audit,
            work_size,
        }
    }
}

/// Build the backend's axum app.
pub fn backend_app(state: BackendState) -> Router {
    Router::new()
        .route("/process", post(process_handler))
        .route("/load", get(load_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn process_handler(
    State(state): State<BackendState>,
    Json(request): Json<WorkRequest>,
) -> Result<Json<WorkResponse>, (StatusCode, String)> {
    let _guard = state.tracker.begin();
    let started = Instant::now();

    tracing::info!(
        work_id = request.work_id,
        load = state.tracker.current(),
        "processing request"
    );

    // CPU-bound; keep it off the runtime worker threads.
    let work_size = state.work_size;
    let value = tokio::task::spawn_blocking(move || workload::heavy_computation(work_size))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("workload failed: {}", e),
            )
        })?;

    let elapsed = started.elapsed();
    let result = format!(
        "work {}: value = {:.2}, elapsed = {}ms",
        request.work_id,
        value,
        elapsed.as_millis()
    );

    tracing::info!(
        work_id = request.work_id,
        elapsed_ms = elapsed.as_millis() as u64,
        total_handled = state.tracker.total_handled(),
        "request processed"
    );

    if let Some(audit) = &state.audit {
        audit.record(HandledRow {
            work_id: request.work_id,
            result: result.clone(),
            active_load: state.tracker.current(),
        });
    }

    Ok(Json(WorkResponse { result }))
}

async fn load_handler(State(state): State<BackendState>) -> Json<LoadReport> {
    let load = state.tracker.current();
    tracing::debug!(load, "reporting load");
    Json(LoadReport { load })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BackendAddr;

    async fn spawn(work_size: u64) -> BackendAddr {
        let app = backend_app(BackendState::new(work_size, None));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        BackendAddr::from(addr)
    }

    #[tokio::test]
    async fn test_process_embeds_work_id() {
        let addr = spawn(1_000).await;
        let client = reqwest::Client::new();

        let response: WorkResponse = client
            .post(crate::wire::process_url(addr))
            .json(&WorkRequest {
                work_id: 42,
                payload: "Heavy Task".into(),
            })
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert!(response.result.starts_with("work 42:"));
    }

    #[tokio::test]
    async fn test_load_returns_to_zero_after_processing() {
        let addr = spawn(1_000).await;
        let client = reqwest::Client::new();

        client
            .post(crate::wire::process_url(addr))
            .json(&WorkRequest {
                work_id: 1,
                payload: "x".into(),
            })
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap();

        let report: LoadReport = client
            .get(crate::wire::load_url(addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(report.load, 0);
    }
}
