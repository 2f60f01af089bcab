//! Shared helpers for integration tests.
//!
//! Mock backends are real axum servers on ephemeral loopback ports, so the
//! router under test exercises its actual probe and forward paths.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use load_router::registry::BackendAddr;
use load_router::wire::{LoadReport, WorkRequest, WorkResponse};

/// Hit counter for a mock backend's `/process` route.
pub type Hits = Arc<AtomicU64>;

/// Start a backend that reports a fixed load and answers `/process` with a
/// canned result naming itself.
#[allow(dead_code)]
pub async fn start_mock_backend(load: u64, tag: &str) -> (BackendAddr, Hits) {
    let hits = Arc::new(AtomicU64::new(0));
    let handler_hits = hits.clone();
    let tag = tag.to_string();

    let app = Router::new()
        .route(
            "/load",
            get(move || async move { Json(LoadReport { load }) }),
        )
        .route(
            "/process",
            post(move |Json(request): Json<WorkRequest>| {
                let hits = handler_hits.clone();
                let tag = tag.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(WorkResponse {
                        result: format!("{} handled work {}", tag, request.work_id),
                    })
                }
            }),
        );

    (serve(app).await, hits)
}

/// Start a backend whose `/process` handler is supplied by the test.
/// `/load` always reports zero.
#[allow(dead_code)]
pub async fn start_programmable_backend<H, Fut>(handler: H) -> BackendAddr
where
    H: Fn(WorkRequest) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<WorkResponse, (u16, String)>> + Send + 'static,
{
    let app = Router::new()
        .route(
            "/load",
            get(|| async { Json(LoadReport { load: 0 }) }),
        )
        .route(
            "/process",
            post(move |Json(request): Json<WorkRequest>| {
                let handler = handler.clone();
                async move {
                    match handler(request).await {
                        Ok(response) => Ok(Json(response)),
                        Err((status, body)) => Err((
                            axum::http::StatusCode::from_u16(status)
                                .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
                            body,
                        )),
                    }
                }
            }),
        );

    serve(app).await
}

/// Reserve a loopback address with nothing listening on it.
#[allow(dead_code)]
pub async fn dead_addr() -> BackendAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    BackendAddr::from(listener.local_addr().unwrap())
}

async fn serve(app: Router) -> BackendAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    BackendAddr::from(addr)
}
