//! Request forwarding.

use axum::body::Body;
use axum::http::{header, Request};
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::error::DispatchError;
use crate::registry::BackendAddr;
use crate::wire::{self, WorkRequest, WorkResponse};

const RESPONSE_BODY_LIMIT: usize = 1024 * 1024;

/// Submits a work request to a chosen backend.
///
/// Performs exactly one attempt per call; retries are a policy layered above
/// in `retry`, never here.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
}

impl Forwarder {
    pub fn new(client: Client<HttpConnector, Body>) -> Self {
        Self { client }
    }

    /// Forward `request` to `addr` and return the backend's response
    /// verbatim.
    pub async fn forward(
        &self,
        addr: BackendAddr,
        request: &WorkRequest,
    ) -> Result<WorkResponse, DispatchError> {
        let body = serde_json::to_vec(request).map_err(|e| DispatchError::Forward {
            addr,
            reason: format!("failed to encode request: {}", e),
        })?;

        let http_request = Request::builder()
            .method("POST")
            .uri(wire::process_url(addr))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|e| DispatchError::Forward {
                addr,
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| DispatchError::Forward {
                addr,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::BackendStatus {
                addr,
                status: status.as_u16(),
            });
        }

        let bytes = axum::body::to_bytes(Body::new(response.into_body()), RESPONSE_BODY_LIMIT)
            .await
            .map_err(|e| DispatchError::Forward {
                addr,
                reason: format!("failed to read response: {}", e),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| DispatchError::Forward {
            addr,
            reason: format!("malformed response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use hyper_util::rt::TokioExecutor;

    fn forwarder() -> Forwarder {
        Forwarder::new(Client::builder(TokioExecutor::new()).build(HttpConnector::new()))
    }

    async fn spawn_echo_backend() -> BackendAddr {
        let app = Router::new().route(
            "/process",
            post(|Json(request): Json<WorkRequest>| async move {
                Json(WorkResponse {
                    result: format!("done {}", request.work_id),
                })
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        BackendAddr::from(addr)
    }

    #[tokio::test]
    async fn test_forward_returns_backend_response() {
        let addr = spawn_echo_backend().await;
        let response = forwarder()
            .forward(
                addr,
                &WorkRequest {
                    work_id: 7,
                    payload: "x".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.result, "done 7");
    }

    #[tokio::test]
    async fn test_forward_to_dead_backend_errors() {
        let dead = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            BackendAddr::from(listener.local_addr().unwrap())
        };
        let err = forwarder()
            .forward(
                dead,
                &WorkRequest {
                    work_id: 1,
                    payload: "x".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Forward { .. }));
    }

    #[tokio::test]
    async fn test_non_success_status_is_typed() {
        let app = Router::new().route(
            "/process",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = BackendAddr::from(listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let err = forwarder()
            .forward(
                addr,
                &WorkRequest {
                    work_id: 2,
                    payload: "x".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::BackendStatus { status: 500, .. }));
    }
}
