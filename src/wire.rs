//! Wire types shared by the router, backends, and clients.
//!
//! The RPC surface is HTTP/JSON: `POST /process` carries a [`WorkRequest`]
//! and answers a [`WorkResponse`]; `GET /load` answers a [`LoadReport`].
//! The router serves the same two routes as a backend, so a router can be
//! chained behind another router or stand in for a backend under test.

use serde::{Deserialize, Serialize};

use crate::registry::BackendAddr;

/// One unit of work submitted by a client.
///
/// `work_id` is caller-assigned and only needs to be unique per in-flight
/// request, for audit correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRequest {
    pub work_id: u64,
    pub payload: String,
}

/// Free-form result produced by whichever backend processed the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkResponse {
    pub result: String,
}

/// Snapshot of a process's active load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoadReport {
    pub load: u64,
}

pub fn process_url(addr: BackendAddr) -> String {
    format!("http://{}/process", addr)
}

pub fn load_url(addr: BackendAddr) -> String {
    format!("http://{}/load", addr)
}
