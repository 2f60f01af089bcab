//! HTTP surfaces.
//!
//! Both the router and a backend expose the same two routes, so a router
//! can be chained behind another router or stand in for a backend:
//!
//! ```text
//! POST /process  {work_id, payload} -> {result}
//! GET  /load     -> {load}
//! ```

pub mod backend;
pub mod server;

pub use backend::{backend_app, BackendState};
pub use server::RouterServer;
