//! Backend binary.
//!
//! Serves `POST /process` (simulated heavy workload) and `GET /load`
//! (current in-flight count), and appends an audit row per handled request.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use load_router::audit::AuditLog;
use load_router::http::{backend_app, BackendState};

#[derive(Parser)]
#[command(name = "backend", about = "Compute backend for the load router", long_about = None)]
struct Args {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 50051)]
    port: u16,

    /// Iteration count for the simulated workload.
    #[arg(long, default_value_t = 5_000_000)]
    work_size: u64,

    /// Audit CSV path.
    #[arg(long, default_value = "responses.csv")]
    audit: PathBuf,

    /// Disable the audit log.
    #[arg(long)]
    no_audit: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "load_router=debug,backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let audit = (!args.no_audit).then(|| AuditLog::spawn(args.audit.clone()));
    let state = BackendState::new(args.work_size, audit);
    let app = backend_app(state);

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!(
        port = args.port,
        work_size = args.work_size,
        "backend listening (load: 0)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
            }
        })
        .await?;

    Ok(())
}
