//! Router binary.
//!
//! Loads the backend registry from a newline-delimited server list (empty or
//! unreadable is fatal), applies config-file settings plus command-line
//! overrides, and serves the routing RPC surface.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use load_router::config::{self, PolicyKind, RouterConfig};
use load_router::registry::Registry;
use load_router::RouterServer;

#[derive(Parser)]
#[command(name = "load-router", about = "Load-aware work router", long_about = None)]
struct Args {
    /// TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Newline-delimited backend address list.
    #[arg(short, long, default_value = "servers.txt")]
    servers: PathBuf,

    /// Override the bind address from the config.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the selection policy from the config.
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "load_router=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    config::validate(&config)?;

    // Fatal if the list is missing, unreadable, or empty.
    let registry = Registry::from_file(&args.servers)?;

    tracing::info!(
        backends = registry.len(),
        policy = ?config.policy,
        bind_address = %config.listener.bind_address,
        "registry loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    RouterServer::new(&config, registry).run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
