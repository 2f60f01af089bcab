//! Load-generating client.
//!
//! Fires a batch of concurrent work requests, rotating round-robin over its
//! target list (typically one router, but backends can be hit directly).
//! Each request is wrapped in the same retry policy the router uses:
//! bounded attempts, fixed delay, one shared deadline.

use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use load_router::balancer::round_robin::RoundRobin;
use load_router::balancer::SelectionPolicy;
use load_router::registry::{BackendAddr, Registry};
use load_router::retry::RetryPolicy;
use load_router::wire::{self, WorkRequest, WorkResponse};

#[derive(Parser)]
#[command(name = "loadgen", about = "Demand generator for the load router", long_about = None)]
struct Args {
    /// Target addresses (router or backends), host:port.
    #[arg(short, long, required = true, num_args = 1..)]
    target: Vec<String>,

    /// Number of requests to send.
    #[arg(short = 'n', long, default_value_t = 25)]
    requests: u64,

    /// Payload attached to every request.
    #[arg(long, default_value = "Heavy Task")]
    payload: String,

    /// Attempts per request.
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Fixed delay between attempts, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    delay_ms: u64,

    /// Overall deadline per request, in seconds.
    #[arg(long, default_value_t = 10)]
    deadline_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loadgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let targets = args
        .target
        .iter()
        .map(|t| BackendAddr::from_str(t))
        .collect::<Result<Vec<_>, _>>()?;
    let registry = Registry::new(targets)?;
    let cursor = std::sync::Arc::new(RoundRobin::new());

    let retry = RetryPolicy {
        max_attempts: args.attempts,
        delay: Duration::from_millis(args.delay_ms),
        deadline: Duration::from_secs(args.deadline_secs),
    };
    let client = reqwest::Client::new();

    let mut tasks = JoinSet::new();
    for work_id in 0..args.requests {
        let registry = registry.clone();
        let cursor = cursor.clone();
        let client = client.clone();
        let payload = args.payload.clone();

        tasks.spawn(async move {
            // pick cannot fail: the registry is non-empty by construction
            let addr = match cursor.pick(&registry, &[]) {
                Ok(addr) => addr,
                Err(error) => {
                    tracing::error!(%error, "target selection failed");
                    return;
                }
            };
            let request = WorkRequest { work_id, payload };

            let outcome = retry
                .run(|attempt| {
                    let client = client.clone();
                    let request = request.clone();
                    async move {
                        tracing::debug!(work_id = request.work_id, attempt, target = %addr, "sending");
                        client
                            .post(wire::process_url(addr))
                            .json(&request)
                            .send()
                            .await?
                            .error_for_status()?
                            .json::<WorkResponse>()
                            .await
                    }
                })
                .await;

            match outcome {
                Ok(response) => {
                    tracing::info!(work_id, target = %addr, result = %response.result, "completed")
                }
                Err(error) => tracing::error!(work_id, target = %addr, %error, "failed"),
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(error) = joined {
            tracing::error!(%error, "request task panicked");
        }
    }

    Ok(())
}
