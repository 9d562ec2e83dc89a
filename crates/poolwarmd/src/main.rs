//! poolwarmd — the poolwarm daemon.
//!
//! Single binary that assembles the prewarm pipeline:
//! - Cluster backend (simulated in standalone mode)
//! - Admission validator + submission queue
//! - Reconciliation worker
//! - REST API
//!
//! # Usage
//!
//! ```text
//! poolwarmd standalone --port 8880 --pool default-pool --min 1 --max 10
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use poolwarm_orchestrator::{PrewarmConfig, PrewarmService};
use poolwarm_provider::SimulatedCluster;

#[derive(Parser)]
#[command(name = "poolwarmd", about = "poolwarm daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run in standalone mode (simulated cluster backend, everything in
    /// one process).
    Standalone {
        /// Port to listen on.
        #[arg(long, default_value = "8880")]
        port: u16,

        /// Node pool to manage.
        #[arg(long, default_value = "default-pool")]
        pool: String,

        /// Minimum pool size.
        #[arg(long, default_value = "1")]
        min: u32,

        /// Maximum pool size.
        #[arg(long, default_value = "10")]
        max: u32,

        /// Ready nodes in the pool at startup.
        #[arg(long, default_value = "3")]
        initial_nodes: u32,

        /// Instance type offered by the pool (repeatable).
        #[arg(long)]
        instance_type: Vec<String>,

        /// Seconds between the scale mutation and the first readiness poll.
        #[arg(long, default_value = "30")]
        settle_delay_secs: u64,

        /// Seconds between readiness polls.
        #[arg(long, default_value = "15")]
        poll_interval_secs: u64,

        /// Deadline for the whole polling phase, in seconds.
        #[arg(long, default_value = "1800")]
        max_poll_secs: u64,

        /// Nodes the simulated pool gains or sheds per readiness
        /// observation (0 freezes the pool).
        #[arg(long, default_value = "1")]
        converge_step: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,poolwarmd=debug,poolwarm=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Standalone {
            port,
            pool,
            min,
            max,
            initial_nodes,
            instance_type,
            settle_delay_secs,
            poll_interval_secs,
            max_poll_secs,
            converge_step,
        } => {
            let cluster =
                SimulatedCluster::new(&pool, min, max, initial_nodes).with_converge_step(converge_step);
            let cluster = if instance_type.is_empty() {
                cluster
            } else {
                cluster.with_instance_types(instance_type)
            };

            let config = PrewarmConfig::new(pool)
                .with_settle_delay(Duration::from_secs(settle_delay_secs))
                .with_poll_interval(Duration::from_secs(poll_interval_secs))
                .with_max_poll(Duration::from_secs(max_poll_secs));

            run_standalone(port, config, Arc::new(cluster)).await
        }
    }
}

async fn run_standalone(
    port: u16,
    config: PrewarmConfig,
    cluster: Arc<SimulatedCluster>,
) -> anyhow::Result<()> {
    info!("poolwarm daemon starting in standalone mode");

    // ── Initialize subsystems ──────────────────────────────────

    // The simulated cluster serves as both the scaling backend and the
    // readiness probe.
    let (service, worker) = PrewarmService::new(config, cluster.clone(), cluster);
    info!(pool = service.pool(), "prewarm service initialized");

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start background tasks ─────────────────────────────────

    // Reconciliation worker.
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));

    // ── Start API server ───────────────────────────────────────

    let router = poolwarm_api::build_router(service);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wait for the worker. A reconciliation still in flight gets a grace
    // period; its in-memory record dies with the process either way.
    if tokio::time::timeout(Duration::from_secs(5), worker_handle)
        .await
        .is_err()
    {
        warn!("reconciliation worker still busy at shutdown, abandoning it");
    }

    info!("poolwarm daemon stopped");
    Ok(())
}
