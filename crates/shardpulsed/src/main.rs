//! shardpulsed — the ShardPulse daemon.
//!
//! Single binary that assembles all ShardPulse subsystems:
//! - Shard store (redb)
//! - Staleness sweeper
//! - Window compactor
//! - REST API + status dashboard
//!
//! # Usage
//!
//! ```text
//! shardpulsed --port 6071 --data-dir /var/lib/shardpulse --timeout-secs 60
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser)]
#[command(name = "shardpulsed", about = "ShardPulse daemon")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value = "6071")]
    port: u16,

    /// Data directory for persistent state.
    #[arg(long, default_value = "/var/lib/shardpulse")]
    data_dir: PathBuf,

    /// Staleness timeout in seconds: a shard silent longer than this
    /// is forced down.
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Sweep interval in seconds. Defaults to half the timeout so a
    /// shard heartbeating at exactly the timeout cadence doesn't flap.
    #[arg(long)]
    sweep_interval_secs: Option<u64>,

    /// Compaction interval in seconds.
    #[arg(long, default_value = "3600")]
    compact_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shardpulse=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let sweep_interval = cli
        .sweep_interval_secs
        .unwrap_or_else(|| (cli.timeout_secs / 2).max(1));

    info!("ShardPulse daemon starting");

    // Ensure data directory exists.
    std::fs::create_dir_all(&cli.data_dir)?;
    let db_path = cli.data_dir.join("shardpulse.redb");

    // ── Initialize subsystems ──────────────────────────────────

    let store = shardpulse_state::ShardStore::open(&db_path)?;
    info!(path = ?db_path, "shard store opened");

    let sweeper = shardpulse_engine::Sweeper::new(
        store.clone(),
        Duration::from_secs(cli.timeout_secs),
    );
    info!(
        timeout_secs = cli.timeout_secs,
        interval_secs = sweep_interval,
        "staleness sweeper initialized"
    );

    let compactor = shardpulse_engine::Compactor::new(store.clone());
    info!(interval_secs = cli.compact_interval_secs, "window compactor initialized");

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_shutdown = shutdown_rx.clone();
    let compactor_shutdown = shutdown_rx;

    // ── Start background tasks ─────────────────────────────────

    let sweeper_handle = tokio::spawn(async move {
        sweeper
            .run(Duration::from_secs(sweep_interval), sweeper_shutdown)
            .await;
    });

    let compact_interval = cli.compact_interval_secs;
    let compactor_handle = tokio::spawn(async move {
        compactor
            .run(Duration::from_secs(compact_interval), compactor_shutdown)
            .await;
    });

    // ── Start API server ───────────────────────────────────────

    let router = shardpulse_api::build_router(store);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));

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

    // Wait for background tasks.
    let _ = sweeper_handle.await;
    let _ = compactor_handle.await;

    info!("ShardPulse daemon stopped");
    Ok(())
}
