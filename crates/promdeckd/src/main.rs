//! promdeckd — the Promdeck daemon.
//!
//! Single binary that assembles the Promdeck subsystems:
//! - Snapshot store (redb)
//! - Exposition parser + dashboard renderer
//! - HTTP upload/retrieval surface
//!
//! # Usage
//!
//! ```text
//! promdeckd serve --port 8787 --data-dir /var/lib/promdeck
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "promdeckd", about = "Promdeck daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the snapshot upload and dashboard server.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8787")]
        port: u16,

        /// Data directory for stored snapshots.
        #[arg(long, default_value = "/var/lib/promdeck")]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,promdeckd=debug,promdeck_api=debug,promdeck_store=debug"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, data_dir } => serve(port, data_dir).await,
    }
}

async fn serve(port: u16, data_dir: PathBuf) -> anyhow::Result<()> {
    info!("Promdeck daemon starting");

    // Ensure data directory exists.
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("promdeck.redb");

    let store = promdeck_store::SnapshotStore::open(&db_path)?;
    info!(path = ?db_path, "snapshot store opened");

    let router = promdeck_api::build_router(store);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "dashboard server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("Promdeck daemon stopped");
    Ok(())
}
