//! showcase-views - view counter service for the video showcase
//!
//! Serves the catalog and the idempotent record-view endpoint backed by
//! `showcase.db` in the root folder.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use showcase_common::config::load_config;
use showcase_common::db::{init_database, DATABASE_FILE};
use showcase_views::{build_router, AppState, SqliteViewStore, ViewCountBus};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "showcase-views")]
#[command(about = "View counter service for the video showcase")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "SHOWCASE_PORT")]
    port: Option<u16>,

    /// Root folder holding showcase.db (overrides config)
    #[arg(long, env = "SHOWCASE_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting showcase-views v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = args
        .root_folder
        .clone()
        .unwrap_or_else(|| config.root_folder_or_default());
    let db_path = root_folder.join(DATABASE_FILE);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let store = SqliteViewStore::new(pool, config.min_watch_seconds);
    store
        .seed(&config.videos)
        .await
        .context("Failed to seed video catalog")?;

    let state = AppState::new(Arc::new(store), ViewCountBus::default());
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", config.bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("showcase-views listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("showcase-views stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
