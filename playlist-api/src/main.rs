//! playlist-api - HTTP service for listing, searching, paging and rating songs
//!
//! Loads a JSON playlist into SQLite and serves it over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use playlist_common::config::{CliOverrides, ServiceConfig};
use playlist_common::{normalize_file, Store};
use playlist_api::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for playlist-api
#[derive(Parser, Debug)]
#[command(name = "playlist-api")]
#[command(about = "Playlist ingestion and query service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Playlist JSON file used for reloads
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// TOML config file (defaults to <config dir>/playlist/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replace the songs table from the playlist file before serving
    #[arg(long)]
    load: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "playlist_api=debug,playlist_common=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting playlist-api v{} ({}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("PLAYLIST_API_BUILD"),
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );

    let args = Args::parse();
    let config = ServiceConfig::resolve(CliOverrides {
        db_path: args.db_path,
        data_path: args.data_path,
        port: args.port,
        config_file: args.config,
    })
    .context("Failed to resolve configuration")?;

    info!("Database path: {}", config.db_path.display());
    info!("Playlist path: {}", config.data_path.display());

    let store = Store::open(&config.db_path)
        .await
        .context("Failed to open song database")?;

    if args.load {
        let table = normalize_file(&config.data_path).with_context(|| {
            format!("Failed to normalize playlist {}", config.data_path.display())
        })?;
        let count = store
            .reload(&table)
            .await
            .context("Failed to load playlist into database")?;
        info!(
            "Saved {} songs with {} columns into DB",
            count.rows, count.columns
        );
    }

    let state = AppState::new(store, config.data_path.clone());
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
