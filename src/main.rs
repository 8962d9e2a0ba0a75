//! Daycare API Server
//!
//! Run with: cargo run --bin daycare
//!
//! # Configuration
//!
//! Reads `--config <path>` if given, otherwise the first of
//! `~/.config/daycare/config.toml`, `/etc/daycare/config.toml` and
//! `./config.toml`. `DAYCARE_*` environment variables override the file;
//! `RUST_LOG` overrides the log level.

use anyhow::Context;
use clap::Parser;
use daycare::api::{serve, AppState};
use daycare::config::{Config, ConfigSource};
use daycare::store::open_store;
use daycare::telemetry::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "daycare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daycare attendance and daily report server")]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, source) = match &args.config {
        Some(path) => (
            Config::load_with_env(path)?,
            ConfigSource::File(path.clone()),
        ),
        None => Config::resolve(&Config::default_paths()),
    };

    init_tracing(&config.logging);
    source.log();
    tracing::info!("Starting Daycare API server v{}", env!("CARGO_PKG_VERSION"));

    let store_config = config.store_config()?;
    tracing::info!("Data directory: {:?}", store_config.data_dir);
    let store = open_store(&store_config).context("Failed to open document store")?;

    let clock = config.clock()?;
    let api_config = config.api_config();
    tracing::info!(
        lock_after_mark = config.attendance.lock_after_mark,
        utc_offset_minutes = ?config.daycare.utc_offset_minutes,
        "Attendance settings"
    );

    let state = AppState::new(
        store,
        Arc::new(clock),
        config.attendance_settings(),
        api_config.clone(),
    );

    serve(state, &api_config).await?;

    tracing::info!("Daycare API server stopped");
    Ok(())
}
