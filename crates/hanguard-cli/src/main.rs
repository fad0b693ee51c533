//! Hanguard gateway binary.
//!
//! # Usage
//!
//! ```bash
//! # Run with the default config path
//! hanguard
//!
//! # Explicit config and verbose protocol logging
//! hanguard --config /etc/hanguard.json --log-level debug
//! ```
//!
//! The process connects the serial door bus to the SQLite rights store and
//! runs until the transport fails or it is killed. Changes to the store are
//! picked up on the next start.

mod config;
mod serial;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hanguard_gateway::Dispatcher;
use hanguard_storage::{Database, DatabaseConfig, DecisionEngine, DoorDirectory, SqliteAccessRepository};

use crate::config::GatewayConfig;
use crate::serial::SerialTransport;

/// Door-bus access gateway
#[derive(Parser, Debug)]
#[command(name = "hanguard")]
#[command(about = "Serial door-bus access gateway")]
#[command(version)]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "/etc/hanguard.json")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = GatewayConfig::load(&args.config)?;
    tracing::info!(port = %config.serial_port, db = %config.database_path.display(), "hanguard starting");

    let db = Database::new(DatabaseConfig::new(config.database_path.to_string_lossy()))
        .await
        .context("opening rights store")?;
    let repo = SqliteAccessRepository::new(db.pool().clone());

    let doors = DoorDirectory::load(&repo).await.context("loading doors")?;
    anyhow::ensure!(
        !doors.is_empty(),
        "rights store has no doors configured; nothing to serve"
    );
    tracing::info!(doors = doors.len(), "door directory loaded");

    let engine = DecisionEngine::new(repo, doors, config.allow_seconds);
    let transport = SerialTransport::open(&config.serial_port).context("opening serial port")?;

    let mut dispatcher = Dispatcher::new(
        transport,
        engine,
        Duration::from_secs(config.hello_interval_secs),
    );
    dispatcher.run().await.context("gateway loop failed")?;

    Ok(())
}
