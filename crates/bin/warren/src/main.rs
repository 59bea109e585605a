//! # warren — rabbit farm command line
//!
//! Composition root that wires the storage adapter into the services and
//! runs one command.
//!
//! ## Responsibilities
//! - Parse the command line and load configuration (file, env vars)
//! - Install the `tracing` subscriber, writing to stderr
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations and inject them into services
//! - Dispatch the command and print its result as JSON on stdout
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod cli;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use warren_adapter_storage_sqlite_sqlx::pool;

use crate::cli::Cli;
use crate::commands::Services;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let farm_id = match cli.farm {
        Some(farm_id) => farm_id,
        None => config.farm_id()?,
    };

    // Database
    let db = pool::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .with_context(|| format!("opening {}", config.database_url()))?;
    tracing::debug!(farm_id = %farm_id, "database ready");

    // Services
    let services = Services::wire(&db);

    let output = commands::dispatch(&services, farm_id, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
