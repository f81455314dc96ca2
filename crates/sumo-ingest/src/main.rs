//! Sumomine Ingest - command-line entry point

use anyhow::Context;
use clap::Parser;
use std::process;
use sumo_common::logging::{init_logging, LogConfig, LogLevel};
use sumo_ingest::commands::execute;
use sumo_ingest::db::{self, DbConfig};
use sumo_ingest::{Cli, IngestConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(LogLevel::from_verbosity(cli.verbose))
        .log_file_prefix("sumo-ingest")
        .build();

    // Environment variables take precedence over flags
    let log_config = match log_config.with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: invalid logging configuration: {e:#}");
            process::exit(1);
        },
    };

    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {e:#}");
            process::exit(1);
        },
    };

    if let Err(e) = run(&cli).await {
        error!(error = %format!("{e:#}"), "Command failed");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = IngestConfig::load().context("Failed to load configuration")?;
    let db_config = DbConfig::from_env().context("Failed to load database configuration")?;

    let pool = db::create_pool(&db_config).await?;
    db::health_check(&pool).await.context("Database is not reachable")?;
    db::run_migrations(&pool).await?;

    execute(&cli.command, &config, &pool).await?;

    pool.close().await;
    info!("Done");
    Ok(())
}
