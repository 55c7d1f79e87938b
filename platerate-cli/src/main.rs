//! platerate CLI - run and manage the restaurant review server
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `migrate`: create or update the Postgres schema
//! - `config`: inspect configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use config::PlaterateConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "platerate",
    author,
    version,
    about = "Restaurant review server: listings, feeds, rankings, comments and favorites"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export spans over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Configuration file (default: ~/.platerate/config.toml)
    #[arg(long, global = true, env = "PLATERATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Apply database migrations
    Migrate(commands::migrate::MigrateArgs),
    /// Inspect configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;

    let result = run(cli).await;
    tracing_setup::shutdown();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = PlaterateConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await,
        Commands::Migrate(args) => commands::run_migrate(args, config).await,
        Commands::Config(args) => commands::run_config(args, config, cli.config),
    }
}
