//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use platerate_server::db::{create_pool, migrations};

use super::resolve_database_url;
use crate::config::PlaterateConfig;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

/// Create or update the schema. Safe to run repeatedly.
pub async fn run_migrate(args: MigrateArgs, config: PlaterateConfig) -> Result<()> {
    let database_url = resolve_database_url(args.database_url, &config)?;

    let pool = create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;

    tracing::info!("schema is up to date");
    println!("Migrations applied");
    Ok(())
}
