//! HTTP server command
//!
//! Runs the platerate HTTP API against Postgres.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use platerate_server::db::{create_pool_with_options, migrations, PgStore};
use platerate_server::http::{run_server, ServerConfig};

use super::resolve_database_url;
use crate::config::PlaterateConfig;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3000)
    #[arg(long, short = 'b', env = "PLATERATE_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Header carrying the authenticated user id
    #[arg(long)]
    pub auth_header: Option<String>,

    /// Apply schema migrations before serving
    #[arg(long)]
    pub migrate: bool,
}

impl ServeArgs {
    fn server_config(&self, config: &PlaterateConfig) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind.unwrap_or(config.bind),
            cors_permissive: self.cors_permissive || config.cors_permissive,
            auth_header: self
                .auth_header
                .clone()
                .unwrap_or_else(|| config.auth_header.clone()),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: PlaterateConfig) -> Result<()> {
    let server_config = args.server_config(&config);
    let max_connections = args.max_connections.unwrap_or(config.max_connections);
    let database_url = resolve_database_url(args.database_url, &config)?;

    tracing::info!(bind = %server_config.bind_addr, "starting platerate server");

    let pool = create_pool_with_options(&database_url, max_connections)
        .await
        .context("Failed to create database pool")?;

    if args.migrate {
        migrations::run(&pool)
            .await
            .context("Failed to apply migrations")?;
    }

    // Blocks until shutdown
    run_server(Arc::new(PgStore::new(pool)), server_config)
        .await
        .context("Server error")?;

    Ok(())
}
