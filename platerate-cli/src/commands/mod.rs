//! Command implementations for the platerate CLI

pub mod config;
pub mod migrate;
pub mod serve;

pub use config::run_config;
pub use migrate::run_migrate;
pub use serve::run_serve;

use anyhow::{Context, Result};

use crate::config::PlaterateConfig;

/// Database URL from the flag/env value, else from the config file
pub(crate) fn resolve_database_url(
    flag: Option<String>,
    config: &PlaterateConfig,
) -> Result<String> {
    flag.or_else(|| config.database_url.clone()).context(
        "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env or ~/.platerate/config.toml",
    )
}
