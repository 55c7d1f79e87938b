//! Configuration file for the platerate binary
//!
//! Precedence, lowest first: built-in defaults, `~/.platerate/config.toml`
//! (or `--config`), environment variables, command-line flags. Environment
//! and flags are applied by clap on the command args; this module only
//! handles defaults and the file.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use platerate_server::db::DEFAULT_MAX_CONNECTIONS;
use platerate_server::http::server::DEFAULT_AUTH_HEADER;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaterateConfig {
    /// Address the HTTP server binds to
    pub bind: SocketAddr,
    /// Postgres connection string
    pub database_url: Option<String>,
    /// Pool size
    pub max_connections: u32,
    /// Allow any CORS origin
    pub cors_permissive: bool,
    /// Header carrying the authenticated user id
    pub auth_header: String,
}

impl Default for PlaterateConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            cors_permissive: false,
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
        }
    }
}

impl PlaterateConfig {
    /// Default file location: ~/.platerate/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".platerate/config.toml")
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. The default path is optional and
    /// falls back to built-in defaults when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid TOML")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
