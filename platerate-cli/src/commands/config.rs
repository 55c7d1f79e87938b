//! Inspect the effective configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::PlaterateConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the configuration file values merged over defaults
    Show,
    /// Print the configuration file location
    Path,
}

pub fn run_config(
    args: ConfigArgs,
    config: PlaterateConfig,
    explicit: Option<PathBuf>,
) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let mut config = config;
            // Never echo credentials
            if config.database_url.is_some() {
                config.database_url = Some("<redacted>".to_string());
            }
            print!("{}", config.to_toml_string()?);
        }
        ConfigCommand::Path => {
            let path = explicit.unwrap_or_else(PlaterateConfig::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
