use clap::{Parser, Subcommand};

use std::path::PathBuf;

use chrono::NaiveDate;

use super::constants::{
    ENV_CONFIG, ENV_HORIZON_END, ENV_HORIZON_START, ENV_SOURCE_URL, ENV_WAREHOUSE_URL,
};

#[derive(Parser)]
#[command(name = "bodega")]
#[command(version, about = "Courier dispatch warehouse loader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Operational database URL (the courier dispatch system)
    #[arg(long, global = true, env = ENV_SOURCE_URL)]
    pub source_url: Option<String>,

    /// Warehouse database URL (rebuilt on every run)
    #[arg(long, global = true, env = ENV_WAREHOUSE_URL)]
    pub warehouse_url: Option<String>,

    /// First day of the date dimension (YYYY-MM-DD)
    #[arg(long, global = true, env = ENV_HORIZON_START)]
    pub horizon_start: Option<NaiveDate>,

    /// Last day of the date dimension, inclusive (YYYY-MM-DD)
    #[arg(long, global = true, env = ENV_HORIZON_END)]
    pub horizon_end: Option<NaiveDate>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Rebuild the warehouse from the operational database (default command)
    Run,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub source_url: Option<String>,
    pub warehouse_url: Option<String>,
    pub horizon_start: Option<NaiveDate>,
    pub horizon_end: Option<NaiveDate>,
}

/// Parse CLI arguments into config values and the selected command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        source_url: cli.source_url,
        warehouse_url: cli.warehouse_url,
        horizon_start: cli.horizon_start,
        horizon_end: cli.horizon_end,
    };
    (config, cli.command)
}
