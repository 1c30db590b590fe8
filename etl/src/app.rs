//! Core application

use anyhow::{Context, Result};
use chrono::Utc;

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::Config;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::data::{PostgresSource, PostgresWarehouse};
use crate::domain::{RunOptions, WarehousePipeline};

pub struct EtlApp {
    pub config: Config,
    pub source: PostgresSource,
    pub warehouse: PostgresWarehouse,
}

impl EtlApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Run) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        app.rebuild().await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = Config::load(cli)?;

        let source = PostgresSource::connect(&config.source)
            .await
            .context("Failed to connect to the operational database")?;
        let warehouse = PostgresWarehouse::connect(&config.warehouse)
            .await
            .context("Failed to connect to the warehouse database")?;

        Ok(Self {
            config,
            source,
            warehouse,
        })
    }

    /// Rebuild the warehouse end to end, then release both pools
    async fn rebuild(self) -> Result<()> {
        let options = RunOptions {
            horizon_start: self.config.horizon_start,
            horizon_end: self.config.horizon_end,
            saved: Utc::now().date_naive(),
        };

        let pipeline = WarehousePipeline::new(&self.source, &self.warehouse, options);
        pipeline.run().await?;

        self.source.close().await;
        self.warehouse.close().await;
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}
