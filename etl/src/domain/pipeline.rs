//! Warehouse rebuild pipeline
//!
//! Orchestrates one full load of the dimensional warehouse:
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌───────────────┐   ┌────────────────┐
//! │ 1. SCHEMA │──▶│ 2. DIMS    │──▶│ 3. ACUMULADO  │──▶│ 4. DERIVED     │
//! │ drop +    │   │ fecha hora │   │ events →      │   │ servicio_hora  │
//! │ recreate  │   │ cliente ...│   │ lifecycles →  │   │ servicio_diaria│
//! │           │   │ (7 tables) │   │ keyed rows    │   │ novedades      │
//! └───────────┘   └────────────┘   └───────────────┘   └────────────────┘
//! ```
//!
//! Dimensions are persisted before any fact is computed because the fact
//! builders obtain surrogate keys by reading the dimension tables back.
//! Every table load replaces the previous content; a failing stage aborts
//! the run and leaves already-committed tables as they are.

use chrono::NaiveDate;

use crate::core::constants::REQUIRED_DIMENSION_TABLES;
use crate::data::error::DataError;
use crate::data::traits::{SourceRepository, WarehouseRepository};

use super::dimensions::{date_dimension, hour_dimension, normalize_couriers};
use super::facts::aggregate::{daily_fact, hourly_fact};
use super::facts::incidents::{IncidentKeys, incident_fact};
use super::facts::{DimensionKeys, reshape, resolve_all};

/// Settings for one rebuild
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// First calendar day covered by dim_fecha
    pub horizon_start: NaiveDate,
    /// Last calendar day covered by dim_fecha, inclusive
    pub horizon_end: NaiveDate,
    /// Load stamp written to the saved column of every table
    pub saved: NaiveDate,
}

/// Rows written per table during one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub dim_fecha: u64,
    pub dim_hora: u64,
    pub dim_cliente: u64,
    pub dim_mensajero: u64,
    pub dim_sede: u64,
    pub dim_novedad: u64,
    pub dim_estado: u64,
    pub hecho_entrega_acumulado: u64,
    pub hecho_entrega_servicio_hora: u64,
    pub hecho_entrega_servicio_diaria: u64,
    pub hecho_novedades_servicio: u64,
}

/// Full-rebuild pipeline over injected source and warehouse capabilities
pub struct WarehousePipeline<'a> {
    source: &'a dyn SourceRepository,
    warehouse: &'a dyn WarehouseRepository,
    options: RunOptions,
}

impl<'a> WarehousePipeline<'a> {
    pub fn new(
        source: &'a dyn SourceRepository,
        warehouse: &'a dyn WarehouseRepository,
        options: RunOptions,
    ) -> Self {
        Self {
            source,
            warehouse,
            options,
        }
    }

    /// Run the whole rebuild and report rows written per table
    pub async fn run(&self) -> Result<RunSummary, DataError> {
        tracing::info!(
            horizon_start = %self.options.horizon_start,
            horizon_end = %self.options.horizon_end,
            saved = %self.options.saved,
            "Warehouse rebuild starting"
        );

        self.warehouse.reset_schema().await?;
        tracing::info!("Warehouse schema rebuilt");

        let mut summary = RunSummary::default();
        self.load_dimensions(&mut summary).await?;
        self.check_dimensions().await?;
        self.load_accumulated(&mut summary).await?;
        self.load_hourly(&mut summary).await?;
        self.load_daily(&mut summary).await?;
        self.load_incidents(&mut summary).await?;

        tracing::info!(
            services = summary.hecho_entrega_acumulado,
            incidents = summary.hecho_novedades_servicio,
            "Warehouse rebuild finished"
        );
        Ok(summary)
    }

    async fn load_dimensions(&self, summary: &mut RunSummary) -> Result<(), DataError> {
        let saved = self.options.saved;

        let dates = date_dimension(self.options.horizon_start, self.options.horizon_end);
        summary.dim_fecha = self.warehouse.load_date_dim(&dates, saved).await?;
        tracing::info!(rows = summary.dim_fecha, "dim_fecha loaded");

        let hours = hour_dimension();
        summary.dim_hora = self.warehouse.load_hour_dim(&hours, saved).await?;
        tracing::info!(rows = summary.dim_hora, "dim_hora loaded");

        let clients = self.source.fetch_clients().await?;
        summary.dim_cliente = self.warehouse.load_client_dim(&clients, saved).await?;
        tracing::info!(rows = summary.dim_cliente, "dim_cliente loaded");

        let couriers = normalize_couriers(self.source.fetch_couriers().await?);
        summary.dim_mensajero = self.warehouse.load_courier_dim(&couriers, saved).await?;
        tracing::info!(rows = summary.dim_mensajero, "dim_mensajero loaded");

        let sites = self.source.fetch_sites().await?;
        summary.dim_sede = self.warehouse.load_site_dim(&sites, saved).await?;
        tracing::info!(rows = summary.dim_sede, "dim_sede loaded");

        let incidents = self.source.fetch_incident_catalog().await?;
        summary.dim_novedad = self.warehouse.load_incident_dim(&incidents, saved).await?;
        tracing::info!(rows = summary.dim_novedad, "dim_novedad loaded");

        let statuses = self.source.fetch_status_catalog().await?;
        summary.dim_estado = self.warehouse.load_status_dim(&statuses, saved).await?;
        tracing::info!(rows = summary.dim_estado, "dim_estado loaded");

        Ok(())
    }

    /// Fact processing requires every dimension table to be present; a
    /// missing one aborts the run before any fact load is attempted.
    async fn check_dimensions(&self) -> Result<(), DataError> {
        let missing = self
            .warehouse
            .missing_tables(REQUIRED_DIMENSION_TABLES)
            .await?;
        if !missing.is_empty() {
            return Err(DataError::missing_dimensions(missing));
        }
        Ok(())
    }

    async fn load_accumulated(&self, summary: &mut RunSummary) -> Result<(), DataError> {
        let events = self.source.fetch_service_events().await?;
        tracing::debug!(events = events.len(), "Service events fetched");

        let lifecycles = reshape(&events);
        let keys = DimensionKeys::new(
            self.warehouse.read_date_keys().await?,
            self.warehouse.read_client_keys().await?,
            self.warehouse.read_courier_keys().await?,
            self.warehouse.read_hour_keys().await?,
        );
        let rows = resolve_all(&lifecycles, &keys);

        summary.hecho_entrega_acumulado = self
            .warehouse
            .load_accumulated_fact(&rows, self.options.saved)
            .await?;
        tracing::info!(
            rows = summary.hecho_entrega_acumulado,
            "hecho_entrega_acumulado loaded"
        );
        Ok(())
    }

    async fn load_hourly(&self, summary: &mut RunSummary) -> Result<(), DataError> {
        let inputs = self.warehouse.fetch_hourly_inputs().await?;
        let rows = hourly_fact(&inputs);

        summary.hecho_entrega_servicio_hora = self
            .warehouse
            .load_hourly_fact(&rows, self.options.saved)
            .await?;
        tracing::info!(
            rows = summary.hecho_entrega_servicio_hora,
            "hecho_entrega_servicio_hora loaded"
        );
        Ok(())
    }

    async fn load_daily(&self, summary: &mut RunSummary) -> Result<(), DataError> {
        let inputs = self.warehouse.fetch_daily_inputs().await?;
        let rows = daily_fact(&inputs);

        summary.hecho_entrega_servicio_diaria = self
            .warehouse
            .load_daily_fact(&rows, self.options.saved)
            .await?;
        tracing::info!(
            rows = summary.hecho_entrega_servicio_diaria,
            "hecho_entrega_servicio_diaria loaded"
        );
        Ok(())
    }

    async fn load_incidents(&self, summary: &mut RunSummary) -> Result<(), DataError> {
        let log = self.source.fetch_incident_log().await?;
        let keys = IncidentKeys::new(
            self.warehouse.read_date_keys().await?,
            self.warehouse.read_client_keys().await?,
            self.warehouse.read_incident_keys().await?,
        );
        let rows = incident_fact(&log, &keys);

        summary.hecho_novedades_servicio = self
            .warehouse
            .load_incident_fact(&rows, self.options.saved)
            .await?;
        tracing::info!(
            rows = summary.hecho_novedades_servicio,
            "hecho_novedades_servicio loaded"
        );
        Ok(())
    }
}
