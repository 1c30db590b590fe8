//! Repository traits for the two databases of a run
//!
//! `SourceRepository` reads the operational dispatch database;
//! `WarehouseRepository` owns the warehouse schema, the replace-then-append
//! loads, the surrogate-key read-back and the aggregation input queries.
//! The pipeline only ever talks to these traits, so runs can be driven
//! against the in-memory implementations in tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::data::error::DataError;
use crate::data::types::{
    AccumulatedFactRow, ClientRow, CourierRow, DailyFactRow, DailyInputRow, DateDimRow,
    HourDimRow, HourlyFactRow, HourlyInputRow, IncidentFactRow, IncidentLogRow, IncidentRefRow,
    ServiceEventRow, SiteRow, StatusRow,
};

// ============================================================================
// Source Repository Trait
// ============================================================================

/// Read access to the operational dispatch database
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Full service event stream, ordered by (servicio_id, fecha, hora)
    async fn fetch_service_events(&self) -> Result<Vec<ServiceEventRow>, DataError>;

    /// Client master data with type and city names resolved
    async fn fetch_clients(&self) -> Result<Vec<ClientRow>, DataError>;

    /// Courier master data with the operating-city name resolved
    async fn fetch_couriers(&self) -> Result<Vec<CourierRow>, DataError>;

    /// Dispatch sites with city and department names resolved
    async fn fetch_sites(&self) -> Result<Vec<SiteRow>, DataError>;

    /// Incident catalog (one row per recorded incident)
    async fn fetch_incident_catalog(&self) -> Result<Vec<IncidentRefRow>, DataError>;

    /// Status catalog
    async fn fetch_status_catalog(&self) -> Result<Vec<StatusRow>, DataError>;

    /// Incident occurrences with client attribution, input of the incident
    /// fact
    async fn fetch_incident_log(&self) -> Result<Vec<IncidentLogRow>, DataError>;
}

// ============================================================================
// Warehouse Repository Trait
// ============================================================================

/// Write and read-back access to the warehouse database.
///
/// Every `load_*` method has replace-then-append semantics: the table is
/// cleared and reloaded inside one transaction (atomic per table, not
/// across tables) and `saved` is stamped on every row.
#[async_trait]
pub trait WarehouseRepository: Send + Sync {
    // ==================== Schema ====================

    /// Drop and recreate all warehouse tables (facts dropped first, then
    /// dimensions), resetting the surrogate-key sequences
    async fn reset_schema(&self) -> Result<(), DataError>;

    /// Subset of `required` table names not present in the warehouse
    async fn missing_tables(&self, required: &[&str]) -> Result<Vec<String>, DataError>;

    // ==================== Dimension loads ====================

    async fn load_date_dim(&self, rows: &[DateDimRow], saved: NaiveDate)
    -> Result<u64, DataError>;

    async fn load_hour_dim(&self, rows: &[HourDimRow], saved: NaiveDate)
    -> Result<u64, DataError>;

    async fn load_client_dim(&self, rows: &[ClientRow], saved: NaiveDate)
    -> Result<u64, DataError>;

    async fn load_courier_dim(
        &self,
        rows: &[CourierRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError>;

    async fn load_site_dim(&self, rows: &[SiteRow], saved: NaiveDate) -> Result<u64, DataError>;

    async fn load_incident_dim(
        &self,
        rows: &[IncidentRefRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError>;

    async fn load_status_dim(
        &self,
        rows: &[StatusRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError>;

    // ==================== Fact loads ====================

    async fn load_accumulated_fact(
        &self,
        rows: &[AccumulatedFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError>;

    async fn load_hourly_fact(
        &self,
        rows: &[HourlyFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError>;

    async fn load_daily_fact(
        &self,
        rows: &[DailyFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError>;

    async fn load_incident_fact(
        &self,
        rows: &[IncidentFactRow],
        saved: NaiveDate,
    ) -> Result<u64, DataError>;

    // ==================== Surrogate-key read-back ====================

    /// (surrogate key, calendar date) pairs of dim_fecha
    async fn read_date_keys(&self) -> Result<Vec<(i64, NaiveDate)>, DataError>;

    /// (surrogate key, cliente_id) pairs of dim_cliente
    async fn read_client_keys(&self) -> Result<Vec<(i64, i64)>, DataError>;

    /// (surrogate key, mensajero_id) pairs of dim_mensajero
    async fn read_courier_keys(&self) -> Result<Vec<(i64, i64)>, DataError>;

    /// (surrogate key, hour of day) pairs of dim_hora
    async fn read_hour_keys(&self) -> Result<Vec<(i64, i32)>, DataError>;

    /// (surrogate key, novedad_id) pairs of dim_novedad
    async fn read_incident_keys(&self) -> Result<Vec<(i64, i64)>, DataError>;

    // ==================== Aggregation inputs ====================

    /// Accumulated rows with a recorded start hour, joined to their site
    /// through the client entity
    async fn fetch_hourly_inputs(&self) -> Result<Vec<HourlyInputRow>, DataError>;

    /// Accumulated rows with a recorded start date, joined to site and
    /// date dimensions
    async fn fetch_daily_inputs(&self) -> Result<Vec<DailyInputRow>, DataError>;
}
