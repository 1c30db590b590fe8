//! Typed rows for the warehouse tables
//!
//! Field order follows the table contracts (column order is significant for
//! the loads). The `saved` load stamp is appended by the loader and is not
//! carried on the rows themselves.

use chrono::NaiveDate;

// ============================================================================
// BUILT DIMENSIONS
// ============================================================================

/// One calendar day of dim_fecha
#[derive(Debug, Clone, PartialEq)]
pub struct DateDimRow {
    pub fecha: NaiveDate,
    pub anio: i32,
    pub mes: i32,
    pub dia: i32,
    /// 0 = Monday .. 6 = Sunday
    pub dia_semana: i32,
}

/// One hour of dim_hora
#[derive(Debug, Clone, PartialEq)]
pub struct HourDimRow {
    pub hora: i32,
    pub periodo_dia: String,
}

// ============================================================================
// FACT ROWS
// ============================================================================

/// One service lifecycle summarized into hecho_entrega_acumulado. Stage
/// columns for stages the service never reached stay None and load as SQL
/// NULLs; interval strings are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedFactRow {
    pub servicio_id: i64,
    pub key_dim_fecha: Option<i64>,
    pub key_dim_cliente: Option<i64>,
    pub key_dim_mensajero: Option<i64>,
    pub key_dim_hora: Option<i64>,
    pub fecha_iniciado: Option<NaiveDate>,
    pub hora_iniciado: Option<String>,
    pub fecha_asignado: Option<NaiveDate>,
    pub hora_asignado: Option<String>,
    pub fecha_novedad: Option<NaiveDate>,
    pub hora_novedad: Option<String>,
    pub fecha_ultima_novedad: Option<NaiveDate>,
    pub hora_ultima_novedad: Option<String>,
    pub fecha_recogido: Option<NaiveDate>,
    pub hora_recogido: Option<String>,
    pub fecha_entregado: Option<NaiveDate>,
    pub hora_entregado: Option<String>,
    pub fecha_cerrado: Option<NaiveDate>,
    pub hora_cerrado: Option<String>,
    pub tiempo_asignacion: String,
    pub tiempo_total_novedades: String,
    pub tiempo_recogida: String,
    pub tiempo_entrega: String,
    pub tiempo_cierre: String,
    pub cantidad_novedades: i64,
}

/// One group of hecho_entrega_servicio_hora. Groups are only formed over
/// rows whose surrogate keys all resolved, so the keys here are non-null.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyFactRow {
    pub servicio_id: i64,
    pub key_dim_fecha: i64,
    pub key_dim_cliente: i64,
    pub key_dim_mensajero: i64,
    pub key_dim_hora: i64,
    pub key_dim_sede: i64,
    pub cantidad_servicios: i64,
}

/// One group of hecho_entrega_servicio_diaria
#[derive(Debug, Clone, PartialEq)]
pub struct DailyFactRow {
    pub servicio_id: i64,
    pub key_dim_fecha: i64,
    pub key_dim_cliente: i64,
    pub key_dim_mensajero: i64,
    pub key_dim_sede: i64,
    pub dia_semana: i32,
    pub cantidad_servicios_dia: i64,
}

/// One row of hecho_novedades_servicio; unresolved dimension keys stay NULL
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentFactRow {
    pub key_dim_fecha: Option<i64>,
    pub key_dim_cliente: Option<i64>,
    pub key_dim_novedad: Option<i64>,
    /// Calendar date of the incident timestamp
    pub fecha_hora_novedad: NaiveDate,
    pub descripcion: Option<String>,
}

// ============================================================================
// AGGREGATION INPUTS (read back from the warehouse)
// ============================================================================

/// Accumulated row joined to its site through the client entity, restricted
/// to services with a recorded start hour
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyInputRow {
    pub servicio_id: i64,
    pub key_dim_fecha: Option<i64>,
    pub key_dim_cliente: Option<i64>,
    pub key_dim_mensajero: Option<i64>,
    pub key_dim_hora: Option<i64>,
    pub key_dim_sede: Option<i64>,
}

/// Accumulated row joined to site and date dimensions, restricted to
/// services with a recorded start date
#[derive(Debug, Clone, PartialEq)]
pub struct DailyInputRow {
    pub servicio_id: i64,
    pub key_dim_fecha: Option<i64>,
    pub key_dim_cliente: Option<i64>,
    pub key_dim_mensajero: Option<i64>,
    pub key_dim_sede: Option<i64>,
    pub dia_semana: Option<i32>,
}
