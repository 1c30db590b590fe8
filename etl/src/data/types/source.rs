//! Typed rows extracted from the operational dispatch database
//!
//! Column sets mirror the extraction queries in `data::postgres::source`;
//! downstream transforms never reach past these shapes into the source
//! schema.

use chrono::{NaiveDate, NaiveDateTime};

// ============================================================================
// SERVICE LIFECYCLE
// ============================================================================

/// Lifecycle stages a delivery service moves through, in operational order.
/// Novedad is the only stage that can occur more than once per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStage {
    Iniciado = 1,
    Asignado = 2,
    Novedad = 3,
    Recogido = 4,
    Entregado = 5,
    Cerrado = 6,
}

impl ServiceStage {
    /// Map an operational estado_id to a stage, None for codes outside the
    /// known set
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Iniciado),
            2 => Some(Self::Asignado),
            3 => Some(Self::Novedad),
            4 => Some(Self::Recogido),
            5 => Some(Self::Entregado),
            6 => Some(Self::Cerrado),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iniciado => "iniciado",
            Self::Asignado => "asignado",
            Self::Novedad => "novedad",
            Self::Recogido => "recogido",
            Self::Entregado => "entregado",
            Self::Cerrado => "cerrado",
        }
    }
}

/// One (service, stage) event from mensajeria_estadosservicio, joined to its
/// service row. The stream arrives ordered by (servicio_id, fecha, hora).
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEventRow {
    pub servicio_id: i64,
    pub cliente_id: Option<i64>,
    /// Courier assigned on the service row at extraction time
    pub mensajero_inicial_id: Option<i64>,
    pub estado_id: i32,
    pub fecha_estado: NaiveDate,
    /// Raw wall-clock text, possibly carrying a fractional-seconds suffix
    pub hora_estado: String,
}

// ============================================================================
// REFERENCE DATA (pass-through dimensions)
// ============================================================================

/// Client master row with type and city names resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRow {
    pub cliente_id: i64,
    pub nombre: Option<String>,
    pub nit_cliente: Option<String>,
    pub tipo_cliente: Option<String>,
    pub sector: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub nombre_contacto: Option<String>,
    pub ciudad: Option<String>,
}

/// Courier master row with the operating-city name resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CourierRow {
    pub mensajero_id: i64,
    pub fecha_entrada: Option<NaiveDate>,
    pub fecha_salida: Option<NaiveDate>,
    pub ciudad_operacion: Option<String>,
    pub activo: Option<bool>,
}

/// Dispatch site row with city and department names resolved
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRow {
    pub sede_id: i64,
    pub nombre_sede: Option<String>,
    pub direccion_sede: Option<String>,
    pub ciudad_sede: Option<String>,
    pub departamento_sede: Option<String>,
}

/// Incident catalog row, one per recorded incident occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRefRow {
    pub novedad_id: i64,
    pub tipo_novedad_id: Option<i64>,
    pub descripcion: Option<String>,
}

/// Status catalog row
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub estado_id: i64,
    pub nombre_estado: Option<String>,
    pub descripcion: Option<String>,
}

// ============================================================================
// INCIDENT LOG
// ============================================================================

/// Incident occurrence with the client attribution exactly as the source
/// query produces it (input of hecho_novedades_servicio)
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentLogRow {
    pub novedad_id: i64,
    pub fecha_hora_novedad: NaiveDateTime,
    pub cliente_id: Option<i64>,
    pub mensajero_id: Option<i64>,
    pub tipo_novedad_id: Option<i64>,
    pub descripcion: Option<String>,
}
