//! Event-stream reshaping into one wide lifecycle row per service
//!
//! The operational database records a service as a sequence of
//! (stage, date, time) events. The accumulated fact wants them flattened:
//! one optional column-group per singular stage, first/last bounds plus a
//! count for the multi-valued incident stage, and the five stage-to-stage
//! durations.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::types::{ServiceEventRow, ServiceStage};
use crate::utils::time::{clean_clock, parse_clock};

use super::intervals::elapsed;

/// Calendar date and cleaned wall-clock text of one lifecycle milestone
#[derive(Debug, Clone, PartialEq)]
pub struct StageStamp {
    pub fecha: NaiveDate,
    pub hora: String,
}

/// First/last bounds and count of a service's incident events
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentSummary {
    pub first: StageStamp,
    pub last: StageStamp,
    pub count: i64,
}

/// The five stage-to-stage durations, formatted as "HH:MM:SS" text
#[derive(Debug, Clone, PartialEq)]
pub struct StageIntervals {
    pub asignacion: String,
    pub total_novedades: String,
    pub recogida: String,
    pub entrega: String,
    pub cierre: String,
}

/// One service's full lifecycle. A stage the service never reached is None
/// and loads as NULLs for its column-group.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLifecycle {
    pub servicio_id: i64,
    pub cliente_id: Option<i64>,
    pub mensajero_inicial_id: Option<i64>,
    pub iniciado: Option<StageStamp>,
    pub asignado: Option<StageStamp>,
    pub novedades: Option<IncidentSummary>,
    pub recogido: Option<StageStamp>,
    pub entregado: Option<StageStamp>,
    pub cerrado: Option<StageStamp>,
    pub tiempos: StageIntervals,
}

impl ServiceLifecycle {
    /// Incident count, zero when the service recorded none
    pub fn cantidad_novedades(&self) -> i64 {
        self.novedades.as_ref().map_or(0, |n| n.count)
    }
}

/// Reshape the event stream into one lifecycle per distinct servicio_id,
/// emitted in ascending servicio_id order. Every service present in the
/// input appears exactly once in the output.
pub fn reshape(events: &[ServiceEventRow]) -> Vec<ServiceLifecycle> {
    let mut partitions: BTreeMap<i64, Vec<&ServiceEventRow>> = BTreeMap::new();
    for event in events {
        partitions.entry(event.servicio_id).or_default().push(event);
    }

    partitions
        .into_iter()
        .map(|(servicio_id, partition)| lifecycle_of(servicio_id, partition))
        .collect()
}

fn lifecycle_of(servicio_id: i64, mut partition: Vec<&ServiceEventRow>) -> ServiceLifecycle {
    // Client/courier attribution comes from the first event carrying one,
    // in input order
    let cliente_id = partition.iter().find_map(|e| e.cliente_id);
    let mensajero_inicial_id = partition.iter().find_map(|e| e.mensajero_inicial_id);

    // Chronological order decides which occurrence of a singular stage is
    // authoritative and which incidents bound the span. The sort is stable,
    // so ties and unparseable clock text (which sorts at midnight) resolve
    // by input order.
    partition.sort_by_key(|e| {
        (
            e.fecha_estado,
            parse_clock(&e.hora_estado).unwrap_or(chrono::NaiveTime::MIN),
        )
    });

    let mut iniciado = None;
    let mut asignado = None;
    let mut recogido = None;
    let mut entregado = None;
    let mut cerrado = None;
    let mut incidents: Vec<StageStamp> = Vec::new();

    for event in &partition {
        let stamp = StageStamp {
            fecha: event.fecha_estado,
            hora: clean_clock(&event.hora_estado),
        };
        let slot = match ServiceStage::from_id(event.estado_id) {
            Some(ServiceStage::Iniciado) => &mut iniciado,
            Some(ServiceStage::Asignado) => &mut asignado,
            Some(ServiceStage::Recogido) => &mut recogido,
            Some(ServiceStage::Entregado) => &mut entregado,
            Some(ServiceStage::Cerrado) => &mut cerrado,
            Some(ServiceStage::Novedad) => {
                incidents.push(stamp);
                continue;
            }
            None => {
                tracing::debug!(
                    servicio_id,
                    estado_id = event.estado_id,
                    "ignoring event with unknown stage code"
                );
                continue;
            }
        };
        if slot.is_none() {
            *slot = Some(stamp);
        }
    }

    let novedades = match (incidents.first(), incidents.last()) {
        (Some(first), Some(last)) => Some(IncidentSummary {
            first: first.clone(),
            last: last.clone(),
            count: incidents.len() as i64,
        }),
        _ => None,
    };

    let tiempos = stage_intervals(
        iniciado.as_ref(),
        asignado.as_ref(),
        novedades.as_ref(),
        recogido.as_ref(),
        entregado.as_ref(),
        cerrado.as_ref(),
    );

    ServiceLifecycle {
        servicio_id,
        cliente_id,
        mensajero_inicial_id,
        iniciado,
        asignado,
        novedades,
        recogido,
        entregado,
        cerrado,
        tiempos,
    }
}

fn stage_intervals(
    iniciado: Option<&StageStamp>,
    asignado: Option<&StageStamp>,
    novedades: Option<&IncidentSummary>,
    recogido: Option<&StageStamp>,
    entregado: Option<&StageStamp>,
    cerrado: Option<&StageStamp>,
) -> StageIntervals {
    let first_novedad = novedades.map(|n| &n.first);
    let last_novedad = novedades.map(|n| &n.last);

    // With incidents on record, the pickup span is measured from the last
    // incident instead of from assignment
    let recogida = match last_novedad {
        Some(last) => between(Some(last), recogido),
        None => between(asignado, recogido),
    };

    StageIntervals {
        asignacion: between(iniciado, asignado),
        total_novedades: between(first_novedad, last_novedad),
        recogida,
        entrega: between(recogido, entregado),
        cierre: between(entregado, cerrado),
    }
}

fn between(a: Option<&StageStamp>, b: Option<&StageStamp>) -> String {
    elapsed(
        a.map(|s| s.fecha),
        a.map(|s| s.hora.as_str()),
        b.map(|s| s.fecha),
        b.map(|s| s.hora.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_event(servicio_id: i64, estado_id: i32, fecha: &str, hora: &str) -> ServiceEventRow {
        ServiceEventRow {
            servicio_id,
            cliente_id: Some(10),
            mensajero_inicial_id: Some(20),
            estado_id,
            fecha_estado: d(fecha),
            hora_estado: hora.to_string(),
        }
    }

    #[test]
    fn test_one_row_per_service() {
        let events = vec![
            make_event(2, 1, "2024-01-01", "08:00:00"),
            make_event(1, 1, "2024-01-01", "07:00:00"),
            make_event(2, 5, "2024-01-01", "09:00:00"),
            make_event(3, 3, "2024-01-02", "10:00:00"),
            make_event(1, 2, "2024-01-01", "07:30:00"),
        ];
        let rows = reshape(&events);
        let ids: Vec<i64> = rows.iter().map(|r| r.servicio_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_started_and_delivered_only() {
        let events = vec![
            make_event(1, 1, "2024-01-01", "08:00:00"),
            make_event(1, 5, "2024-01-01", "09:00:00"),
        ];
        let rows = reshape(&events);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!(row.iniciado.is_some());
        assert!(row.entregado.is_some());
        assert!(row.asignado.is_none());
        assert!(row.novedades.is_none());
        assert!(row.recogido.is_none());
        assert!(row.cerrado.is_none());
        assert_eq!(row.tiempos.asignacion, "00:00:00");
        assert_eq!(row.tiempos.total_novedades, "00:00:00");
        assert_eq!(row.tiempos.recogida, "00:00:00");
        assert_eq!(row.tiempos.entrega, "00:00:00");
        assert_eq!(row.tiempos.cierre, "00:00:00");
        assert_eq!(row.cantidad_novedades(), 0);
    }

    #[test]
    fn test_ten_minute_assignment() {
        let events = vec![
            make_event(1, 1, "2024-01-01", "08:00:00"),
            make_event(1, 2, "2024-01-01", "08:10:00"),
            make_event(1, 5, "2024-01-01", "09:00:00"),
        ];
        let rows = reshape(&events);
        assert_eq!(rows[0].tiempos.asignacion, "00:10:00");
        assert_eq!(rows[0].tiempos.total_novedades, "00:00:00");
    }

    #[test]
    fn test_full_lifecycle_intervals() {
        let events = vec![
            make_event(1, 1, "2024-01-01", "08:00:00"),
            make_event(1, 2, "2024-01-01", "08:10:00"),
            make_event(1, 4, "2024-01-01", "08:40:00"),
            make_event(1, 5, "2024-01-01", "09:00:00"),
            make_event(1, 6, "2024-01-01", "09:05:00"),
        ];
        let rows = reshape(&events);
        let t = &rows[0].tiempos;
        assert_eq!(t.asignacion, "00:10:00");
        assert_eq!(t.recogida, "00:30:00");
        assert_eq!(t.entrega, "00:20:00");
        assert_eq!(t.cierre, "00:05:00");
    }

    #[test]
    fn test_incident_bounds_and_count() {
        let events = vec![
            make_event(1, 1, "2024-01-01", "08:00:00"),
            // arrives shuffled; chronological sort decides first/last
            make_event(1, 3, "2024-01-01", "12:00:00"),
            make_event(1, 3, "2024-01-01", "10:00:00"),
            make_event(1, 3, "2024-01-01", "11:00:00"),
        ];
        let rows = reshape(&events);
        let novedades = rows[0].novedades.as_ref().unwrap();
        assert_eq!(novedades.count, 3);
        assert_eq!(novedades.first.hora, "10:00:00");
        assert_eq!(novedades.last.hora, "12:00:00");
        assert_eq!(rows[0].tiempos.total_novedades, "02:00:00");
        assert_eq!(rows[0].cantidad_novedades(), 3);
    }

    #[test]
    fn test_pickup_measured_from_last_incident() {
        let events = vec![
            make_event(1, 1, "2024-01-01", "08:00:00"),
            make_event(1, 2, "2024-01-01", "08:05:00"),
            make_event(1, 3, "2024-01-01", "08:30:00"),
            make_event(1, 3, "2024-01-01", "09:00:00"),
            make_event(1, 4, "2024-01-01", "09:45:00"),
        ];
        let rows = reshape(&events);
        // last incident 09:00 -> pickup 09:45, not assignment 08:05
        assert_eq!(rows[0].tiempos.recogida, "00:45:00");
    }

    #[test]
    fn test_duplicate_stage_first_chronological_wins() {
        let events = vec![
            make_event(1, 1, "2024-01-02", "08:00:00"),
            make_event(1, 1, "2024-01-01", "10:00:00"),
        ];
        let rows = reshape(&events);
        assert_eq!(rows[0].iniciado.as_ref().unwrap().fecha, d("2024-01-01"));
    }

    #[test]
    fn test_duplicate_stage_tie_resolves_by_input_order() {
        let mut first = make_event(1, 1, "2024-01-01", "08:00:00");
        first.cliente_id = Some(111);
        let mut second = make_event(1, 1, "2024-01-01", "08:00:00");
        second.cliente_id = Some(222);
        let rows = reshape(&[first, second]);
        // the stamp of the first input event is kept; attribution scans
        // input order as well
        assert_eq!(rows[0].cliente_id, Some(111));
    }

    #[test]
    fn test_fractional_seconds_cleaned() {
        let events = vec![make_event(1, 1, "2024-01-01", "08:00:00.123456")];
        let rows = reshape(&events);
        assert_eq!(rows[0].iniciado.as_ref().unwrap().hora, "08:00:00");
    }

    #[test]
    fn test_unknown_stage_code_ignored() {
        let events = vec![
            make_event(1, 1, "2024-01-01", "08:00:00"),
            make_event(1, 9, "2024-01-01", "08:30:00"),
        ];
        let rows = reshape(&events);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].asignado.is_none());
    }

    #[test]
    fn test_attribution_takes_first_non_null() {
        let mut a = make_event(1, 1, "2024-01-01", "08:00:00");
        a.cliente_id = None;
        a.mensajero_inicial_id = None;
        let mut b = make_event(1, 2, "2024-01-01", "08:10:00");
        b.cliente_id = Some(7);
        b.mensajero_inicial_id = Some(9);
        let rows = reshape(&[a, b]);
        assert_eq!(rows[0].cliente_id, Some(7));
        assert_eq!(rows[0].mensajero_inicial_id, Some(9));
    }

    #[test]
    fn test_incident_only_service_still_emitted() {
        let events = vec![
            make_event(1, 3, "2024-01-01", "09:00:00"),
            make_event(1, 3, "2024-01-01", "09:30:00"),
        ];
        let rows = reshape(&events);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].iniciado.is_none());
        assert_eq!(rows[0].cantidad_novedades(), 2);
        assert_eq!(rows[0].tiempos.total_novedades, "00:30:00");
    }

    #[test]
    fn test_empty_stream() {
        assert!(reshape(&[]).is_empty());
    }

    #[test]
    fn test_malformed_clock_degrades_interval_only() {
        let events = vec![
            make_event(1, 1, "2024-01-01", "garbled"),
            make_event(1, 2, "2024-01-01", "08:10:00"),
        ];
        let rows = reshape(&events);
        // the stamp itself survives for loading; only the interval degrades
        assert_eq!(rows[0].iniciado.as_ref().unwrap().hora, "garbled");
        assert_eq!(rows[0].tiempos.asignacion, "00:00:00");
    }
}
