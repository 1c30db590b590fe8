//! Incident fact assembly
//!
//! Each incident occurrence resolves against the date, client and incident
//! dimensions (left joins, NULL on no match) and loads with the calendar
//! date of its timestamp.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::data::types::{IncidentFactRow, IncidentLogRow};

use super::resolve::invert;

/// Natural-key to surrogate-key lookups for the three dimensions the
/// incident fact references
#[derive(Debug, Default)]
pub struct IncidentKeys {
    dates: HashMap<NaiveDate, i64>,
    clients: HashMap<i64, i64>,
    incidents: HashMap<i64, i64>,
}

impl IncidentKeys {
    /// Build the lookups from (surrogate key, natural key) pairs as the
    /// warehouse read-back queries return them
    pub fn new(
        dates: Vec<(i64, NaiveDate)>,
        clients: Vec<(i64, i64)>,
        incidents: Vec<(i64, i64)>,
    ) -> Self {
        Self {
            dates: invert(dates),
            clients: invert(clients),
            incidents: invert(incidents),
        }
    }
}

/// Resolve the incident log into loadable fact rows, preserving input order
pub fn incident_fact(log: &[IncidentLogRow], keys: &IncidentKeys) -> Vec<IncidentFactRow> {
    log.iter()
        .map(|row| {
            let fecha = row.fecha_hora_novedad.date();
            IncidentFactRow {
                key_dim_fecha: keys.dates.get(&fecha).copied(),
                key_dim_cliente: row.cliente_id.and_then(|id| keys.clients.get(&id).copied()),
                key_dim_novedad: keys.incidents.get(&row.novedad_id).copied(),
                fecha_hora_novedad: fecha,
                descripcion: row.descripcion.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_log(novedad_id: i64, at: &str) -> IncidentLogRow {
        IncidentLogRow {
            novedad_id,
            fecha_hora_novedad: dt(at),
            cliente_id: Some(10),
            mensajero_id: Some(20),
            tipo_novedad_id: Some(1),
            descripcion: Some("paquete dañado".into()),
        }
    }

    fn make_keys() -> IncidentKeys {
        IncidentKeys::new(
            vec![(100, d("2024-05-01")), (101, d("2024-05-02"))],
            vec![(200, 10)],
            vec![(300, 1), (301, 2)],
        )
    }

    #[test]
    fn test_resolves_all_three_keys() {
        let rows = incident_fact(&[make_log(1, "2024-05-01 16:45:00")], &make_keys());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key_dim_fecha, Some(100));
        assert_eq!(rows[0].key_dim_cliente, Some(200));
        assert_eq!(rows[0].key_dim_novedad, Some(300));
        assert_eq!(rows[0].descripcion.as_deref(), Some("paquete dañado"));
    }

    #[test]
    fn test_timestamp_loads_as_calendar_date() {
        let rows = incident_fact(&[make_log(1, "2024-05-02 23:59:59")], &make_keys());
        assert_eq!(rows[0].fecha_hora_novedad, d("2024-05-02"));
    }

    #[test]
    fn test_unmatched_keys_stay_null() {
        let mut log = make_log(9, "2023-12-31 08:00:00");
        log.cliente_id = Some(77);
        let rows = incident_fact(&[log], &make_keys());
        assert_eq!(rows[0].key_dim_fecha, None);
        assert_eq!(rows[0].key_dim_cliente, None);
        assert_eq!(rows[0].key_dim_novedad, None);
    }

    #[test]
    fn test_null_client_attribution() {
        let mut log = make_log(2, "2024-05-01 10:00:00");
        log.cliente_id = None;
        let rows = incident_fact(&[log], &make_keys());
        assert_eq!(rows[0].key_dim_cliente, None);
        assert_eq!(rows[0].key_dim_novedad, Some(301));
    }

    #[test]
    fn test_output_follows_input_order() {
        let rows = incident_fact(
            &[make_log(2, "2024-05-02 10:00:00"), make_log(1, "2024-05-01 10:00:00")],
            &make_keys(),
        );
        assert_eq!(rows[0].key_dim_novedad, Some(301));
        assert_eq!(rows[1].key_dim_novedad, Some(300));
    }
}
