//! Hourly and daily service-count aggregation
//!
//! Inputs are re-read from the warehouse after the accumulated fact loads
//! (the site key arrives joined through the client entity). Grouping only
//! forms over rows whose keys all resolved; a row with an unresolved key
//! cannot name its group and is left out of these facts.

use std::collections::BTreeMap;

use crate::data::types::{DailyFactRow, DailyInputRow, HourlyFactRow, HourlyInputRow};

/// Count services per (date, client, site, courier, hour, service) group.
/// Output order is deterministic in the group key.
pub fn hourly_fact(inputs: &[HourlyInputRow]) -> Vec<HourlyFactRow> {
    let mut groups: BTreeMap<(i64, i64, i64, i64, i64, i64), i64> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in inputs {
        let (Some(fecha), Some(cliente), Some(sede), Some(mensajero), Some(hora)) = (
            row.key_dim_fecha,
            row.key_dim_cliente,
            row.key_dim_sede,
            row.key_dim_mensajero,
            row.key_dim_hora,
        ) else {
            skipped += 1;
            continue;
        };
        *groups
            .entry((fecha, cliente, sede, mensajero, hora, row.servicio_id))
            .or_insert(0) += 1;
    }

    if skipped > 0 {
        tracing::debug!(skipped, "hourly aggregation left out rows with unresolved keys");
    }

    groups
        .into_iter()
        .map(
            |((fecha, cliente, sede, mensajero, hora, servicio_id), cantidad)| HourlyFactRow {
                servicio_id,
                key_dim_fecha: fecha,
                key_dim_cliente: cliente,
                key_dim_mensajero: mensajero,
                key_dim_hora: hora,
                key_dim_sede: sede,
                cantidad_servicios: cantidad,
            },
        )
        .collect()
}

/// Count services per (date, client, site, courier, service) group, keyed
/// additionally by the weekday read from the date dimension
pub fn daily_fact(inputs: &[DailyInputRow]) -> Vec<DailyFactRow> {
    let mut groups: BTreeMap<(i64, i64, i64, i64, i64, i32), i64> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in inputs {
        let (Some(fecha), Some(cliente), Some(sede), Some(mensajero), Some(dia_semana)) = (
            row.key_dim_fecha,
            row.key_dim_cliente,
            row.key_dim_sede,
            row.key_dim_mensajero,
            row.dia_semana,
        ) else {
            skipped += 1;
            continue;
        };
        *groups
            .entry((fecha, cliente, sede, mensajero, row.servicio_id, dia_semana))
            .or_insert(0) += 1;
    }

    if skipped > 0 {
        tracing::debug!(skipped, "daily aggregation left out rows with unresolved keys");
    }

    groups
        .into_iter()
        .map(
            |((fecha, cliente, sede, mensajero, servicio_id, dia_semana), cantidad)| DailyFactRow {
                servicio_id,
                key_dim_fecha: fecha,
                key_dim_cliente: cliente,
                key_dim_mensajero: mensajero,
                key_dim_sede: sede,
                dia_semana,
                cantidad_servicios_dia: cantidad,
            },
        )
        .collect()
}
