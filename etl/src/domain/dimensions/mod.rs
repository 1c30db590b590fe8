//! Dimension builders and pass-through cleanup
//!
//! dim_fecha and dim_hora are generated. The reference dimensions (cliente,
//! mensajero, sede, novedad, estado) load the extracted rows as-is, with
//! the courier rows passing through a null-text cleanup first.

use chrono::{Datelike, NaiveDate};

use crate::data::types::{CourierRow, DateDimRow, HourDimRow};

/// Placeholder the warehouse stores for absent courier text attributes
const UNSPECIFIED: &str = "No especificado";

/// One row per calendar day in [start, end] inclusive. Pure function of the
/// two bounds; empty when start > end.
pub fn date_dimension(start: NaiveDate, end: NaiveDate) -> Vec<DateDimRow> {
    start
        .iter_days()
        .take_while(|fecha| *fecha <= end)
        .map(|fecha| DateDimRow {
            fecha,
            anio: fecha.year(),
            mes: fecha.month() as i32,
            dia: fecha.day() as i32,
            dia_semana: fecha.weekday().num_days_from_monday() as i32,
        })
        .collect()
}

/// The 24 hours of the day, each tagged with its period bucket
pub fn hour_dimension() -> Vec<HourDimRow> {
    (0..24)
        .map(|hora| HourDimRow {
            hora,
            periodo_dia: day_period(hora).to_string(),
        })
        .collect()
}

/// Period bucket for an hour of the day
pub fn day_period(hora: i32) -> &'static str {
    match hora {
        0..6 => "Madrugada",
        6..12 => "Mañana",
        12..18 => "Tarde",
        _ => "Noche",
    }
}

/// Replace absent or empty courier text attributes with the warehouse
/// placeholder. Date and bool attributes stay null when absent.
pub fn normalize_couriers(mut rows: Vec<CourierRow>) -> Vec<CourierRow> {
    for row in &mut rows {
        if matches!(row.ciudad_operacion.as_deref(), None | Some("")) {
            row.ciudad_operacion = Some(UNSPECIFIED.to_string());
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_dimension_inclusive_bounds() {
        let rows = date_dimension(d("2024-01-01"), d("2024-01-03"));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].fecha, d("2024-01-01"));
        assert_eq!(rows[2].fecha, d("2024-01-03"));
    }

    #[test]
    fn test_date_dimension_leap_year() {
        let rows = date_dimension(d("2024-01-01"), d("2024-12-31"));
        assert_eq!(rows.len(), 366);
    }

    #[test]
    fn test_date_dimension_default_horizon_size() {
        let rows = date_dimension(d("2023-01-01"), d("2024-12-31"));
        assert_eq!(rows.len(), 365 + 366);
    }

    #[test]
    fn test_date_dimension_components() {
        let rows = date_dimension(d("2024-02-29"), d("2024-02-29"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].anio, 2024);
        assert_eq!(rows[0].mes, 2);
        assert_eq!(rows[0].dia, 29);
        // 2024-02-29 was a Thursday
        assert_eq!(rows[0].dia_semana, 3);
    }

    #[test]
    fn test_date_dimension_monday_is_zero() {
        let rows = date_dimension(d("2024-01-01"), d("2024-01-07"));
        // 2024-01-01 was a Monday
        assert_eq!(rows[0].dia_semana, 0);
        assert_eq!(rows[6].dia_semana, 6);
    }

    #[test]
    fn test_date_dimension_empty_when_inverted() {
        assert!(date_dimension(d("2024-06-01"), d("2024-01-01")).is_empty());
    }

    #[test]
    fn test_hour_dimension_has_24_rows() {
        let rows = hour_dimension();
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].hora, 0);
        assert_eq!(rows[23].hora, 23);
    }

    #[test]
    fn test_day_period_boundaries() {
        assert_eq!(day_period(0), "Madrugada");
        assert_eq!(day_period(5), "Madrugada");
        assert_eq!(day_period(6), "Mañana");
        assert_eq!(day_period(11), "Mañana");
        assert_eq!(day_period(12), "Tarde");
        assert_eq!(day_period(17), "Tarde");
        assert_eq!(day_period(18), "Noche");
        assert_eq!(day_period(23), "Noche");
    }

    #[test]
    fn test_normalize_couriers_fills_missing_city() {
        let rows = vec![
            CourierRow {
                mensajero_id: 1,
                fecha_entrada: None,
                fecha_salida: None,
                ciudad_operacion: None,
                activo: Some(true),
            },
            CourierRow {
                mensajero_id: 2,
                fecha_entrada: Some(d("2023-05-10")),
                fecha_salida: None,
                ciudad_operacion: Some("".into()),
                activo: None,
            },
            CourierRow {
                mensajero_id: 3,
                fecha_entrada: None,
                fecha_salida: None,
                ciudad_operacion: Some("Cali".into()),
                activo: Some(false),
            },
        ];
        let out = normalize_couriers(rows);
        assert_eq!(out[0].ciudad_operacion.as_deref(), Some("No especificado"));
        assert_eq!(out[1].ciudad_operacion.as_deref(), Some("No especificado"));
        assert_eq!(out[2].ciudad_operacion.as_deref(), Some("Cali"));
        // typed attributes are left alone
        assert_eq!(out[0].fecha_entrada, None);
        assert_eq!(out[1].fecha_entrada, Some(d("2023-05-10")));
        assert_eq!(out[1].activo, None);
    }
}
