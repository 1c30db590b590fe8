//! Elapsed-time computation between lifecycle milestones
//!
//! The warehouse stores stage-to-stage durations as "HH:MM:SS" text where
//! missing or malformed endpoints read as "00:00:00". Internally the
//! computation keeps the cases apart so a true zero span is distinguishable
//! from an absent measurement.

use chrono::{NaiveDate, NaiveDateTime};

use crate::utils::time::parse_clock;

/// The loaded value for intervals that could not be measured
pub const ZERO_INTERVAL: &str = "00:00:00";

/// Outcome of differencing two milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elapsed {
    /// Non-negative whole seconds between the two instants
    Span(i64),
    /// At least one endpoint is absent
    Missing,
    /// An endpoint is present but its clock text does not parse
    Invalid,
}

/// Difference two (date, clock-text) milestones. Inverted endpoints are
/// swapped before differencing so the span is never negative.
pub fn measure(
    fecha1: Option<NaiveDate>,
    hora1: Option<&str>,
    fecha2: Option<NaiveDate>,
    hora2: Option<&str>,
) -> Elapsed {
    let (Some(f1), Some(h1), Some(f2), Some(h2)) = (fecha1, hora1, fecha2, hora2) else {
        return Elapsed::Missing;
    };
    let (Some(t1), Some(t2)) = (parse_clock(h1), parse_clock(h2)) else {
        return Elapsed::Invalid;
    };

    let a = NaiveDateTime::new(f1, t1);
    let b = NaiveDateTime::new(f2, t2);
    let (start, end) = if b < a { (b, a) } else { (a, b) };
    Elapsed::Span((end - start).num_seconds())
}

/// Elapsed time between two milestones as zero-padded "HH:MM:SS" text with
/// unbounded hours. Missing or malformed endpoints read as "00:00:00".
/// Never fails.
pub fn elapsed(
    fecha1: Option<NaiveDate>,
    hora1: Option<&str>,
    fecha2: Option<NaiveDate>,
    hora2: Option<&str>,
) -> String {
    match measure(fecha1, hora1, fecha2, hora2) {
        Elapsed::Span(secs) => format_span(secs),
        Elapsed::Missing | Elapsed::Invalid => ZERO_INTERVAL.to_string(),
    }
}

/// Format whole seconds as H+:MM:SS, hours not capped at 24
fn format_span(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Option<NaiveDate> {
        Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    #[test]
    fn test_elapsed_same_day() {
        let out = elapsed(d("2024-01-01"), Some("08:00:00"), d("2024-01-01"), Some("08:10:00"));
        assert_eq!(out, "00:10:00");
    }

    #[test]
    fn test_elapsed_zero_span() {
        let out = elapsed(d("2024-01-01"), Some("08:00:00"), d("2024-01-01"), Some("08:00:00"));
        assert_eq!(out, "00:00:00");
    }

    #[test]
    fn test_elapsed_swap_symmetry() {
        let forward = elapsed(d("2024-01-01"), Some("08:00:00"), d("2024-01-02"), Some("09:30:15"));
        let backward = elapsed(d("2024-01-02"), Some("09:30:15"), d("2024-01-01"), Some("08:00:00"));
        assert_eq!(forward, backward);
        assert_eq!(forward, "25:30:15");
    }

    #[test]
    fn test_elapsed_hours_not_capped() {
        let out = elapsed(d("2024-01-01"), Some("00:00:00"), d("2024-01-08"), Some("02:00:30"));
        assert_eq!(out, "170:00:30");
    }

    #[test]
    fn test_elapsed_missing_endpoint() {
        assert_eq!(
            elapsed(None, Some("08:00:00"), d("2024-01-01"), Some("09:00:00")),
            "00:00:00"
        );
        assert_eq!(
            elapsed(d("2024-01-01"), Some("08:00:00"), d("2024-01-01"), None),
            "00:00:00"
        );
        assert_eq!(elapsed(None, None, None, None), "00:00:00");
    }

    #[test]
    fn test_elapsed_malformed_clock() {
        assert_eq!(
            elapsed(d("2024-01-01"), Some("garbage"), d("2024-01-01"), Some("09:00:00")),
            "00:00:00"
        );
        assert_eq!(
            elapsed(d("2024-01-01"), Some("08:00:00"), d("2024-01-01"), Some("25:99:00")),
            "00:00:00"
        );
    }

    #[test]
    fn test_elapsed_fractional_seconds_truncated() {
        let out = elapsed(
            d("2024-01-01"),
            Some("08:00:00.250"),
            d("2024-01-01"),
            Some("08:00:05.750"),
        );
        assert_eq!(out, "00:00:05");
    }

    #[test]
    fn test_elapsed_shape_is_always_clocklike() {
        let samples = [
            elapsed(d("2024-01-01"), Some("00:00:00"), d("2025-06-01"), Some("23:59:59")),
            elapsed(None, None, None, None),
            elapsed(d("2024-01-01"), Some("bad"), d("2024-01-01"), Some("bad")),
        ];
        for s in samples {
            let parts: Vec<&str> = s.split(':').collect();
            assert_eq!(parts.len(), 3, "unexpected shape: {s}");
            assert!(parts[0].len() >= 2 && parts[0].chars().all(|c| c.is_ascii_digit()));
            assert_eq!(parts[1].len(), 2);
            assert_eq!(parts[2].len(), 2);
        }
    }

    #[test]
    fn test_measure_keeps_cases_apart() {
        assert_eq!(
            measure(d("2024-01-01"), Some("08:00:00"), d("2024-01-01"), Some("08:00:00")),
            Elapsed::Span(0)
        );
        assert_eq!(measure(None, None, d("2024-01-01"), Some("08:00:00")), Elapsed::Missing);
        assert_eq!(
            measure(d("2024-01-01"), Some("xx"), d("2024-01-01"), Some("08:00:00")),
            Elapsed::Invalid
        );
    }
}
