//! Clock-string helpers for operational wall-clock columns

use chrono::NaiveTime;

/// Normalize a raw clock string: trim whitespace and drop any
/// fractional-seconds suffix ("08:00:00.123456" -> "08:00:00")
pub fn clean_clock(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.split('.').next().unwrap_or(trimmed).to_string()
}

/// Parse a cleaned clock string into a NaiveTime, None when malformed
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(clean_clock(raw).as_str(), "%H:%M:%S").ok()
}

/// Leading hour component of a clock string ("08:15:00" -> 8), None when
/// the hour digits do not parse
pub fn clock_hour(raw: &str) -> Option<u32> {
    raw.trim().split(':').next()?.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_clean_clock_plain() {
        assert_eq!(clean_clock("08:00:00"), "08:00:00");
    }

    #[test]
    fn test_clean_clock_fractional_seconds() {
        assert_eq!(clean_clock("08:00:00.123456"), "08:00:00");
    }

    #[test]
    fn test_clean_clock_whitespace() {
        assert_eq!(clean_clock("  08:00:00.5  "), "08:00:00");
    }

    #[test]
    fn test_parse_clock_valid() {
        let t = parse_clock("14:30:05").unwrap();
        assert_eq!(t.hour(), 14);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.second(), 5);
    }

    #[test]
    fn test_parse_clock_fractional_input() {
        let t = parse_clock("14:30:05.999").unwrap();
        assert_eq!(t.second(), 5);
    }

    #[test]
    fn test_parse_clock_single_digit_hour() {
        let t = parse_clock("8:05:00").unwrap();
        assert_eq!(t.hour(), 8);
    }

    #[test]
    fn test_parse_clock_invalid() {
        assert!(parse_clock("not-a-time").is_none());
        assert!(parse_clock("25:00:00").is_none());
        assert!(parse_clock("").is_none());
    }

    #[test]
    fn test_clock_hour_valid() {
        assert_eq!(clock_hour("08:15:00"), Some(8));
        assert_eq!(clock_hour("23:59:59"), Some(23));
    }

    #[test]
    fn test_clock_hour_invalid() {
        assert_eq!(clock_hour("xx:15:00"), None);
        assert_eq!(clock_hour(""), None);
    }
}
