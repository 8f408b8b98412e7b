// Date utility functions
// All schedule timestamps are handled in UTC; see `parse_timestamp`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

const WEEKDAYS_ES: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Calendar-day key used to bucket surgeries (`YYYY-MM-DD`)
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Build an absolute UTC instant from a calendar day and minutes since midnight.
///
/// Fields are set one by one in UTC so the stored day always equals the displayed day.
pub fn utc_timestamp(date: NaiveDate, minutes: u32) -> Option<DateTime<Utc>> {
    if minutes >= 24 * 60 {
        return None;
    }
    Utc.with_ymd_and_hms(
        date.year(),
        date.month(),
        date.day(),
        minutes / 60,
        minutes % 60,
        0,
    )
    .single()
}

/// ISO-8601 with millisecond precision and a `Z` suffix (`2025-03-10T09:00:00.000Z`)
pub fn format_iso_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a backend timestamp into UTC.
///
/// Offset-bearing values are converted to UTC, naive values are read as UTC,
/// and a bare date is taken as UTC midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Long Spanish date for the schedule header ("lunes, 10 de marzo de 2025")
pub fn format_long_date_es(date: NaiveDate) -> String {
    let weekday = WEEKDAYS_ES[date.weekday().num_days_from_monday() as usize];
    let month = MONTHS_ES[date.month0() as usize];
    format!("{}, {} de {} de {}", weekday, date.day(), month, date.year())
}

/// Short es-CL date-time (`10-03-2025, 09:05:00`); falls back to the raw text
pub fn format_datetime_es(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(instant) => instant.format("%d-%m-%Y, %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_utc_timestamp_keeps_day_and_time() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let instant = utc_timestamp(date, 9 * 60 + 15).unwrap();
        assert_eq!(instant.date_naive(), date);
        assert_eq!((instant.hour(), instant.minute()), (9, 15));
        assert_eq!(format_iso_utc(instant), "2025-03-10T09:15:00.000Z");
    }

    #[test]
    fn test_utc_timestamp_rejects_end_of_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert!(utc_timestamp(date, 24 * 60).is_none());
    }

    #[test]
    fn test_parse_timestamp_converts_offsets() {
        let instant = parse_timestamp("2025-03-10T23:30:00-03:00").unwrap();
        assert_eq!(day_key(instant.date_naive()), "2025-03-11");
        assert_eq!(instant.hour(), 2);
    }

    #[test]
    fn test_parse_timestamp_reads_naive_as_utc() {
        let instant = parse_timestamp("2025-03-10 08:45:00").unwrap();
        assert_eq!((instant.hour(), instant.minute()), (8, 45));
        assert!(parse_timestamp("no es fecha").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_long_date_in_spanish() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(format_long_date_es(date), "lunes, 10 de marzo de 2025");
    }
}
