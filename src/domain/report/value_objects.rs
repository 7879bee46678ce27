//! Report value normalization helpers

use chrono::{DateTime, SecondsFormat, Utc};

/// Normalize a source-reported domain FQDN: lowercase, one trailing dot
/// stripped. Absent domains map to the `"unknown"` sentinel.
pub fn normalize_domain(raw: Option<&str>) -> String {
    let domain = raw.map(str::trim).filter(|d| !d.is_empty()).unwrap_or("unknown");
    domain.trim_end_matches('.').to_lowercase()
}

/// Parse a source-local generation timestamp into UTC.
///
/// PingCastle emits RFC 3339 with a timezone offset and up to 7 fractional
/// digits, e.g. `2025-12-18T14:32:25.6874739-05:00`. A bad or absent
/// timestamp never fails the run; it falls back to the current UTC time.
pub fn normalize_generation_date(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Render a UTC timestamp with microsecond precision and `Z` suffix.
///
/// Fractional seconds are truncated to 6 digits and always present, so the
/// run-index sort key is uniform-width and lexical order matches
/// chronological order.
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn domain_is_lowercased_and_trailing_dot_stripped() {
        assert_eq!(normalize_domain(Some("Contoso.LOCAL.")), "contoso.local");
        assert_eq!(normalize_domain(Some("corp.example.com")), "corp.example.com");
    }

    #[test]
    fn absent_domain_uses_sentinel() {
        assert_eq!(normalize_domain(None), "unknown");
        assert_eq!(normalize_domain(Some("")), "unknown");
        assert_eq!(normalize_domain(Some("  ")), "unknown");
    }

    #[test]
    fn seven_digit_fractions_parse_and_truncate() {
        let dt = normalize_generation_date(Some("2025-12-18T14:32:25.6874739-05:00"));
        assert_eq!(format_utc(dt), "2025-12-18T19:32:25.687473Z");
    }

    #[test]
    fn offset_is_converted_to_utc() {
        let dt = normalize_generation_date(Some("2025-01-02T00:30:00+02:00"));
        assert_eq!(format_utc(dt), "2025-01-01T22:30:00.000000Z");
    }

    #[test]
    fn garbage_timestamp_falls_back_to_now() {
        let before = Utc::now();
        let dt = normalize_generation_date(Some("not-a-date"));
        assert!(dt >= before);
    }

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert!(format_utc(early) < format_utc(late));
    }
}
