use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

/// Parses a front matter date.
///
/// Accepts RFC 3339 datetimes, local datetimes, and plain `YYYY-MM-DD` dates.
/// Values without an offset are interpreted in `timezone`; plain dates are
/// midnight.
pub fn parse_date(date: &str, timezone: Tz) -> Option<DateTime<FixedOffset>> {
    let date = date.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(date) {
        return Some(datetime);
    }

    if let Ok(datetime) = DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z") {
        return Some(datetime);
    }

    let naive = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    let local = timezone.from_local_datetime(&naive).earliest()?;
    let offset = local.offset().fix();

    Some(local.with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn rfc3339(date: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(date).unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(
            parse_date("2024-01-01T10:30:00+02:00", Tz::UTC),
            Some(rfc3339("2024-01-01T10:30:00+02:00"))
        );
        assert_eq!(
            parse_date("2024-01-01T10:30:00Z", Tz::Asia__Tokyo),
            Some(rfc3339("2024-01-01T10:30:00Z"))
        );
    }

    #[test]
    fn test_parse_numeric_offset() {
        assert_eq!(
            parse_date("2024-01-02 10:00:00 +0200", Tz::UTC),
            Some(rfc3339("2024-01-02T10:00:00+02:00"))
        );
    }

    #[test]
    fn test_parse_plain_date_uses_timezone() {
        assert_eq!(
            parse_date("2023-07-01", Tz::UTC),
            Some(rfc3339("2023-07-01T00:00:00Z"))
        );
        assert_eq!(
            parse_date("2023-07-01", Tz::America__New_York),
            Some(rfc3339("2023-07-01T00:00:00-04:00"))
        );
    }

    #[test]
    fn test_parse_local_datetime() {
        assert_eq!(
            parse_date("2023-12-31T23:59:00", Tz::Europe__Paris),
            Some(rfc3339("2023-12-31T23:59:00+01:00"))
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_date("yesterday", Tz::UTC), None);
        assert_eq!(parse_date("07:32:00", Tz::UTC), None);
        assert_eq!(parse_date("2023-02-30", Tz::UTC), None);
    }
}
