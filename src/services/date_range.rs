// src/services/date_range.rs
// DOCUMENTATION: Date parsing and schedule date windows
// PURPOSE: Shared by the Apollo schedule proxy, session filters and admin payloads

use crate::errors::CinemaError;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Days covered by a schedule request when no end date is given
pub const DEFAULT_RANGE_DAYS: i64 = 14;

/// Inclusive date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub dt_from: NaiveDate,
    pub dt_to: NaiveDate,
}

fn has_shape(value: &str, separators: &[(usize, u8)], len: usize) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == len
        && bytes.iter().enumerate().all(|(i, b)| {
            match separators.iter().find(|(pos, _)| *pos == i) {
                Some((_, sep)) => b == sep,
                None => b.is_ascii_digit(),
            }
        })
}

fn is_iso_shape(value: &str) -> bool {
    has_shape(value, &[(4, b'-'), (7, b'-')], 10)
}

fn is_apollo_shape(value: &str) -> bool {
    has_shape(value, &[(2, b'.'), (5, b'.')], 10)
}

/// Parse a strict YYYY-MM-DD calendar date
pub fn validate_iso_date(value: &str) -> Result<NaiveDate, CinemaError> {
    if !is_iso_shape(value) {
        return Err(CinemaError::InvalidInput(format!(
            "Invalid date format: {}. Expected YYYY-MM-DD.",
            value
        )));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CinemaError::InvalidInput(format!("Invalid date: {}", value)))
}

/// Convert YYYY-MM-DD into the DD.MM.YYYY form Apollo expects
pub fn to_apollo_date(value: &str) -> Result<String, CinemaError> {
    if is_apollo_shape(value) {
        return Ok(value.to_string());
    }
    if is_iso_shape(value) {
        let (year, rest) = value.split_at(4);
        let month = &rest[1..3];
        let day = &rest[4..6];
        return Ok(format!("{}.{}.{}", day, month, year));
    }
    Err(CinemaError::InvalidInput(format!(
        "Invalid date format: {}. Expected YYYY-MM-DD or DD.MM.YYYY.",
        value
    )))
}

/// Resolve an optional dtFrom/dtTo pair
/// DOCUMENTATION: from defaults to `today`, to defaults to from + 14 days
pub fn default_date_range(
    dt_from: Option<&str>,
    dt_to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, CinemaError> {
    let from = match dt_from.filter(|v| !v.is_empty()) {
        Some(value) => validate_iso_date(value)?,
        None => today,
    };

    let to = match dt_to.filter(|v| !v.is_empty()) {
        Some(value) => validate_iso_date(value)?,
        None => from + Duration::days(DEFAULT_RANGE_DAYS),
    };

    if to < from {
        return Err(CinemaError::InvalidInput(
            "End date (dtTo) cannot be before start date (dtFrom)".to_string(),
        ));
    }

    Ok(DateRange {
        dt_from: from,
        dt_to: to,
    })
}

/// Interpret a wall-clock time in the server's zone
pub fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    resolve_wall_clock(&Local, naive)
}

/// Ambiguous times take the earlier instant; times skipped by a DST jump
/// move forward one hour
fn resolve_wall_clock<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Start of `date` and start of the following day, server local time
pub fn local_day_bounds(date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_to_utc(date.and_hms_opt(0, 0, 0)?)?;
    let end = local_to_utc(date.succ_opt()?.and_hms_opt(0, 0, 0)?)?;
    Some((start, end))
}

/// Parse timestamps as they appear in Apollo feeds and admin forms
/// DOCUMENTATION: RFC 3339 keeps its offset, naive values are server local time,
/// bare dates mean local midnight
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local_to_utc(naive);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(local_to_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_iso_date() {
        assert_eq!(validate_iso_date("2025-02-28").unwrap(), date(2025, 2, 28));
        assert!(validate_iso_date("2025-02-30").is_err());
        assert!(validate_iso_date("2025-2-3").is_err());
        assert!(validate_iso_date("28.02.2025").is_err());
    }

    #[test]
    fn test_to_apollo_date() {
        assert_eq!(to_apollo_date("2025-03-09").unwrap(), "09.03.2025");
        assert_eq!(to_apollo_date("09.03.2025").unwrap(), "09.03.2025");
        assert!(to_apollo_date("March 9").is_err());
    }

    #[test]
    fn test_default_range() {
        let today = date(2025, 1, 10);

        let range = default_date_range(None, None, today).unwrap();
        assert_eq!(range.dt_from, today);
        assert_eq!(range.dt_to, date(2025, 1, 24));

        let range = default_date_range(Some("2025-02-01"), None, today).unwrap();
        assert_eq!(range.dt_to, date(2025, 2, 15));

        let range = default_date_range(None, Some("2025-01-12"), today).unwrap();
        assert_eq!(range.dt_from, today);
        assert_eq!(range.dt_to, date(2025, 1, 12));
    }

    #[test]
    fn test_range_rejects_inverted_dates() {
        let err = default_date_range(Some("2025-01-10"), Some("2025-01-09"), date(2025, 1, 1));
        assert!(matches!(err, Err(CinemaError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let utc = parse_timestamp("2025-05-01T18:30:00Z").unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 5, 1, 18, 30, 0).unwrap());

        let offset = parse_timestamp("2025-05-01T21:30:00+03:00").unwrap();
        assert_eq!(offset, utc);

        let naive = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2025-05-01T18:30:00"), local_to_utc(naive));
        assert_eq!(parse_timestamp("2025-05-01T18:30:00.000"), local_to_utc(naive));

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("tomorrow").is_none());
    }

    /// EET/EEST with the spring jump on 2025-03-30: 03:00 local becomes 04:00
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(3 * 3600).unwrap()
        }

        fn switch_local() -> NaiveDateTime {
            date(2025, 3, 30).and_hms_opt(3, 0, 0).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, _local: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::Single(Self::winter())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let switch = Self::switch_local();
            if *local < switch {
                LocalResult::Single(Self::winter())
            } else if *local < switch + Duration::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, _utc: &NaiveDate) -> FixedOffset {
            Self::winter()
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < date(2025, 3, 30).and_hms_opt(1, 0, 0).unwrap() {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn test_wall_clock_in_dst_gap_moves_forward() {
        let skipped = date(2025, 3, 30).and_hms_opt(3, 30, 0).unwrap();
        assert_eq!(
            resolve_wall_clock(&SpringForward, skipped),
            Some(Utc.with_ymd_and_hms(2025, 3, 30, 1, 30, 0).unwrap())
        );

        let regular = date(2025, 3, 30).and_hms_opt(18, 0, 0).unwrap();
        assert_eq!(
            resolve_wall_clock(&SpringForward, regular),
            Some(Utc.with_ymd_and_hms(2025, 3, 30, 15, 0, 0).unwrap())
        );

        let before = date(2025, 3, 30).and_hms_opt(2, 30, 0).unwrap();
        assert_eq!(
            resolve_wall_clock(&SpringForward, before),
            Some(Utc.with_ymd_and_hms(2025, 3, 30, 0, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_day_bounds_span_one_day() {
        let (start, end) = local_day_bounds(date(2025, 6, 15)).unwrap();
        assert_eq!(end - start, Duration::hours(24));
    }
}
