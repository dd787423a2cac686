use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("timestamp cannot be empty")]
    Empty,
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid datetime format: expected YYYY-MM-DD or YYYY-MM-DD HH:MM")]
    InvalidDateTime,
    #[error("ambiguous local time: {0}")]
    AmbiguousLocalTime(String),
}

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

/// Whole days from `earlier` to `later`, rounded down. A future `earlier`
/// counts as zero days.
pub fn whole_days_between(earlier: i64, later: i64) -> i64 {
    later
        .saturating_sub(earlier)
        .div_euclid(SECONDS_PER_DAY)
        .max(0)
}

pub fn parse_local_timestamp(input: &str) -> Result<i64, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or(TimeParseError::InvalidDate)?;
        return local_to_utc_timestamp(naive);
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return local_to_utc_timestamp(dt);
        }
    }

    Err(TimeParseError::InvalidDateTime)
}

fn local_to_utc_timestamp(naive: NaiveDateTime) -> Result<i64, TimeParseError> {
    let local = Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| TimeParseError::AmbiguousLocalTime(naive.to_string()))?;
    Ok(local.with_timezone(&Utc).timestamp())
}

#[cfg(test)]
mod tests {
    use super::{parse_local_timestamp, whole_days_between, TimeParseError, SECONDS_PER_DAY};
    use chrono::{Local, TimeZone, Utc};

    #[test]
    fn whole_days_round_down() {
        let now = 1_700_000_000;
        assert_eq!(whole_days_between(now - SECONDS_PER_DAY + 1, now), 0);
        assert_eq!(whole_days_between(now - SECONDS_PER_DAY, now), 1);
        assert_eq!(whole_days_between(now - 5 * SECONDS_PER_DAY - 10, now), 5);
    }

    #[test]
    fn whole_days_ignore_future_timestamps() {
        let now = 1_700_000_000;
        assert_eq!(whole_days_between(now + 3 * SECONDS_PER_DAY, now), 0);
    }

    #[test]
    fn parse_local_timestamp_accepts_datetime() {
        let ts = parse_local_timestamp("2030-01-15 13:45").unwrap();
        let local = Utc.timestamp_opt(ts, 0).unwrap().with_timezone(&Local);
        assert_eq!(
            local.format("%Y-%m-%d %H:%M").to_string(),
            "2030-01-15 13:45"
        );
    }

    #[test]
    fn parse_local_timestamp_rejects_empty() {
        let err = parse_local_timestamp(" ").unwrap_err();
        assert!(matches!(err, TimeParseError::Empty));
    }
}
