//! # Temporal Types — UTC Timestamps and Calendar Dates
//!
//! Two distinct notions of time flow through the lifecycle engine:
//!
//! - [`Timestamp`]: an instant, UTC-only, truncated to seconds. Used for
//!   "last status change" bookkeeping.
//! - [`CalendarDate`]: a day with no time-of-day and no zone. Used for
//!   agreement expiry.
//!
//! ## Day Granularity
//!
//! Backends frequently persist a date-only field as a full timestamp
//! (`2099-01-01T00:00:00.000Z`, `2099-01-01T23:59:59+05:00`). Comparing such
//! a value against "now" at instant precision makes an agreement look expired
//! a few hours early or late depending on the zone. `CalendarDate` keeps the
//! date exactly as written and drops the rest, so every comparison is between
//! two calendar days.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ─── Timestamp ───────────────────────────────────────────────────────

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| CoreError::InvalidTimestamp {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The UTC calendar date of this instant.
    pub fn date(&self) -> CalendarDate {
        CalendarDate(self.0.date_naive())
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ─── Calendar Date ───────────────────────────────────────────────────

/// A calendar day with no time-of-day or time zone.
///
/// Serializes as `YYYY-MM-DD`. Deserialization also accepts RFC 3339
/// timestamps and naive `YYYY-MM-DDTHH:MM:SS` values, keeping only the date
/// part as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date from year, month and day. `None` if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Wrap a `chrono::NaiveDate`.
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date in UTC.
    pub fn today_utc() -> Self {
        Self(Utc::now().date_naive())
    }

    /// Parse a date, discarding any time-of-day or offset.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDate`] if the input is neither a plain
    /// date, an RFC 3339 timestamp, nor a naive ISO 8601 date-time.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        // The written date is authoritative; the offset is not applied.
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(dt.date_naive()));
        }
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|dt| Self(dt.date()))
            .map_err(|e| CoreError::InvalidDate {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Access the inner `chrono::NaiveDate`.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Midnight UTC at the start of this day.
    pub fn start_of_day(&self) -> Timestamp {
        Timestamp(self.0.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    /// Signed number of calendar days from `self` to `later`.
    ///
    /// Negative when `later` precedes `self`.
    pub fn days_until(&self, later: CalendarDate) -> i64 {
        later.0.signed_duration_since(self.0).num_days()
    }

    /// The date `days` calendar days after this one (before, if negative).
    pub fn offset_days(&self, days: i64) -> Option<Self> {
        chrono::TimeDelta::try_days(days)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for CalendarDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    // ---- Timestamp ----

    #[test]
    fn test_timestamp_truncates_subseconds() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.as_datetime().nanosecond(), 0);
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn test_timestamp_parse_converts_offset() {
        let ts = Timestamp::parse("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_timestamp_parse_rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn test_timestamp_date_is_utc_day() {
        let ts = Timestamp::parse("2026-01-15T23:30:00-02:00").unwrap();
        assert_eq!(ts.date(), date(2026, 1, 16));
    }

    // ---- CalendarDate parsing ----

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(CalendarDate::parse("2099-01-01").unwrap(), date(2099, 1, 1));
    }

    #[test]
    fn test_parse_timestamp_keeps_written_date() {
        assert_eq!(
            CalendarDate::parse("2099-01-01T00:00:00.000Z").unwrap(),
            date(2099, 1, 1)
        );
        // A late-evening value with a positive offset stays on its own day.
        assert_eq!(
            CalendarDate::parse("2099-01-01T23:59:59+05:00").unwrap(),
            date(2099, 1, 1)
        );
        assert_eq!(
            CalendarDate::parse("2099-01-01T00:30:00-08:00").unwrap(),
            date(2099, 1, 1)
        );
    }

    #[test]
    fn test_parse_naive_datetime() {
        assert_eq!(
            CalendarDate::parse("2099-01-01T15:04:05").unwrap(),
            date(2099, 1, 1)
        );
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(CalendarDate::parse("2099-02-30").is_err());
        assert!(CalendarDate::parse("01/01/2099").is_err());
        assert!(CalendarDate::parse("").is_err());
    }

    // ---- arithmetic ----

    #[test]
    fn test_days_until_is_signed() {
        let today = date(2026, 3, 1);
        assert_eq!(today.days_until(date(2026, 3, 2)), 1);
        assert_eq!(today.days_until(date(2026, 3, 1)), 0);
        assert_eq!(today.days_until(date(2026, 2, 27)), -2);
    }

    #[test]
    fn test_days_until_crosses_leap_day() {
        assert_eq!(date(2028, 2, 28).days_until(date(2028, 3, 1)), 2);
    }

    #[test]
    fn test_offset_days() {
        assert_eq!(date(2026, 12, 31).offset_days(1), Some(date(2027, 1, 1)));
        assert_eq!(date(2026, 1, 1).offset_days(-1), Some(date(2025, 12, 31)));
    }

    // ---- serde ----

    #[test]
    fn test_serializes_as_plain_date() {
        let json = serde_json::to_string(&date(2099, 1, 1)).unwrap();
        assert_eq!(json, "\"2099-01-01\"");
    }

    #[test]
    fn test_deserializes_timestamp_form() {
        let d: CalendarDate = serde_json::from_str("\"2099-01-01T10:00:00Z\"").unwrap();
        assert_eq!(d, date(2099, 1, 1));
    }

    proptest! {
        #[test]
        fn time_of_day_never_changes_the_date(
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            offset_hours in -12i32..=14,
        ) {
            let sign = if offset_hours < 0 { '-' } else { '+' };
            let raw = format!(
                "2030-06-{day:02}T{hour:02}:{minute:02}:00{sign}{:02}:00",
                offset_hours.abs()
            );
            let parsed = CalendarDate::parse(&raw).unwrap();
            prop_assert_eq!(parsed, date(2030, 6, day));
        }
    }
}
