//! Time Abstractions
//!
//! Provides an injectable time source for deterministic testing and the log
//! level vocabulary shared with the runtime's logging setup.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Time source trait
///
/// Abstracts system time so day-keyed files (change log rotation) can be
/// tested against a fixed date.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::time::Clock;
///
/// fn log_file_stamp(clock: &dyn Clock) -> String {
///     clock.today().format("%Y%m%d").to_string()
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Get current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day in the host's local time zone
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// System clock implementation using actual system time
#[derive(Debug, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant in a fixed time zone (UTC by default)
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn today(&self) -> NaiveDate {
        self.instant.with_timezone(&self.offset).date_naive()
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive used in `EnvFilter` strings
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_today_is_local() {
        let clock = SystemClock;
        let now = clock.now();

        assert!(now.timestamp() > 0);
        // Tolerates a midnight rollover between the two reads
        let drift = clock.today() - Local::now().date_naive();
        assert!(drift.num_days().abs() <= 1);
    }

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let clock = FixedClock::at(instant);

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_fixed_clock_day_follows_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 23, 30, 0).unwrap();

        let ahead = FixedClock::at(instant).with_offset(FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(ahead.today(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());

        let early = Utc.with_ymd_and_hms(2024, 3, 15, 3, 0, 0).unwrap();
        let behind = FixedClock::at(early).with_offset(FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(behind.today(), NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Info);
        assert!(LogLevel::Error > LogLevel::Warn);
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
    }

    #[test]
    fn test_log_level_serde() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
    }
}
