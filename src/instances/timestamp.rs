//! Timestamp parsing and uptime rendering.
//!
//! Spot instances report RFC 3339 times while on-demand rentals use a
//! Postgres-style `2025-07-08 21:53:35.367+00` form. Unparseable values are
//! reported as unknown rather than failing the caller.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Text shown when an uptime cannot be determined.
pub const UNKNOWN_UPTIME: &str = "N/A";

/// ISO-8601 with a literal `Z` and no fractional seconds.
const ISO_ZULU_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Space-separated with fractional seconds and a bare `+hh` offset.
const SPACED_FRACTIONAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Space-separated with a bare `+hh` offset.
const SPACED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%#z";

/// Parses a timestamp, trying each accepted format in order.
///
/// Returns `None` if no format matches.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, ISO_ZULU_FORMAT).map(|n| n.and_utc()))
        .or_else(|_| {
            DateTime::parse_from_str(value, SPACED_FRACTIONAL_FORMAT)
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|_| DateTime::parse_from_str(value, SPACED_FORMAT).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}

/// Elapsed running time of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uptime {
    /// Known, non-negative elapsed time.
    Elapsed(Duration),
    /// Start missing or unparseable, or end before start.
    Unknown,
}

impl Uptime {
    /// Computes uptime from `start` until `end`, or until now when `end` is
    /// absent, empty or unparseable.
    #[must_use]
    pub fn since(start: &str, end: Option<&str>) -> Self {
        Self::between(start, end, Utc::now())
    }

    /// Same as [`Uptime::since`] with an explicit "now".
    #[must_use]
    pub fn between(start: &str, end: Option<&str>, now: DateTime<Utc>) -> Self {
        let Some(start) = parse_timestamp(start) else {
            return Self::Unknown;
        };

        let end = end.and_then(parse_timestamp).unwrap_or(now);
        let elapsed = end - start;

        if elapsed < Duration::zero() {
            Self::Unknown
        } else {
            Self::Elapsed(elapsed)
        }
    }

    /// Returns true if the uptime could not be determined.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self::Elapsed(elapsed) = self else {
            return f.write_str(UNKNOWN_UPTIME);
        };

        let total_hours = elapsed.num_hours();
        let days = total_hours / 24;
        let hours = total_hours % 24;
        let minutes = elapsed.num_minutes() % 60;

        if days > 0 {
            write!(f, "{days}d {hours}h")
        } else if hours > 0 {
            write!(f, "{hours}h {minutes}m")
        } else {
            write!(f, "{minutes}m")
        }
    }
}

impl Serialize for Uptime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
