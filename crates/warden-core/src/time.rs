//! UTC timestamp wrapper used throughout the server for audit entries and token expiry.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A UTC point in time, serialized as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Build a timestamp `seconds` in the future from now.
    #[must_use]
    pub fn in_seconds(seconds: i64) -> Self {
        Self(Utc::now() + chrono::Duration::seconds(seconds))
    }

    /// Whether this timestamp is at or before now, allowing `skew_secs` of clock drift.
    #[must_use]
    pub fn has_elapsed_with_skew(&self, skew_secs: i64) -> bool {
        self.0 <= Utc::now() + chrono::Duration::seconds(skew_secs)
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Elapsed milliseconds between `self` and `later`, saturating at zero.
    #[must_use]
    pub fn elapsed_millis_until(&self, later: Timestamp) -> u64 {
        (later.0 - self.0).num_milliseconds().max(0) as u64
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_timestamp_has_not_elapsed() {
        let future = Timestamp::in_seconds(60);
        assert!(!future.has_elapsed_with_skew(0));
    }

    #[test]
    fn past_timestamp_has_elapsed() {
        let past = Timestamp::in_seconds(-60);
        assert!(past.has_elapsed_with_skew(0));
    }

    #[test]
    fn elapsed_millis_is_nonnegative_and_ordered() {
        let start = Timestamp::now();
        let end = Timestamp::in_seconds(1);
        assert!(start.elapsed_millis_until(end) >= 900);
    }
}
