//! Timestamp scalar for last-write-wins ordering.
//!
//! Internally a timestamp is epoch milliseconds, so every comparison is a
//! plain integer comparison. The RFC 3339 and HTTP-date renderings exist
//! only at the wire boundary (JSON bodies and the `Last-Modified` header).

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::SystemTime;

/// A point in time with millisecond precision, totally ordered.
///
/// Serializes to an RFC 3339 string with milliseconds (the JSON wire form).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a Timestamp from epoch milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Epoch milliseconds of this Timestamp.
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Render as RFC 3339 with millisecond precision (UTC).
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse from an RFC 3339 string.
    pub fn parse_rfc3339(s: &str) -> Result<Self, ParseTimestampError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|_| ParseTimestampError)?;
        Ok(Self(dt.timestamp_millis()))
    }

    /// Render as an HTTP-date (`Last-Modified` header format).
    ///
    /// HTTP-dates carry whole seconds only; this is lossy and used for the
    /// header alone, never for ordering decisions.
    pub fn to_http_date(&self) -> String {
        self.to_datetime().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// Milliseconds elapsed since `earlier`, clamped at zero.
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).max(0)
    }

    fn to_datetime(self) -> DateTime<Utc> {
        // i64 millis always map to a single valid chrono instant
        Utc.timestamp_millis_opt(self.0).single().unwrap_or_default()
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        let dt: DateTime<Utc> = t.into();
        Self(dt.timestamp_millis())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse_rfc3339(&s).map_err(serde::de::Error::custom)
    }
}

/// Error from parsing an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid RFC 3339 timestamp")]
pub struct ParseTimestampError;
