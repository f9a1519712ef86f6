//! Timestamp validity, date windows and chronological ordering.
//!
//! This module provides [`FilterConfig`] for an optional date window, plus
//! the ordering helpers the enrichment pipeline runs before and after
//! resolution.
//!
//! # Timestamp Rules
//!
//! | Input | Valid |
//! |--------|-------|
//! | `1700000000` | yes |
//! | `1700000000.5` | yes, fractional seconds kept to the millisecond |
//! | `0`, negative | no |
//! | `null`, absent | no |
//! | `"1700000000"`, `"abc"` | no, only JSON numbers count |
//!
//! # Examples
//!
//! ```
//! use groupex::core::filter::FilterConfig;
//!
//! # fn main() -> groupex::Result<()> {
//! let config = FilterConfig::new()
//!     .with_date_from("2024-06-01")?
//!     .with_date_to("2024-12-31")?;
//!
//! assert!(config.is_active());
//! # Ok(())
//! # }
//! ```

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GroupexError;
use crate::message::EnrichedMessage;
use crate::parsing::RawMessage;

/// Output format of the `datetime` field: ISO-8601, UTC, milliseconds.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Optional inclusive date window.
///
/// Messages outside the window are dropped together with invalid ones, but
/// counted separately in the enrichment report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Include only messages on or after this timestamp.
    pub after: Option<DateTime<Utc>>,

    /// Include only messages on or before this timestamp.
    pub before: Option<DateTime<Utc>>,
}

impl FilterConfig {
    /// Creates a new empty filter configuration.
    ///
    /// No window is active by default; every valid message passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start date (inclusive, start of day UTC).
    ///
    /// Date format: `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`GroupexError::InvalidDate`] if the format is invalid.
    pub fn with_date_from(mut self, date_str: &str) -> Result<Self, GroupexError> {
        self.after = Some(parse_date(date_str, 0, 0, 0)?);
        Ok(self)
    }

    /// Sets the end date (inclusive, end of day UTC).
    ///
    /// Date format: `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`GroupexError::InvalidDate`] if the format is invalid.
    pub fn with_date_to(mut self, date_str: &str) -> Result<Self, GroupexError> {
        self.before = Some(parse_date(date_str, 23, 59, 59)?);
        Ok(self)
    }

    /// Sets the start timestamp directly.
    #[must_use]
    pub fn with_after(mut self, dt: DateTime<Utc>) -> Self {
        self.after = Some(dt);
        self
    }

    /// Sets the end timestamp directly.
    #[must_use]
    pub fn with_before(mut self, dt: DateTime<Utc>) -> Self {
        self.before = Some(dt);
        self
    }

    /// Returns `true` if any bound is set.
    pub fn is_active(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }

    /// Returns `true` if `dt` lies inside the window.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        !self.after.is_some_and(|after| dt < after) && !self.before.is_some_and(|before| dt > before)
    }
}

fn parse_date(date_str: &str, hour: u32, min: u32, sec: u32) -> Result<DateTime<Utc>, GroupexError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(hour, min, sec))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| GroupexError::invalid_date(date_str))
}

/// Converts epoch seconds to a UTC datetime, truncated to the millisecond.
///
/// Returns `None` for timestamps that are not valid (see the module docs)
/// or that fall outside the range chrono can represent.
pub fn timestamp_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !(secs.is_finite() && secs > 0.0) {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).trunc() as i64)
}

/// Formats a datetime as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// ```
/// use groupex::core::filter::{format_datetime, timestamp_to_datetime};
///
/// let dt = timestamp_to_datetime(1000.0).unwrap();
/// assert_eq!(format_datetime(dt), "1970-01-01T00:16:40.000Z");
/// ```
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// The datetime of a raw message, if its timestamp is valid.
pub fn message_datetime(message: &RawMessage) -> Option<DateTime<Utc>> {
    message.valid_timestamp().and_then(timestamp_to_datetime)
}

fn by_key(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Stable ascending sort of raw messages by timestamp.
///
/// Invalid timestamps sort as zero, so they lead; ties keep input order.
pub fn sort_raw_messages(messages: &mut [RawMessage]) {
    messages.sort_by(|a, b| by_key(a.sort_key(), b.sort_key()));
}

/// Stable ascending sort of enriched messages by timestamp.
pub fn sort_enriched_messages(messages: &mut [EnrichedMessage]) {
    messages.sort_by(|a, b| by_key(a.timestamp, b.timestamp));
}

/// Assigns dense 1-based serial numbers in slice order.
pub fn assign_serial_numbers(messages: &mut [EnrichedMessage]) {
    for (idx, message) in messages.iter_mut().enumerate() {
        message.serial_number = idx + 1;
    }
}
