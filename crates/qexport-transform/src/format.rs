//! Value formatting for export cells

use crate::error::{TransformError, TransformResult};
use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use qexport_eval::operators::comparison::parse_calendar_date;

/// Calendar layout of Date cells
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats dates and timestamps with one fixed utc offset
#[derive(Debug, Clone, Copy)]
pub struct ValueFormatter {
    offset: FixedOffset,
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }
}

impl ValueFormatter {
    /// Formatter rendering timestamps at `minutes` east of UTC
    pub fn with_utc_offset(minutes: i32) -> TransformResult<Self> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(TransformError::InvalidOffset { minutes })?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Format a stored date answer as calendar date, ignoring any time zone in the value
    pub fn date(&self, value: &str) -> TransformResult<String> {
        parse_calendar_date(value)
            .map(|date| date.format(DATE_FORMAT).to_string())
            .ok_or_else(|| TransformError::invalid_date(value))
    }

    /// Format a stored timestamp answer as RFC 3339 at the configured offset
    ///
    /// Accepts RFC 3339 text or milliseconds since the epoch.
    pub fn timestamp(&self, value: &str) -> TransformResult<String> {
        let value = value.trim();
        let parsed = DateTime::parse_from_rfc3339(value)
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                value
                    .parse::<i64>()
                    .ok()
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
            })
            .ok_or_else(|| TransformError::invalid_timestamp(value))?;
        Ok(self.instant(&parsed))
    }

    /// Format an instant as RFC 3339 at the configured offset
    pub fn instant(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}
