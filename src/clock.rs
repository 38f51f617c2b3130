use crate::occupancy::MINUTES_PER_DAY;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("invalid debug hour {0:?}: expected a decimal hour such as 14.5")]
    InvalidHour(String),
    #[error("timestamp format error: {0}")]
    Format(#[from] time::error::Format),
}

/// Current wall-clock time in the local offset, or UTC when the offset is unknown.
pub fn local_now() -> OffsetDateTime {
    match OffsetDateTime::now_local() {
        Ok(now) => now,
        Err(err) => {
            debug!(error = %err, "Local offset unavailable, using UTC clock");
            OffsetDateTime::now_utc()
        }
    }
}

pub fn minutes_since_midnight(datetime: OffsetDateTime) -> i64 {
    i64::from(datetime.hour()) * 60 + i64::from(datetime.minute())
}

/// Convert a decimal hour argument (`"14.5"`) into minutes since midnight.
///
/// The value is truncated toward zero and is not clamped to a single day.
pub fn parse_debug_hour(raw: &str) -> Result<i64, ClockError> {
    let hour: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ClockError::InvalidHour(raw.to_string()))?;
    let minutes = (hour * 60.0).trunc();
    if !minutes.is_finite() || minutes.abs() > i64::MAX as f64 {
        return Err(ClockError::InvalidHour(raw.to_string()));
    }
    Ok(minutes as i64)
}

/// Minutes to simulate: the debug override when it parses, otherwise `now`.
pub fn resolve_minutes(debug_hour: Option<&str>, now: OffsetDateTime) -> i64 {
    if let Some(raw) = debug_hour {
        match parse_debug_hour(raw) {
            Ok(minutes) => {
                if !(0..MINUTES_PER_DAY).contains(&minutes) {
                    warn!(hour = raw, minutes, "Debug hour outside a single day");
                } else {
                    debug!(hour = raw, minutes, "Using debug hour override");
                }
                return minutes;
            }
            Err(err) => {
                warn!(error = %err, "Ignoring debug hour, falling back to current time");
            }
        }
    }
    minutes_since_midnight(now)
}

/// RFC 3339 timestamp in UTC.
pub fn format_timestamp(datetime: OffsetDateTime) -> Result<String, ClockError> {
    Ok(datetime.to_offset(UtcOffset::UTC).format(&Rfc3339)?)
}
