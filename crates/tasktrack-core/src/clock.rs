//! Time source abstraction.
//!
//! Every core operation takes "now" as an explicit argument. Callers obtain
//! it from a [`Clock`], optionally overridden per request by a simulated
//! instant.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{CoreError, Result};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The simulated instant if one was supplied, otherwise the clock's reading.
pub fn resolve_now(clock: &dyn Clock, simulated: Option<DateTime<Utc>>) -> DateTime<Utc> {
    simulated.unwrap_or_else(|| clock.now())
}

/// Parse an RFC 3339 instant, or a bare `YYYY-MM-DD` date taken as
/// 00:00:00 UTC of that day.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| CoreError::InvalidTimestamp(input.to_string()))
}
