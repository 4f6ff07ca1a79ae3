//! Trade history time window.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// `{start, end}` bounds in epoch milliseconds, fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Lower bound (epoch ms).
    pub start_ms: i64,
    /// Upper bound (epoch ms).
    pub end_ms: i64,
}

impl TimeWindow {
    /// Create a window from explicit bounds.
    #[must_use]
    pub const fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// The window ending at `now` and reaching back `lookback_days`.
    #[must_use]
    pub fn lookback(now: DateTime<Utc>, lookback_days: u32) -> Self {
        let start = now
            .checked_sub_signed(TimeDelta::days(i64::from(lookback_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            start_ms: start.timestamp_millis(),
            end_ms: now.timestamp_millis(),
        }
    }
}
