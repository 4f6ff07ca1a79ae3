//! Instrument Types
//!
//! Option contracts as listed by the venue catalog, and the expiry window
//! that decides which of them are worth snapshotting.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A single tradeable contract (e.g. `BTC-27DEC24-100000-C`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Venue instrument name.
    pub name: String,
    /// Expiration instant in epoch milliseconds.
    pub expiration_ms: i64,
}

impl Instrument {
    /// Create a new instrument.
    #[must_use]
    pub fn new(name: impl Into<String>, expiration_ms: i64) -> Self {
        Self {
            name: name.into(),
            expiration_ms,
        }
    }
}

/// Inclusive `[now, now + horizon]` range of acceptable expirations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    start_ms: i64,
    end_ms: i64,
    end: DateTime<Utc>,
}

impl ExpiryWindow {
    /// Build the window starting at `now` and spanning `horizon_days`.
    #[must_use]
    pub fn from_now(now: DateTime<Utc>, horizon_days: u32) -> Self {
        let end = now
            .checked_add_signed(TimeDelta::days(i64::from(horizon_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            start_ms: now.timestamp_millis(),
            end_ms: end.timestamp_millis(),
            end,
        }
    }

    /// Lower bound in epoch milliseconds.
    #[must_use]
    pub const fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Upper bound in epoch milliseconds.
    #[must_use]
    pub const fn end_ms(&self) -> i64 {
        self.end_ms
    }

    /// Upper bound as a UTC instant.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether an expiration falls inside the window (both ends inclusive).
    #[must_use]
    pub const fn contains(&self, expiration_ms: i64) -> bool {
        self.start_ms <= expiration_ms && expiration_ms <= self.end_ms
    }
}

/// Keep the instruments expiring inside `window`, preserving catalog order.
#[must_use]
pub fn select_candidates(instruments: Vec<Instrument>, window: &ExpiryWindow) -> Vec<Instrument> {
    instruments
        .into_iter()
        .filter(|instrument| window.contains(instrument.expiration_ms))
        .collect()
}
