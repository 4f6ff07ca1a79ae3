//! Trade Records
//!
//! Trades are kept as opaque JSON values: the venue adds fields over time
//! and the snapshot must carry them through untouched. Only `timestamp` is
//! interpreted, for pagination and for normalization.

mod normalize;

pub use normalize::{format_epoch_millis, normalize_trade, normalize_trade_set};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Field carrying the trade time in epoch milliseconds.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// A single trade as returned by the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trade(Value);

impl Trade {
    /// Wrap a raw JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Integer `timestamp` in epoch milliseconds, if present.
    ///
    /// Returns `None` once the trade has been normalized (the field is then
    /// a string).
    #[must_use]
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.get(TIMESTAMP_FIELD).and_then(Value::as_i64)
    }
}

/// Instrument name → trades, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeSet {
    entries: Vec<(String, Vec<Trade>)>,
}

impl TradeSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert trades for an instrument.
    ///
    /// An existing entry keeps its position and has its trades replaced;
    /// the previous trades are returned.
    pub fn insert(&mut self, instrument: impl Into<String>, trades: Vec<Trade>) -> Option<Vec<Trade>> {
        let instrument = instrument.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(name, _)| *name == instrument) {
            return Some(std::mem::replace(existing, trades));
        }
        self.entries.push((instrument, trades));
        None
    }

    /// Trades recorded for an instrument.
    #[must_use]
    pub fn get(&self, instrument: &str) -> Option<&[Trade]> {
        self.entries
            .iter()
            .find(|(name, _)| name == instrument)
            .map(|(_, trades)| trades.as_slice())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Trade])> {
        self.entries
            .iter()
            .map(|(name, trades)| (name.as_str(), trades.as_slice()))
    }

    /// Number of instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no instrument has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of trades across all instruments.
    #[must_use]
    pub fn total_trades(&self) -> usize {
        self.entries.iter().map(|(_, trades)| trades.len()).sum()
    }
}

impl Serialize for TradeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, trades) in &self.entries {
            map.serialize_entry(name, trades)?;
        }
        map.end()
    }
}
