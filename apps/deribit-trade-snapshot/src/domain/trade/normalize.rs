//! Timestamp normalization.
//!
//! Rewrites epoch-millisecond `timestamp` fields into ISO-8601 strings with
//! a `Z` suffix. Normalization builds new records; the fetched trades are
//! never mutated. Whole seconds print as `HH:MM:SSZ`; any other instant keeps
//! its milliseconds as a six-digit fraction (`HH:MM:SS.123000Z`).

use chrono::DateTime;
use serde_json::Value;

use super::{TIMESTAMP_FIELD, Trade, TradeSet};

const WHOLE_SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const FRACTIONAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Format epoch milliseconds as `YYYY-MM-DDTHH:MM:SS[.ffffff]Z`.
///
/// The fraction is omitted when the instant falls on a whole second.
/// Negative values count back from the epoch, so `-1` is one millisecond
/// before midnight. Returns `None` when the instant is outside the
/// representable range.
#[must_use]
pub fn format_epoch_millis(ms: i64) -> Option<String> {
    let dt = DateTime::from_timestamp_millis(ms)?;
    let format = if ms.rem_euclid(1000) == 0 {
        WHOLE_SECOND_FORMAT
    } else {
        FRACTIONAL_FORMAT
    };
    Some(dt.format(format).to_string())
}

/// Return a copy of `trade` with its numeric timestamp rewritten.
///
/// Trades without a timestamp, or whose timestamp is not a number (for
/// example one that was already normalized), come back unchanged.
#[must_use]
pub fn normalize_trade(trade: &Trade) -> Trade {
    let Value::Object(fields) = trade.as_value() else {
        return trade.clone();
    };
    let Some(iso) = fields.get(TIMESTAMP_FIELD).and_then(numeric_millis).and_then(format_epoch_millis)
    else {
        return trade.clone();
    };

    let mut normalized = fields.clone();
    normalized.insert(TIMESTAMP_FIELD.to_string(), Value::String(iso));
    Trade::new(Value::Object(normalized))
}

/// Normalize every trade in the set, preserving instrument and trade order.
#[must_use]
pub fn normalize_trade_set(trades: &TradeSet) -> TradeSet {
    let mut normalized = TradeSet::new();
    for (instrument, instrument_trades) in trades.iter() {
        normalized.insert(
            instrument,
            instrument_trades.iter().map(normalize_trade).collect(),
        );
    }
    normalized
}

#[allow(clippy::cast_possible_truncation)]
fn numeric_millis(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|ms| ms.is_finite() && ms.abs() < 9.0e15)
            .map(|ms| ms.floor() as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn rewrites_epoch_millis_to_iso_utc() {
        let trade = Trade::new(json!({ "trade_id": "1", "timestamp": 1_700_000_000_000_i64 }));
        let normalized = normalize_trade(&trade);
        assert_eq!(
            normalized.get("timestamp"),
            Some(&json!("2023-11-14T22:13:20Z"))
        );
        assert_eq!(normalized.get("trade_id"), Some(&json!("1")));
    }

    #[test]
    fn sub_second_millis_are_kept_as_microseconds() {
        let trade = Trade::new(json!({ "timestamp": 1_700_000_000_123_i64 }));
        assert_eq!(
            normalize_trade(&trade).get("timestamp"),
            Some(&json!("2023-11-14T22:13:20.123000Z"))
        );
        assert_eq!(
            format_epoch_millis(1_700_000_000_999).as_deref(),
            Some("2023-11-14T22:13:20.999000Z")
        );
        assert_eq!(
            format_epoch_millis(-1).as_deref(),
            Some("1969-12-31T23:59:59.999000Z")
        );
        assert_eq!(format_epoch_millis(-1000).as_deref(), Some("1969-12-31T23:59:59Z"));
    }

    #[test]
    fn trades_in_the_same_second_stay_distinct() {
        let first = format_epoch_millis(1_700_000_000_100);
        let second = format_epoch_millis(1_700_000_000_200);
        assert_ne!(first, second);
    }

    #[test]
    fn fractional_millis_are_floored() {
        let trade = Trade::new(json!({ "timestamp": 1_700_000_000_123.9 }));
        assert_eq!(
            normalize_trade(&trade).get("timestamp"),
            Some(&json!("2023-11-14T22:13:20.123000Z"))
        );
    }

    #[test]
    fn original_trade_is_not_mutated() {
        let trade = Trade::new(json!({ "timestamp": 1_700_000_000_000_i64 }));
        let _ = normalize_trade(&trade);
        assert_eq!(trade.timestamp_ms(), Some(1_700_000_000_000));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let trade = Trade::new(json!({ "timestamp": 1_700_000_000_000_i64 }));
        let once = normalize_trade(&trade);
        let twice = normalize_trade(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn trades_without_timestamp_are_untouched() {
        let trade = Trade::new(json!({ "price": 42_000.5 }));
        assert_eq!(normalize_trade(&trade), trade);

        let not_an_object = Trade::new(json!([1, 2, 3]));
        assert_eq!(normalize_trade(&not_an_object), not_an_object);

        let null_ts = Trade::new(json!({ "timestamp": null }));
        assert_eq!(normalize_trade(&null_ts), null_ts);
    }

    #[test]
    fn normalizes_whole_set_in_order() {
        let mut set = TradeSet::new();
        set.insert(
            "BTC-1JAN24-40000-C",
            vec![
                Trade::new(json!({ "timestamp": 1_700_000_000_000_i64 })),
                Trade::new(json!({ "timestamp": 1_700_000_001_000_i64 })),
            ],
        );
        set.insert("BTC-1JAN24-40000-P", vec![]);

        let normalized = normalize_trade_set(&set);

        assert_eq!(normalized.len(), 2);
        let trades = normalized.get("BTC-1JAN24-40000-C").unwrap();
        assert_eq!(trades[0].get("timestamp"), Some(&json!("2023-11-14T22:13:20Z")));
        assert_eq!(trades[1].get("timestamp"), Some(&json!("2023-11-14T22:13:21Z")));
        assert_eq!(normalized.get("BTC-1JAN24-40000-P"), Some(&[][..]));
    }

    proptest! {
        #[test]
        fn formatted_instant_parses_back_to_same_millis(ms in -2_208_988_800_000_i64..4_102_444_800_000) {
            let text = format_epoch_millis(ms).unwrap();
            let parsed = DateTime::parse_from_rfc3339(&text).unwrap();
            prop_assert_eq!(parsed.timestamp_millis(), ms);
            prop_assert_eq!(text.contains('.'), ms.rem_euclid(1000) != 0);
        }
    }
}
