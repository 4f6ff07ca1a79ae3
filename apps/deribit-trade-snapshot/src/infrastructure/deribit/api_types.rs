//! Deribit API wire types.

use serde::Deserialize;

use crate::domain::instrument::Instrument;

/// JSON-RPC response envelope.
///
/// Deribit answers both successes and failures with this shape; exactly one
/// of `result` and `error` is expected.
#[derive(Debug, Deserialize)]
pub struct RpcEnvelope<T> {
    /// Method result.
    pub result: Option<T>,
    /// Error payload.
    pub error: Option<RpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    /// Deribit error code.
    pub code: i64,
    /// Human readable message.
    pub message: String,
}

/// Error-only envelope used for non-2xx bodies.
#[derive(Debug, Deserialize)]
pub struct RpcErrorResponse {
    /// Error payload.
    pub error: RpcError,
}

/// One entry of `get_instruments`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentRecord {
    /// Instrument name (e.g. `BTC-29DEC23-40000-C`).
    pub instrument_name: String,
    /// Expiry in epoch milliseconds.
    pub expiration_timestamp: i64,
}

impl From<InstrumentRecord> for Instrument {
    fn from(record: InstrumentRecord) -> Self {
        Self::new(record.instrument_name, record.expiration_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TradePage;

    #[test]
    fn instrument_record_ignores_extra_fields() {
        let body = r#"{"result":[{"instrument_name":"BTC-1JAN24-40000-C","expiration_timestamp":1704096000000,"strike":40000.0,"option_type":"call"}]}"#;
        let envelope: RpcEnvelope<Vec<InstrumentRecord>> = serde_json::from_str(body).unwrap();
        let instruments: Vec<Instrument> = envelope
            .result
            .unwrap()
            .into_iter()
            .map(Instrument::from)
            .collect();
        assert_eq!(
            instruments,
            vec![Instrument::new("BTC-1JAN24-40000-C", 1_704_096_000_000)]
        );
    }

    #[test]
    fn trade_page_without_pagination_fields() {
        let body = r#"{"result":{"trades":[{"trade_id":"1","timestamp":1700000000000}]}}"#;
        let envelope: RpcEnvelope<TradePage> = serde_json::from_str(body).unwrap();
        let page = envelope.result.unwrap();
        assert_eq!(page.trades.len(), 1);
        assert_eq!(page.continuation, None);
        assert!(!page.has_more);
    }

    #[test]
    fn error_envelope() {
        let body = r#"{"jsonrpc":"2.0","error":{"message":"Invalid params","code":-32602}}"#;
        let envelope: RpcEnvelope<TradePage> = serde_json::from_str(body).unwrap();
        assert!(envelope.result.is_none());
        let error = envelope.error.unwrap();
        assert_eq!(error.code, -32602);
        assert_eq!(error.message, "Invalid params");
    }
}
