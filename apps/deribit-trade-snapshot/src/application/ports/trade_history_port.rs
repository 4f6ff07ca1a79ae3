//! Trade History Port (Driven Port)
//!
//! Interface for fetching one page of trades for an instrument.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::pagination::{PageSignals, TradeQuery};
use crate::domain::trade::Trade;

/// One page of trade history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradePage {
    /// Trades on this page, in upstream order.
    #[serde(default)]
    pub trades: Vec<Trade>,
    /// Continuation token for the next page.
    #[serde(default)]
    pub continuation: Option<String>,
    /// Whether more trades exist past this page. `null` reads as `false`.
    #[serde(default, deserialize_with = "null_as_false")]
    pub has_more: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<bool>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl TradePage {
    /// Pagination-relevant view of the page.
    #[must_use]
    pub fn signals(&self) -> PageSignals<'_> {
        PageSignals {
            trade_count: self.trades.len(),
            continuation: self.continuation.as_deref(),
            has_more: self.has_more,
            last_timestamp: self.trades.last().and_then(Trade::timestamp_ms),
        }
    }
}

/// Trade history error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TradeHistoryError {
    /// Request never produced a response.
    #[error("Trade history connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Upstream answered with a non-success status.
    #[error("Trade history request failed with HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Error details from the response body.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Trade history response could not be decoded: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },
}

/// Port for paging through an instrument's trade history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeHistoryPort: Send + Sync {
    /// Fetch the page described by `query`.
    async fn fetch_page(&self, query: &TradeQuery) -> Result<TradePage, TradeHistoryError>;
}
