//! Deribit Public API Adapter
//!
//! Implements `InstrumentCatalogPort` and `TradeHistoryPort` over the
//! unauthenticated Deribit v2 JSON-RPC-over-HTTP endpoints:
//! - `get_instruments` on the main API host
//! - `get_last_trades_by_instrument_and_time` on the history host

mod api_types;
mod catalog;
mod error;
mod history;
mod http_client;

pub use catalog::DeribitInstrumentCatalog;
pub use error::DeribitError;
pub use history::DeribitTradeHistory;
pub use http_client::DeribitHttpClient;
