//! Application Ports (Driven)
//!
//! Ports define how the snapshot uses external systems:
//!
//! - `InstrumentCatalogPort`: lists the venue's active contracts
//! - `TradeHistoryPort`: serves one page of trades per request
//! - `ArtifactStorePort`: stores a finished JSON document

mod artifact_store_port;
mod instrument_catalog_port;
mod trade_history_port;

pub use artifact_store_port::{Artifact, ArtifactStorePort, JSON_CONTENT_TYPE, StorageError};
pub use instrument_catalog_port::{CatalogError, InstrumentCatalogPort};
pub use trade_history_port::{TradeHistoryError, TradeHistoryPort, TradePage};

#[cfg(test)]
pub use artifact_store_port::MockArtifactStorePort;
#[cfg(test)]
pub use instrument_catalog_port::MockInstrumentCatalogPort;
#[cfg(test)]
pub use trade_history_port::MockTradeHistoryPort;
