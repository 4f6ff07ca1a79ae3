//! Application Services
//!
//! - `TradeHistoryCollector`: drains the paginated history for one instrument
//! - `ArtifactPublisher`: writes the finished document to local and remote stores

mod artifact_publisher;
mod trade_history_collector;

pub use artifact_publisher::{ArtifactPublisher, PublishError, PublishReport, UploadOutcome};
pub use trade_history_collector::{
    CollectError, CollectedTrades, CollectorSettings, TradeHistoryCollector,
};
