//! Snapshot Trades Use Case
//!
//! Lists instruments, keeps the near-expiry ones, drains each one's trade
//! history over the lookback window, normalizes timestamps and publishes the
//! resulting document.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::ports::{CatalogError, InstrumentCatalogPort, TradeHistoryPort};
use crate::application::services::{
    ArtifactPublisher, CollectError, PublishError, PublishReport, TradeHistoryCollector,
};
use crate::domain::instrument::{ExpiryWindow, select_candidates};
use crate::domain::pagination::StopReason;
use crate::domain::time_window::TimeWindow;
use crate::domain::trade::{TradeSet, normalize_trade_set};

/// What to do when one instrument's history cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole run on the first failure.
    #[default]
    Abort,
    /// Skip the failing instrument and keep going.
    Isolate,
}

impl FailurePolicy {
    /// Parse a policy name, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Some(Self::Abort),
            "isolate" => Some(Self::Isolate),
            _ => None,
        }
    }

    /// Policy name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Isolate => "isolate",
        }
    }
}

/// Parameters of one snapshot run.
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    /// Underlying currency (e.g. `BTC`).
    pub currency: String,
    /// Contract kind (e.g. `option`).
    pub kind: String,
    /// Reference instant for both windows.
    pub now: DateTime<Utc>,
    /// Trade history lookback.
    pub lookback_days: u32,
    /// Expiry selection horizon.
    pub expiry_horizon_days: u32,
    /// Per-instrument failure handling.
    pub failure_policy: FailurePolicy,
}

impl SnapshotRequest {
    /// Document name, `{currency}_{kind}_trades.json`.
    #[must_use]
    pub fn artifact_name(&self) -> String {
        format!("{}_{}_trades.json", self.currency, self.kind)
    }
}

/// Per-instrument collection summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSummary {
    /// Instrument name.
    pub instrument: String,
    /// Trades collected.
    pub trades: usize,
    /// Requests issued.
    pub requests: u32,
    /// Why pagination stopped.
    pub stop_reason: StopReason,
}

/// An instrument skipped under [`FailurePolicy::Isolate`].
#[derive(Debug, Clone)]
pub struct InstrumentFailure {
    /// Instrument name.
    pub instrument: String,
    /// The collection error.
    pub error: CollectError,
}

/// Outcome of a snapshot run.
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    /// Instruments listed by the catalog.
    pub listed: usize,
    /// Instruments inside the expiry window.
    pub candidates: usize,
    /// Trade history window used for every instrument.
    pub window: TimeWindow,
    /// Successfully collected instruments, in fetch order.
    pub instruments: Vec<InstrumentSummary>,
    /// Instruments that failed (isolate policy only).
    pub failures: Vec<InstrumentFailure>,
    /// Total trades written.
    pub total_trades: usize,
    /// Local write and upload result.
    pub publish: PublishReport,
}

/// Snapshot error.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Instrument discovery failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An instrument's history failed under the abort policy.
    #[error(transparent)]
    Collect(#[from] CollectError),

    /// The document could not be written locally.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Use case for producing one trade snapshot.
pub struct SnapshotTradesUseCase<C, H>
where
    C: InstrumentCatalogPort,
    H: TradeHistoryPort,
{
    catalog: Arc<C>,
    collector: TradeHistoryCollector<H>,
    publisher: ArtifactPublisher,
}

impl<C, H> SnapshotTradesUseCase<C, H>
where
    C: InstrumentCatalogPort,
    H: TradeHistoryPort,
{
    /// Create a new SnapshotTradesUseCase.
    pub const fn new(catalog: Arc<C>, collector: TradeHistoryCollector<H>, publisher: ArtifactPublisher) -> Self {
        Self {
            catalog,
            collector,
            publisher,
        }
    }

    /// Run the snapshot.
    pub async fn execute(&self, request: &SnapshotRequest) -> Result<SnapshotReport, SnapshotError> {
        // 1. Discover instruments
        let instruments = self
            .catalog
            .list_instruments(&request.currency, &request.kind)
            .await?;
        let listed = instruments.len();

        // 2. Keep the near-expiry ones
        let expiry = ExpiryWindow::from_now(request.now, request.expiry_horizon_days);
        let candidates = select_candidates(instruments, &expiry);
        tracing::info!(
            listed,
            candidates = candidates.len(),
            currency = %request.currency,
            kind = %request.kind,
            expiring_by = %expiry.end().date_naive(),
            "Found instruments expiring within horizon"
        );

        // 3. Drain each instrument over the lookback window
        let window = TimeWindow::lookback(request.now, request.lookback_days);
        let mut trade_set = TradeSet::new();
        let mut summaries = Vec::with_capacity(candidates.len());
        let mut failures = Vec::new();

        for instrument in &candidates {
            tracing::info!(instrument = %instrument.name, "Fetching trades");
            match self.collector.collect(&instrument.name, window).await {
                Ok(collected) => {
                    tracing::info!(
                        instrument = %instrument.name,
                        trades = collected.trades.len(),
                        requests = collected.requests,
                        "Collected trades"
                    );
                    summaries.push(InstrumentSummary {
                        instrument: instrument.name.clone(),
                        trades: collected.trades.len(),
                        requests: collected.requests,
                        stop_reason: collected.stop_reason,
                    });
                    trade_set.insert(instrument.name.clone(), collected.trades);
                }
                Err(error) => match request.failure_policy {
                    FailurePolicy::Abort => return Err(error.into()),
                    FailurePolicy::Isolate => {
                        tracing::warn!(
                            instrument = %instrument.name,
                            error = %error,
                            "Skipping instrument after fetch failure"
                        );
                        failures.push(InstrumentFailure {
                            instrument: instrument.name.clone(),
                            error,
                        });
                    }
                },
            }
        }

        // 4. Normalize timestamps and publish
        let normalized = normalize_trade_set(&trade_set);
        let total_trades = normalized.total_trades();
        let publish = self
            .publisher
            .publish(&request.artifact_name(), &normalized)
            .await?;

        Ok(SnapshotReport {
            listed,
            candidates: candidates.len(),
            window,
            instruments: summaries,
            failures,
            total_trades,
            publish,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use serde_json::{Value, json};

    use super::*;
    use crate::application::ports::{
        Artifact, ArtifactStorePort, MockInstrumentCatalogPort, MockTradeHistoryPort,
        StorageError, TradeHistoryError, TradePage,
    };
    use crate::application::services::CollectorSettings;
    use crate::domain::instrument::Instrument;
    use crate::domain::trade::Trade;

    const DAY_MS: i64 = 86_400_000;

    /// Captures stored artifacts in memory.
    #[derive(Default)]
    struct MemoryStore {
        stored: Mutex<Vec<Artifact>>,
    }

    impl MemoryStore {
        fn document(&self) -> Value {
            let stored = self.stored.lock().unwrap();
            serde_json::from_slice(&stored.last().unwrap().body).unwrap()
        }
    }

    #[async_trait::async_trait]
    impl ArtifactStorePort for MemoryStore {
        async fn put(&self, artifact: &Artifact) -> Result<String, StorageError> {
            self.stored.lock().unwrap().push(artifact.clone());
            Ok(format!("memory://{}", artifact.name))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
    }

    fn request(policy: FailurePolicy) -> SnapshotRequest {
        SnapshotRequest {
            currency: "BTC".to_string(),
            kind: "option".to_string(),
            now: now(),
            lookback_days: 7,
            expiry_horizon_days: 30,
            failure_policy: policy,
        }
    }

    fn catalog() -> MockInstrumentCatalogPort {
        let now_ms = now().timestamp_millis();
        let mut catalog = MockInstrumentCatalogPort::new();
        catalog
            .expect_list_instruments()
            .withf(|currency, kind| currency == "BTC" && kind == "option")
            .times(1)
            .returning(move |_, _| {
                Ok(vec![
                    Instrument::new("BTC-15NOV23-36000-C", now_ms + DAY_MS),
                    Instrument::new("BTC-13DEC23-36000-C", now_ms + 29 * DAY_MS),
                    Instrument::new("BTC-29DEC23-36000-C", now_ms + 45 * DAY_MS),
                ])
            });
        catalog
    }

    fn use_case(
        history: MockTradeHistoryPort,
        store: Arc<MemoryStore>,
    ) -> SnapshotTradesUseCase<MockInstrumentCatalogPort, MockTradeHistoryPort> {
        let settings = CollectorSettings {
            page_delay: std::time::Duration::ZERO,
            ..CollectorSettings::default()
        };
        SnapshotTradesUseCase::new(
            Arc::new(catalog()),
            TradeHistoryCollector::new(Arc::new(history), settings),
            ArtifactPublisher::new(store, None),
        )
    }

    fn single_trade_page(ts: i64) -> TradePage {
        TradePage {
            trades: vec![Trade::new(json!({ "timestamp": ts, "price": 0.05 }))],
            continuation: None,
            has_more: false,
        }
    }

    #[tokio::test]
    async fn snapshots_only_candidates_with_normalized_timestamps() {
        let mut history = MockTradeHistoryPort::new();
        history
            .expect_fetch_page()
            .times(2)
            .returning(|_| Ok(single_trade_page(1_700_000_000_000)));
        let store = Arc::new(MemoryStore::default());

        let report = use_case(history, Arc::clone(&store))
            .execute(&request(FailurePolicy::Abort))
            .await
            .unwrap();

        assert_eq!(report.listed, 3);
        assert_eq!(report.candidates, 2);
        assert_eq!(report.total_trades, 2);
        assert_eq!(report.window.end_ms - report.window.start_ms, 7 * DAY_MS);
        assert_eq!(report.publish.local_location, "memory://BTC_option_trades.json");

        let document = store.document();
        let object = document.as_object().unwrap();
        let names: Vec<_> = object.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["BTC-15NOV23-36000-C", "BTC-13DEC23-36000-C"]);
        assert_eq!(
            document["BTC-15NOV23-36000-C"][0]["timestamp"],
            json!("2023-11-14T22:13:20Z")
        );
    }

    #[tokio::test]
    async fn abort_policy_stops_on_first_failure() {
        let mut history = MockTradeHistoryPort::new();
        history.expect_fetch_page().times(1).returning(|_| {
            Err(TradeHistoryError::HttpStatus {
                status: 400,
                message: "invalid instrument".to_string(),
            })
        });
        let store = Arc::new(MemoryStore::default());

        let err = use_case(history, Arc::clone(&store))
            .execute(&request(FailurePolicy::Abort))
            .await
            .unwrap_err();

        assert!(matches!(err, SnapshotError::Collect(_)));
        assert!(store.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn isolate_policy_skips_failed_instrument() {
        let mut history = MockTradeHistoryPort::new();
        history
            .expect_fetch_page()
            .withf(|query| query.instrument_name == "BTC-15NOV23-36000-C")
            .times(1)
            .returning(|_| {
                Err(TradeHistoryError::ConnectionError {
                    message: "connection reset".to_string(),
                })
            });
        history
            .expect_fetch_page()
            .withf(|query| query.instrument_name == "BTC-13DEC23-36000-C")
            .times(1)
            .returning(|_| Ok(single_trade_page(1_700_000_000_000)));
        let store = Arc::new(MemoryStore::default());

        let report = use_case(history, Arc::clone(&store))
            .execute(&request(FailurePolicy::Isolate))
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].instrument, "BTC-15NOV23-36000-C");
        assert_eq!(report.instruments.len(), 1);
        let document = store.document();
        assert!(document.get("BTC-15NOV23-36000-C").is_none());
        assert!(document.get("BTC-13DEC23-36000-C").is_some());
    }

    #[tokio::test]
    async fn catalog_failure_is_fatal() {
        let mut catalog = MockInstrumentCatalogPort::new();
        catalog.expect_list_instruments().returning(|_, _| {
            Err(CatalogError::HttpStatus {
                status: 503,
                message: "maintenance".to_string(),
            })
        });
        let use_case = SnapshotTradesUseCase::new(
            Arc::new(catalog),
            TradeHistoryCollector::new(
                Arc::new(MockTradeHistoryPort::new()),
                CollectorSettings::default(),
            ),
            ArtifactPublisher::new(Arc::new(MemoryStore::default()), None),
        );

        let err = use_case
            .execute(&request(FailurePolicy::Abort))
            .await
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Catalog(_)));
    }

    #[test]
    fn failure_policy_parsing() {
        assert_eq!(FailurePolicy::parse("abort"), Some(FailurePolicy::Abort));
        assert_eq!(FailurePolicy::parse(" ISOLATE "), Some(FailurePolicy::Isolate));
        assert_eq!(FailurePolicy::parse("retry"), None);
        assert_eq!(FailurePolicy::default(), FailurePolicy::Abort);
    }

    #[test]
    fn artifact_name_uses_currency_and_kind() {
        assert_eq!(
            request(FailurePolicy::Abort).artifact_name(),
            "BTC_option_trades.json"
        );
    }
}
