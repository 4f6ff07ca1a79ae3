//! Dependency Injection Container
//!
//! Builds the Deribit and storage adapters from configuration and hands out
//! ready-to-run use cases.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::settings::SnapshotConfig;
use crate::application::ports::ArtifactStorePort;
use crate::application::services::{ArtifactPublisher, TradeHistoryCollector};
use crate::application::use_cases::{SnapshotRequest, SnapshotTradesUseCase};
use crate::infrastructure::deribit::{
    DeribitError, DeribitHttpClient, DeribitInstrumentCatalog, DeribitTradeHistory,
};
use crate::infrastructure::storage::{GcsObjectStore, LocalFileStore};

/// Snapshot use case over the Deribit adapters.
pub type DeribitSnapshotUseCase = SnapshotTradesUseCase<DeribitInstrumentCatalog, DeribitTradeHistory>;

/// Dependency injection container.
pub struct Container {
    config: SnapshotConfig,
    catalog: Arc<DeribitInstrumentCatalog>,
    history: Arc<DeribitTradeHistory>,
    local_store: Arc<dyn ArtifactStorePort>,
    remote_store: Option<Arc<dyn ArtifactStorePort>>,
}

impl Container {
    /// Wire every adapter from `config`.
    ///
    /// The remote store is only built when uploads are enabled and HMAC
    /// credentials are present.
    pub fn from_config(config: SnapshotConfig) -> Result<Self, DeribitError> {
        let http = DeribitHttpClient::new(config.deribit.http_timeout)?;
        let catalog = Arc::new(DeribitInstrumentCatalog::new(http.clone(), &config.deribit.api_host));
        let history = Arc::new(DeribitTradeHistory::new(http, &config.deribit.history_host));

        let local_store: Arc<dyn ArtifactStorePort> =
            Arc::new(LocalFileStore::new(config.output.output_file.clone()));
        let remote_store = config.upload.active_credentials().map(|credentials| {
            Arc::new(GcsObjectStore::new(&config.upload, credentials)) as Arc<dyn ArtifactStorePort>
        });

        Ok(Self {
            config,
            catalog,
            history,
            local_store,
            remote_store,
        })
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Whether a remote store is wired.
    #[must_use]
    pub const fn upload_configured(&self) -> bool {
        self.remote_store.is_some()
    }

    /// Create a `SnapshotTradesUseCase`.
    #[must_use]
    pub fn snapshot_use_case(&self) -> DeribitSnapshotUseCase {
        SnapshotTradesUseCase::new(
            Arc::clone(&self.catalog),
            TradeHistoryCollector::new(Arc::clone(&self.history), self.config.collector_settings()),
            ArtifactPublisher::new(Arc::clone(&self.local_store), self.remote_store.clone()),
        )
    }

    /// Build the request for a run anchored at `now`.
    #[must_use]
    pub fn snapshot_request(&self, now: DateTime<Utc>) -> SnapshotRequest {
        let collection = &self.config.collection;
        SnapshotRequest {
            currency: collection.currency.clone(),
            kind: collection.kind.clone(),
            now,
            lookback_days: collection.lookback_days,
            expiry_horizon_days: collection.expiry_horizon_days,
            failure_policy: collection.failure_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::infrastructure::config::HmacCredentials;

    #[test]
    fn upload_requires_credentials() {
        let container = Container::from_config(SnapshotConfig::default()).unwrap();
        assert!(!container.upload_configured());
    }

    #[tokio::test]
    async fn upload_wired_when_credentials_present() {
        let mut config = SnapshotConfig::default();
        config.upload.credentials = Some(HmacCredentials::new("id".to_string(), "secret".to_string()));
        let container = Container::from_config(config).unwrap();
        assert!(container.upload_configured());
    }

    #[test]
    fn request_mirrors_collection_settings() {
        let mut config = SnapshotConfig::default();
        config.collection.currency = "ETH".to_string();
        config.collection.lookback_days = 3;
        let container = Container::from_config(config).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let request = container.snapshot_request(now);

        assert_eq!(request.currency, "ETH");
        assert_eq!(request.kind, "option");
        assert_eq!(request.lookback_days, 3);
        assert_eq!(request.expiry_horizon_days, 30);
        assert_eq!(request.now, now);
        assert_eq!(request.artifact_name(), "ETH_option_trades.json");
    }
}
