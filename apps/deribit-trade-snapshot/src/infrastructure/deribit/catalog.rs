//! Instrument discovery through `public/get_instruments`.

use async_trait::async_trait;

use super::api_types::InstrumentRecord;
use super::http_client::DeribitHttpClient;
use crate::application::ports::{CatalogError, InstrumentCatalogPort};
use crate::domain::instrument::Instrument;
use crate::infrastructure::metrics::Endpoint;

const GET_INSTRUMENTS_PATH: &str = "/api/v2/public/get_instruments";

/// Deribit implementation of [`InstrumentCatalogPort`].
#[derive(Debug, Clone)]
pub struct DeribitInstrumentCatalog {
    http: DeribitHttpClient,
    url: String,
}

impl DeribitInstrumentCatalog {
    /// Create a catalog against `api_host` (scheme and host, no trailing path).
    #[must_use]
    pub fn new(http: DeribitHttpClient, api_host: &str) -> Self {
        Self {
            http,
            url: format!("{}{GET_INSTRUMENTS_PATH}", api_host.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl InstrumentCatalogPort for DeribitInstrumentCatalog {
    async fn list_instruments(&self, currency: &str, kind: &str) -> Result<Vec<Instrument>, CatalogError> {
        let records: Vec<InstrumentRecord> = self
            .http
            .get_result(
                Endpoint::Instruments,
                &self.url,
                &[("currency", currency.to_string()), ("kind", kind.to_string())],
            )
            .await?;

        tracing::debug!(currency, kind, count = records.len(), "Listed instruments");
        Ok(records.into_iter().map(Instrument::from).collect())
    }
}
