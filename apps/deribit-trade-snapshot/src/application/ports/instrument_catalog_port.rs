//! Instrument Catalog Port (Driven Port)
//!
//! Interface for listing the venue's active contracts.

use async_trait::async_trait;

use crate::domain::instrument::Instrument;

/// Instrument catalog error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// Request never produced a response.
    #[error("Instrument catalog connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Upstream answered with a non-success status.
    #[error("Instrument catalog request failed with HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Error details from the response body.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Instrument catalog response could not be decoded: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },
}

/// Port for discovering instruments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstrumentCatalogPort: Send + Sync {
    /// List all active instruments for `currency` (e.g. `BTC`) and `kind`
    /// (e.g. `option`).
    async fn list_instruments(&self, currency: &str, kind: &str) -> Result<Vec<Instrument>, CatalogError>;
}
