//! Deribit-specific error types.

use thiserror::Error;

use crate::application::ports::{CatalogError, TradeHistoryError};

/// Errors from the Deribit adapter.
#[derive(Debug, Error, Clone)]
pub enum DeribitError {
    /// Transport failure (connect, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the raw body.
        message: String,
    },

    /// JSON-RPC error inside a response body.
    #[error("API error: {code} - {message}")]
    Api {
        /// Deribit error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// Body was not the expected JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),
}

impl From<DeribitError> for TradeHistoryError {
    fn from(err: DeribitError) -> Self {
        match err {
            DeribitError::Network(message) => Self::ConnectionError { message },
            DeribitError::Status { status, message } => Self::HttpStatus { status, message },
            DeribitError::Api { .. } | DeribitError::JsonParse(_) => Self::InvalidResponse {
                message: err.to_string(),
            },
        }
    }
}

impl From<DeribitError> for CatalogError {
    fn from(err: DeribitError) -> Self {
        match err {
            DeribitError::Network(message) => Self::ConnectionError { message },
            DeribitError::Status { status, message } => Self::HttpStatus { status, message },
            DeribitError::Api { .. } | DeribitError::JsonParse(_) => Self::InvalidResponse {
                message: err.to_string(),
            },
        }
    }
}
