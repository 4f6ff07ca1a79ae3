//! Artifact Store Port (Driven Port)
//!
//! Interface for persisting a finished snapshot document.

use async_trait::async_trait;

/// Content type of snapshot documents.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A serialized document ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name of the document (e.g. `BTC_option_trades.json`).
    pub name: String,
    /// MIME content type.
    pub content_type: String,
    /// Document bytes.
    pub body: Vec<u8>,
}

impl Artifact {
    /// Create a JSON artifact.
    #[must_use]
    pub fn json(name: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            body,
        }
    }
}

/// Storage error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// Local filesystem write failed.
    #[error("Failed to write '{path}': {message}")]
    Io {
        /// Target path.
        path: String,
        /// Error details.
        message: String,
    },

    /// Object store upload failed.
    #[error("Failed to upload gs://{bucket}/{key}: {message}")]
    Upload {
        /// Target bucket.
        bucket: String,
        /// Target object key.
        key: String,
        /// Error details.
        message: String,
    },
}

/// Port for storing artifacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    /// Store the artifact and return where it landed.
    async fn put(&self, artifact: &Artifact) -> Result<String, StorageError>;
}
