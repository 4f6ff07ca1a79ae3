//! Artifact Publisher
//!
//! Serializes a trade set once and hands the same bytes to a local store and,
//! when configured, a remote store. The local write decides success; the
//! remote upload only ever produces an [`UploadOutcome`].

use std::sync::Arc;

use crate::application::ports::{Artifact, ArtifactStorePort, StorageError};
use crate::domain::trade::TradeSet;

/// What happened to the remote copy.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// Uploaded to the returned location.
    Uploaded {
        /// Remote location (e.g. `gs://bucket/key`).
        location: String,
    },
    /// Upload was attempted and failed.
    Failed {
        /// The storage error.
        error: StorageError,
    },
    /// No remote store is configured.
    Disabled,
}

impl UploadOutcome {
    /// Whether the remote copy was written.
    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// Where the local copy was written.
    pub local_location: String,
    /// Size of the serialized document.
    pub bytes: usize,
    /// Remote upload outcome.
    pub upload: UploadOutcome,
}

/// Publish error.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The trade set could not be serialized.
    #[error("Failed to serialize trades: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The local copy could not be written.
    #[error(transparent)]
    Local(#[from] StorageError),
}

/// Writes snapshot documents to the configured stores.
pub struct ArtifactPublisher {
    local: Arc<dyn ArtifactStorePort>,
    remote: Option<Arc<dyn ArtifactStorePort>>,
}

impl ArtifactPublisher {
    /// Create a publisher with a local store and an optional remote store.
    pub fn new(local: Arc<dyn ArtifactStorePort>, remote: Option<Arc<dyn ArtifactStorePort>>) -> Self {
        Self { local, remote }
    }

    /// Serialize `trades` as indented JSON and store it under `name`.
    ///
    /// # Errors
    ///
    /// Returns `PublishError` if serialization or the local write fails.
    /// Remote failures are reported through [`PublishReport::upload`].
    pub async fn publish(&self, name: &str, trades: &TradeSet) -> Result<PublishReport, PublishError> {
        if trades.is_empty() {
            tracing::warn!(name, "Publishing a snapshot with no instruments");
        }
        let body = serde_json::to_vec_pretty(trades)?;
        let artifact = Artifact::json(name, body);

        let local_location = self.local.put(&artifact).await?;
        tracing::info!(
            location = %local_location,
            instruments = trades.len(),
            bytes = artifact.body.len(),
            "Saved trades locally"
        );

        let upload = match &self.remote {
            None => UploadOutcome::Disabled,
            Some(remote) => match remote.put(&artifact).await {
                Ok(location) => UploadOutcome::Uploaded { location },
                Err(error) => UploadOutcome::Failed { error },
            },
        };

        Ok(PublishReport {
            local_location,
            bytes: artifact.body.len(),
            upload,
        })
    }
}
