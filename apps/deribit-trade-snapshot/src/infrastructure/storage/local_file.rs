//! Local file artifact store.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::application::ports::{Artifact, ArtifactStorePort, StorageError};

/// Writes every artifact to one fixed path, replacing previous contents.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    /// Create a store writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, err: &std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ArtifactStorePort for LocalFileStore {
    async fn put(&self, artifact: &Artifact) -> Result<String, StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(&e))?;
        }
        tokio::fs::write(&self.path, &artifact.body)
            .await
            .map_err(|e| self.io_error(&e))?;

        Ok(self.path.display().to_string())
    }
}
