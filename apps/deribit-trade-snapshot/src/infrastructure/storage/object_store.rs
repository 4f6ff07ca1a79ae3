//! Google Cloud Storage artifact store.
//!
//! GCS exposes an S3-compatible XML API that accepts HMAC keys, so uploads go
//! through `aws-sdk-s3` with path-style addressing against
//! `storage.googleapis.com`. Request checksums are only sent when an
//! operation requires them; GCS rejects the SDK's default trailing checksums.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::application::ports::{Artifact, ArtifactStorePort, StorageError};
use crate::infrastructure::config::{HmacCredentials, UploadSettings};

/// Object key for `name` under `folder`.
///
/// An empty folder yields the bare name; no leading slash is ever produced.
#[must_use]
pub fn object_key(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}

/// Uploads artifacts to `gs://{bucket}/{folder}/{name}`.
#[derive(Debug, Clone)]
pub struct GcsObjectStore {
    client: Client,
    bucket: String,
    folder: String,
}

impl GcsObjectStore {
    /// Build a store from upload settings and HMAC credentials.
    #[must_use]
    pub fn new(settings: &UploadSettings, credentials: &HmacCredentials) -> Self {
        let credentials = Credentials::new(
            credentials.access_key_id(),
            credentials.secret(),
            None,
            None,
            "gcs-hmac",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .endpoint_url(settings.endpoint.clone())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .behavior_version(BehaviorVersion::latest())
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
            folder: settings.folder.clone(),
        }
    }
}

#[async_trait]
impl ArtifactStorePort for GcsObjectStore {
    async fn put(&self, artifact: &Artifact) -> Result<String, StorageError> {
        let key = object_key(&self.folder, &artifact.name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&artifact.content_type)
            .body(ByteStream::from(artifact.body.clone()))
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                bucket: self.bucket.clone(),
                key: key.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(format!("gs://{}/{key}", self.bucket))
    }
}
