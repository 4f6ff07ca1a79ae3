//! Artifact Storage Adapters
//!
//! Implementations of `ArtifactStorePort`: a local JSON file and a Google
//! Cloud Storage bucket reached through its S3-compatible XML API.

mod local_file;
mod object_store;

pub use local_file::LocalFileStore;
pub use object_store::{GcsObjectStore, object_key};
