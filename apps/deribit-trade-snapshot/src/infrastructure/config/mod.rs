//! Configuration Module
//!
//! Environment-driven configuration and dependency wiring for the snapshot job.

mod container;
mod settings;

pub use container::{Container, DeribitSnapshotUseCase};
pub use settings::{
    CollectionSettings, ConfigError, DeribitSettings, HmacCredentials, OutputSettings,
    SnapshotConfig, UploadSettings,
};
