//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Deribit public API adapters (instrument catalog, trade history).
pub mod deribit;

/// Artifact stores (local file, Google Cloud Storage).
pub mod storage;

/// Configuration and dependency injection.
pub mod config;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Logging and OpenTelemetry tracing integration.
pub mod telemetry;
