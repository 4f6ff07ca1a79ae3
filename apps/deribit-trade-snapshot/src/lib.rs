#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::significant_drop_tightening,
        clippy::items_after_statements,
        clippy::cast_possible_truncation
    )
)]

//! Deribit Trade Snapshot - Near-Expiry Options Trade History
//!
//! A one-shot batch job that lists Deribit option instruments, keeps those
//! expiring within a horizon, drains each one's trade history over a
//! lookback window through the paginated history API, rewrites trade
//! timestamps as ISO-8601 strings and publishes the result as one JSON
//! document.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure data types and rules
//!   - `instrument`: Instruments and expiry-window selection
//!   - `time_window`: Trade history query windows
//!   - `pagination`: Cursor state machine for paginated history
//!   - `trade`: Opaque trade records, ordered trade sets, normalization
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Instrument catalog, trade history and artifact store
//!   - `services`: Trade history collector, artifact publisher
//!   - `use_cases`: Snapshot trades
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `deribit`: HTTP adapters for the Deribit public API
//!   - `storage`: Local file and GCS object store
//!   - `config`: Configuration and dependency injection
//!   - `metrics`, `telemetry`: Prometheus counters, tracing and OTLP
//!
//! # Data Flow
//!
//! ```text
//! get_instruments ──► expiry filter ──► per instrument:
//!                                         get_last_trades_by_instrument_and_time
//!                                         (token / has_more pagination)
//!                                               │
//!                      normalize timestamps ◄───┘
//!                               │
//!                     ┌─────────┴─────────┐
//!                local JSON file     gs://bucket/folder/
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::instrument::{ExpiryWindow, Instrument, select_candidates};
pub use domain::pagination::{PaginationState, Paginator, StopReason, TradeQuery};
pub use domain::time_window::TimeWindow;
pub use domain::trade::{Trade, TradeSet, format_epoch_millis, normalize_trade, normalize_trade_set};

// Use cases
pub use application::use_cases::{
    FailurePolicy, InstrumentFailure, InstrumentSummary, SnapshotError, SnapshotReport,
    SnapshotRequest, SnapshotTradesUseCase,
};
pub use application::services::{PublishReport, UploadOutcome};

// Infrastructure config
pub use infrastructure::config::{ConfigError, Container, SnapshotConfig};

// Metrics
pub use infrastructure::metrics::{init_metrics, write_textfile};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
