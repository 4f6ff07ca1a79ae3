//! Prometheus Metrics Module
//!
//! Counters for a snapshot run, rendered in Prometheus text format.
//!
//! # Metrics Categories
//!
//! - **Requests**: Deribit API calls by endpoint and outcome, with latency
//! - **Trades**: Trades received from the history endpoint
//! - **Instruments**: Instruments collected or skipped
//! - **Uploads**: Object store upload outcomes
//!
//! # Integration
//!
//! The job is short-lived, so nothing is scraped. When a textfile path is
//! configured the rendered exposition is written there at exit for the node
//! exporter's textfile collector.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Calling this again returns the handle installed by the first call.
///
/// # Errors
///
/// Returns an error if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Write the current exposition to `path`, creating parent directories.
pub async fn write_textfile(handle: &PrometheusHandle, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, handle.render()).await
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "deribit_snapshot_requests_total",
        "Deribit API requests by endpoint and outcome"
    );
    describe_histogram!(
        "deribit_snapshot_request_duration_seconds",
        "Deribit API request latency"
    );
    describe_counter!(
        "deribit_snapshot_trades_fetched_total",
        "Trades received from the trade history endpoint"
    );
    describe_counter!(
        "deribit_snapshot_instruments_total",
        "Instruments processed by outcome"
    );
    describe_counter!(
        "deribit_snapshot_uploads_total",
        "Object store uploads by outcome"
    );
    describe_gauge!(
        "deribit_snapshot_trades_written",
        "Trades in the last written snapshot"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Metric labels for Deribit endpoints.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    /// Instrument discovery.
    Instruments,
    /// Trade history pages.
    TradeHistory,
}

impl Endpoint {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Instruments => "get_instruments",
            Self::TradeHistory => "get_last_trades_by_instrument_and_time",
        }
    }
}

/// Metric labels for request and instrument outcomes.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// Completed.
    Success,
    /// Failed.
    Failure,
}

impl Outcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Metric labels for upload outcomes.
#[derive(Debug, Clone, Copy)]
pub enum UploadResult {
    /// Stored remotely.
    Uploaded,
    /// Attempted and failed.
    Failed,
    /// Not attempted.
    Disabled,
}

impl UploadResult {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
            Self::Disabled => "disabled",
        }
    }
}

/// Record one Deribit API request.
pub fn record_request(endpoint: Endpoint, outcome: Outcome, duration: Duration) {
    counter!(
        "deribit_snapshot_requests_total",
        "endpoint" => endpoint.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!(
        "deribit_snapshot_request_duration_seconds",
        "endpoint" => endpoint.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Record trades received in one history page.
pub fn record_trades_fetched(count: u64) {
    counter!("deribit_snapshot_trades_fetched_total").increment(count);
}

/// Record instruments collected or skipped.
pub fn record_instruments(outcome: Outcome, count: u64) {
    counter!(
        "deribit_snapshot_instruments_total",
        "outcome" => outcome.as_str()
    )
    .increment(count);
}

/// Record the upload outcome.
pub fn record_upload(result: UploadResult) {
    counter!(
        "deribit_snapshot_uploads_total",
        "outcome" => result.as_str()
    )
    .increment(1);
}

/// Set the number of trades in the written snapshot.
#[allow(clippy::cast_precision_loss)]
pub fn set_trades_written(count: usize) {
    gauge!("deribit_snapshot_trades_written").set(count as f64);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_as_str() {
        assert_eq!(Endpoint::Instruments.as_str(), "get_instruments");
        assert_eq!(
            Endpoint::TradeHistory.as_str(),
            "get_last_trades_by_instrument_and_time"
        );
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(Outcome::Success.as_str(), "success");
        assert_eq!(Outcome::Failure.as_str(), "failure");
        assert_eq!(UploadResult::Uploaded.as_str(), "uploaded");
        assert_eq!(UploadResult::Failed.as_str(), "failed");
        assert_eq!(UploadResult::Disabled.as_str(), "disabled");
    }

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        record_request(Endpoint::TradeHistory, Outcome::Success, Duration::from_millis(5));
        record_trades_fetched(10);
        record_instruments(Outcome::Failure, 1);
        record_upload(UploadResult::Disabled);
        set_trades_written(0);
    }
}
