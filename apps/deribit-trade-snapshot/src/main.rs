//! Deribit Trade Snapshot Binary
//!
//! Runs one snapshot and exits.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin deribit-trade-snapshot
//! ```
//!
//! # Environment Variables
//!
//! ## Collection
//! - `SNAPSHOT_CURRENCY`: Underlying currency (default: BTC)
//! - `SNAPSHOT_KIND`: Instrument kind (default: option)
//! - `SNAPSHOT_LOOKBACK_DAYS`: Trade history lookback (default: 7)
//! - `SNAPSHOT_EXPIRY_HORIZON_DAYS`: Expiry selection horizon (default: 30)
//! - `SNAPSHOT_PAGE_SIZE`: Trades per page, 1..=1000 (default: 1000)
//! - `SNAPSHOT_PAGE_DELAY_MS`: Pause between pages (default: 100)
//! - `SNAPSHOT_MAX_PAGES`: Page cap per instrument, 0 = unlimited (default: 0)
//! - `SNAPSHOT_FAILURE_POLICY`: abort | isolate (default: abort)
//! - `DERIBIT_API_HOST`, `DERIBIT_HISTORY_HOST`, `SNAPSHOT_HTTP_TIMEOUT_SECS`
//!
//! ## Output
//! - `SNAPSHOT_OUTPUT_FILE`: Local JSON path (default: all_trades.json)
//! - `SNAPSHOT_METRICS_FILE`: Prometheus textfile path (default: unset)
//! - `SNAPSHOT_UPLOAD_ENABLED`: Upload switch (default: true)
//! - `GCS_BUCKET`, `GCS_FOLDER`, `GCS_ENDPOINT`, `GCS_REGION`
//! - `GCS_HMAC_ACCESS_KEY_ID`, `GCS_HMAC_SECRET`: Upload is skipped without them
//!
//! ## Telemetry
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`, `OTEL_SERVICE_NAME`
//! - `RUST_LOG`: Log level (default: info)

use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use deribit_trade_snapshot::application::services::UploadOutcome;
use deribit_trade_snapshot::infrastructure::metrics::{self, Outcome, UploadResult};
use deribit_trade_snapshot::infrastructure::telemetry;
use deribit_trade_snapshot::{
    Container, SnapshotConfig, SnapshotError, SnapshotReport, init_metrics, write_textfile,
};
use tracing::Instrument;
use uuid::Uuid;

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();

    // Initialize telemetry (tracing + optional OpenTelemetry)
    let _telemetry_guard = telemetry::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Snapshot failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let metrics_handle = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics recorder unavailable");
            None
        }
    };

    let config = SnapshotConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let container = Container::from_config(config).context("failed to build HTTP client")?;
    if !container.upload_configured() {
        tracing::info!("Upload disabled or GCS HMAC credentials not set; writing local file only");
    }

    let run_id = Uuid::new_v4();
    let request = container.snapshot_request(Utc::now());
    let span = tracing::info_span!(
        "snapshot",
        %run_id,
        currency = %request.currency,
        kind = %request.kind
    );

    let result = container
        .snapshot_use_case()
        .execute(&request)
        .instrument(span)
        .await;

    match &result {
        Ok(report) => record_report(report),
        Err(SnapshotError::Collect(error)) => {
            tracing::error!(instrument = %error.instrument, page = error.page, "Aborting on trade history failure");
            metrics::record_instruments(Outcome::Failure, 1);
        }
        Err(_) => {}
    }

    if let (Some(handle), Some(path)) = (&metrics_handle, &container.config().output.metrics_file)
        && let Err(e) = write_textfile(handle, path).await
    {
        tracing::warn!(error = %e, path = %path.display(), "Failed to write metrics textfile");
    }

    result.map(|_| ()).context("snapshot run failed")
}

/// Record metrics and log the outcome of a completed run.
fn record_report(report: &SnapshotReport) {
    metrics::record_instruments(Outcome::Success, report.instruments.len() as u64);
    metrics::record_instruments(Outcome::Failure, report.failures.len() as u64);
    metrics::set_trades_written(report.total_trades);

    for failure in &report.failures {
        tracing::warn!(instrument = %failure.instrument, error = %failure.error, "Instrument skipped");
    }

    match &report.publish.upload {
        UploadOutcome::Uploaded { location } => {
            metrics::record_upload(UploadResult::Uploaded);
            tracing::info!(%location, "Uploaded trades");
        }
        UploadOutcome::Failed { error } => {
            metrics::record_upload(UploadResult::Failed);
            tracing::error!(error = %error, "Upload failed; local file kept");
        }
        UploadOutcome::Disabled => metrics::record_upload(UploadResult::Disabled),
    }

    tracing::info!(
        candidates = report.candidates,
        instruments = report.instruments.len(),
        failed = report.failures.len(),
        trades = report.total_trades,
        file = %report.publish.local_location,
        "Saved trades"
    );
}

/// Log the parsed configuration.
fn log_config(config: &SnapshotConfig) {
    tracing::info!(
        currency = %config.collection.currency,
        kind = %config.collection.kind,
        lookback_days = config.collection.lookback_days,
        expiry_horizon_days = config.collection.expiry_horizon_days,
        failure_policy = config.collection.failure_policy.as_str(),
        output_file = %config.output.output_file.display(),
        "Configuration loaded"
    );
    tracing::debug!(
        api_host = %config.deribit.api_host,
        history_host = %config.deribit.history_host,
        page_size = config.collection.page_size,
        page_delay_ms = config.collection.page_delay.as_millis(),
        max_pages = config.collection.max_pages,
        bucket = %config.upload.bucket,
        folder = %config.upload.folder,
        "Endpoints and pagination"
    );
}

/// Load .env from the current directory or the nearest ancestor that has one.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
