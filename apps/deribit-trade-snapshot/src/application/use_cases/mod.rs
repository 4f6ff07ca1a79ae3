//! Use Cases

mod snapshot_trades;

pub use snapshot_trades::{
    FailurePolicy, InstrumentFailure, InstrumentSummary, SnapshotError, SnapshotReport,
    SnapshotRequest, SnapshotTradesUseCase,
};
