//! Domain Layer - Instruments, trades and pagination rules.
//!
//! Pure types with no I/O. Everything here is deterministic given its
//! inputs (including the `now` instant), which keeps the rules testable
//! without a network.

/// Option contracts and the expiry window used to select them.
pub mod instrument;

/// Trade history pagination cursor and state machine.
pub mod pagination;

/// Fixed lookback window for trade history requests.
pub mod time_window;

/// Opaque trade records, trade sets and timestamp normalization.
pub mod trade;
