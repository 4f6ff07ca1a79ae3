//! Trade History Collector
//!
//! Drains the paginated trade history endpoint for one instrument into a
//! complete trade list. Requests are strictly sequential and separated by a
//! fixed delay; no delay follows the final page.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{TradeHistoryError, TradeHistoryPort};
use crate::domain::pagination::{PaginationState, Paginator, StopReason};
use crate::domain::time_window::TimeWindow;
use crate::domain::trade::Trade;

/// Collector tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorSettings {
    /// Trades requested per page.
    pub page_size: u32,
    /// Pause between consecutive page requests.
    pub page_delay: Duration,
    /// Maximum pages per instrument (0 = unlimited).
    pub max_pages: u32,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            page_size: 1000,
            page_delay: Duration::from_millis(100),
            max_pages: 0,
        }
    }
}

/// Result of draining one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedTrades {
    /// All trades, in fetch order.
    pub trades: Vec<Trade>,
    /// Number of requests issued.
    pub requests: u32,
    /// Why the loop stopped.
    pub stop_reason: StopReason,
}

/// A page request failed; nothing collected for the instrument is kept.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to fetch page {page} of trade history for {instrument}: {source}")]
pub struct CollectError {
    /// Instrument being collected.
    pub instrument: String,
    /// 1-based number of the failing request.
    pub page: u32,
    /// Underlying port error.
    #[source]
    pub source: TradeHistoryError,
}

/// Collects complete trade histories through a [`TradeHistoryPort`].
pub struct TradeHistoryCollector<H>
where
    H: TradeHistoryPort,
{
    history: Arc<H>,
    settings: CollectorSettings,
}

impl<H> TradeHistoryCollector<H>
where
    H: TradeHistoryPort,
{
    /// Create a new collector.
    pub const fn new(history: Arc<H>, settings: CollectorSettings) -> Self {
        Self { history, settings }
    }

    /// Fetch every trade for `instrument` inside `window`.
    ///
    /// # Errors
    ///
    /// Returns `CollectError` on the first failing request.
    #[tracing::instrument(skip(self, window), fields(start = window.start_ms, end = window.end_ms))]
    pub async fn collect(&self, instrument: &str, window: TimeWindow) -> Result<CollectedTrades, CollectError> {
        let mut paginator = Paginator::new(
            instrument,
            window,
            self.settings.page_size,
            self.settings.max_pages,
        );
        let mut trades = Vec::new();

        while let Some(query) = paginator.next_query() {
            let page = match self.history.fetch_page(&query).await {
                Ok(page) => page,
                Err(source) => {
                    paginator.fail(source.to_string());
                    return Err(CollectError {
                        instrument: instrument.to_string(),
                        page: paginator.pages() + 1,
                        source,
                    });
                }
            };

            let state = paginator.record_page(page.signals()).clone();
            tracing::debug!(
                page = paginator.pages(),
                trades = page.trades.len(),
                continuation = page.continuation.as_deref(),
                has_more = page.has_more,
                cursor = ?paginator.cursor(),
                "Trade page received"
            );
            trades.extend(page.trades);

            match state {
                PaginationState::TokenContinue(_) | PaginationState::TimestampContinue(_) => {
                    if !self.settings.page_delay.is_zero() {
                        tokio::time::sleep(self.settings.page_delay).await;
                    }
                }
                PaginationState::Done(reason) if !reason.is_clean() => {
                    tracing::warn!(
                        reason = reason.as_str(),
                        pages = paginator.pages(),
                        "Trade history pagination stopped early"
                    );
                }
                PaginationState::Fetching | PaginationState::Done(_) | PaginationState::Failed(_) => {}
            }
        }

        let stop_reason = match paginator.state() {
            PaginationState::Done(reason) => *reason,
            _ => StopReason::Exhausted,
        };

        Ok(CollectedTrades {
            trades,
            requests: paginator.pages(),
            stop_reason,
        })
    }
}
