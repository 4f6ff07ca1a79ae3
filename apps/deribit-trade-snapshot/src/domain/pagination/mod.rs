//! Trade History Pagination
//!
//! The trade history endpoint pages results in one of two ways:
//!
//! - an opaque `continuation` token, echoed back verbatim on the next request;
//! - a `has_more` flag, resumed by moving the window start to the last
//!   trade's timestamp + 1 ms.
//!
//! A token always wins over `has_more`. The [`Paginator`] makes the loop an
//! explicit state machine so that every way of stopping is named.
//!
//! ```text
//!             ┌──────────────── token ───────────────┐
//!             ▼                                      │
//! Fetching ──page──► TokenContinue ──page──► ... ──► Done(reason)
//!     │                                              ▲
//!     └──page──► TimestampContinue ──page──► ... ────┘
//!     │
//!     └──error──► Failed
//! ```

use serde::{Deserialize, Serialize};

use super::time_window::TimeWindow;

/// Per-instrument resumption point. Never a token and a timestamp at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationCursor {
    /// First request, no cursor yet.
    Start,
    /// Opaque continuation token from the previous page.
    Token(String),
    /// Lower bound (epoch ms) derived from the last captured trade.
    Timestamp(i64),
}

/// Why a fetch loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Upstream reported neither a token nor more data.
    Exhausted,
    /// `has_more` was set on a page with no trades to resume from.
    EmptyPageWithMore,
    /// `has_more` was set but the last trade had no integer timestamp.
    MissingTimestamp,
    /// Upstream handed back the token that was just sent.
    RepeatedToken,
    /// Timestamp resumption would not move the window start forward.
    NoProgress,
    /// Timestamp resumption would start past the window end.
    WindowEnd,
    /// Configured page limit reached.
    PageLimit,
}

impl StopReason {
    /// Whether the stop is the normal end of the data.
    #[must_use]
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Exhausted | Self::WindowEnd)
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::EmptyPageWithMore => "empty_page_with_more",
            Self::MissingTimestamp => "missing_timestamp",
            Self::RepeatedToken => "repeated_token",
            Self::NoProgress => "no_progress",
            Self::WindowEnd => "window_end",
            Self::PageLimit => "page_limit",
        }
    }
}

/// Loop state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationState {
    /// The first request is pending.
    Fetching,
    /// Next request carries this continuation token.
    TokenContinue(String),
    /// Next request starts at this epoch-ms bound.
    TimestampContinue(i64),
    /// No further requests.
    Done(StopReason),
    /// A request failed; the collected pages are discarded.
    Failed(String),
}

impl PaginationState {
    /// Whether the loop has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

/// Request parameters for one trade history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuery {
    /// Instrument name.
    pub instrument_name: String,
    /// Lower bound (epoch ms).
    pub start_timestamp: i64,
    /// Upper bound (epoch ms).
    pub end_timestamp: i64,
    /// Page size.
    pub count: u32,
    /// Continuation token, if resuming by token.
    pub continuation: Option<String>,
}

/// What the loop needs to know about a received page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSignals<'a> {
    /// Number of trades on the page.
    pub trade_count: usize,
    /// Continuation token, if any.
    pub continuation: Option<&'a str>,
    /// Whether upstream reports more data.
    pub has_more: bool,
    /// Integer timestamp of the last trade on the page.
    pub last_timestamp: Option<i64>,
}

/// Drives the pagination state machine for one instrument.
#[derive(Debug, Clone)]
pub struct Paginator {
    instrument: String,
    window: TimeWindow,
    page_size: u32,
    max_pages: u32,
    start_ms: i64,
    cursor: PaginationCursor,
    pages: u32,
    state: PaginationState,
}

impl Paginator {
    /// Create a paginator for `instrument` over `window`.
    ///
    /// `max_pages` of 0 means unlimited.
    #[must_use]
    pub fn new(instrument: impl Into<String>, window: TimeWindow, page_size: u32, max_pages: u32) -> Self {
        Self {
            instrument: instrument.into(),
            window,
            page_size,
            max_pages,
            start_ms: window.start_ms,
            cursor: PaginationCursor::Start,
            pages: 0,
            state: PaginationState::Fetching,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Current cursor.
    #[must_use]
    pub const fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    /// Pages recorded so far.
    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.pages
    }

    /// Query for the next request, or `None` once the loop has ended.
    #[must_use]
    pub fn next_query(&self) -> Option<TradeQuery> {
        if self.state.is_terminal() {
            return None;
        }
        let continuation = match &self.cursor {
            PaginationCursor::Token(token) => Some(token.clone()),
            PaginationCursor::Start | PaginationCursor::Timestamp(_) => None,
        };
        Some(TradeQuery {
            instrument_name: self.instrument.clone(),
            start_timestamp: self.start_ms,
            end_timestamp: self.window.end_ms,
            count: self.page_size,
            continuation,
        })
    }

    /// Record a received page and move to the next state.
    pub fn record_page(&mut self, page: PageSignals<'_>) -> &PaginationState {
        if self.state.is_terminal() {
            return &self.state;
        }
        self.pages += 1;

        let next = if let Some(token) = page.continuation {
            self.continue_with_token(token)
        } else if page.has_more {
            self.continue_with_timestamp(page)
        } else {
            PaginationState::Done(StopReason::Exhausted)
        };

        self.state = match next {
            PaginationState::TokenContinue(_) | PaginationState::TimestampContinue(_)
                if self.max_pages != 0 && self.pages >= self.max_pages =>
            {
                PaginationState::Done(StopReason::PageLimit)
            }
            other => other,
        };
        &self.state
    }

    /// Mark the loop as failed.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.state = PaginationState::Failed(reason.into());
    }

    fn continue_with_token(&mut self, token: &str) -> PaginationState {
        if matches!(&self.cursor, PaginationCursor::Token(previous) if previous == token) {
            return PaginationState::Done(StopReason::RepeatedToken);
        }
        self.cursor = PaginationCursor::Token(token.to_string());
        PaginationState::TokenContinue(token.to_string())
    }

    fn continue_with_timestamp(&mut self, page: PageSignals<'_>) -> PaginationState {
        let Some(last) = page.last_timestamp else {
            return if page.trade_count == 0 {
                PaginationState::Done(StopReason::EmptyPageWithMore)
            } else {
                PaginationState::Done(StopReason::MissingTimestamp)
            };
        };

        let next_start = last.saturating_add(1);
        if next_start <= self.start_ms {
            return PaginationState::Done(StopReason::NoProgress);
        }
        if next_start > self.window.end_ms {
            return PaginationState::Done(StopReason::WindowEnd);
        }

        self.start_ms = next_start;
        self.cursor = PaginationCursor::Timestamp(next_start);
        PaginationState::TimestampContinue(next_start)
    }
}
