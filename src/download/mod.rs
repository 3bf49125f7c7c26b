//! Cursor-driven download pagination.
//!
//! Exhaustively retrieves every record in a time range by repeated requests,
//! in the API's natural page order. Pages are assumed internally time-ordered
//! and non-overlapping; the loop does no independent sort or merge.

use crate::api::{ApiError, LogsApi};
use crate::output::{OutputError, RecordSink};
use crate::timeexpr::TimeRange;
use chrono::{DateTime, Utc};
use tracing::debug;

pub mod progress;

pub use progress::{ConsoleReporter, NullReporter, ProgressReporter};

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Output sink error
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Continuation cursor for the download loop.
///
/// The unset and empty states are deliberately distinct: conflating them
/// would either skip the first page (empty mistaken for unset means no
/// request is ever issued) or loop forever (unset mistaken for empty means
/// the terminal response looks like a fresh start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// First request of a range; no cursor parameter is sent
    Unset,
    /// Non-empty token returned by the API; more pages follow
    Present(String),
    /// Pagination complete; terminal state of the loop
    Empty,
}

impl Cursor {
    /// Classify the next-cursor field of a response.
    pub fn from_next(token: String) -> Self {
        if token.is_empty() {
            Cursor::Empty
        } else {
            Cursor::Present(token)
        }
    }

    /// Wire-format parameter for the next request, if any.
    pub fn as_param(&self) -> Option<&str> {
        match self {
            Cursor::Present(token) => Some(token.as_str()),
            Cursor::Unset | Cursor::Empty => None,
        }
    }
}

/// Mutable accumulator for one download invocation.
///
/// Owned exclusively by the pagination loop for the duration of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    /// Current continuation cursor
    pub cursor: Cursor,
    /// Cumulative record count across all pages
    pub records: u64,
    /// Number of requests issued so far
    pub pages: u64,
    /// Maximum record timestamp observed so far, if any record was seen
    pub max_timestamp: Option<DateTime<Utc>>,
}

impl RunState {
    fn new() -> Self {
        Self {
            cursor: Cursor::Unset,
            records: 0,
            pages: 0,
            max_timestamp: None,
        }
    }

    fn observe(&mut self, timestamp: DateTime<Utc>) {
        self.max_timestamp = Some(match self.max_timestamp {
            Some(current) => current.max(timestamp),
            None => timestamp,
        });
    }
}

/// Run one download to completion.
///
/// Issues requests until the API returns an empty next-cursor — the sole
/// termination condition. A page with zero records but a non-empty cursor is
/// a valid intermediate page and the loop continues. Any transport, decode,
/// or write failure aborts the run immediately; fragments already flushed to
/// the sink remain on disk.
pub async fn run<A, S, R>(
    api: &A,
    range: &TimeRange,
    sink: &mut S,
    reporter: &mut R,
) -> Result<RunState, DownloadError>
where
    A: LogsApi + ?Sized,
    S: RecordSink,
    R: ProgressReporter,
{
    let mut state = RunState::new();

    loop {
        let page = api.fetch_page(range, state.cursor.as_param()).await?;
        state.pages += 1;

        debug!(
            "Received page {} with {} records",
            state.pages,
            page.data.len()
        );

        for record in &page.data {
            state.observe(record.timestamp);
            sink.append(record)?;
            state.records += 1;
        }
        sink.flush()?;

        state.cursor = Cursor::from_next(page.meta.pagination.cursor);
        reporter.page_complete(&state);

        if state.cursor == Cursor::Empty {
            break;
        }
    }

    debug!(
        "Download complete: {} records across {} pages",
        state.records, state.pages
    );

    Ok(state)
}
