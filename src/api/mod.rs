//! NextDNS logs API surface: request construction and the HTTP client.

use crate::timeexpr::TimeRange;
use crate::LogPage;
use async_trait::async_trait;

pub mod client;
pub mod request;

pub use client::{ApiConfig, LogsClient};
pub use request::LogsRequestBuilder;

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request construction error
    #[error("request error: {0}")]
    Request(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Response decode error
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Page-fetch seam consumed by the download paginator.
///
/// The paginator drives this trait with the raw cursor string (`None` on the
/// first request of a range) and never inspects the request beyond the page
/// it gets back, which keeps the loop testable without a network.
#[async_trait]
pub trait LogsApi: Send + Sync {
    /// Fetch one page of log records for `range`, resuming at `cursor`.
    async fn fetch_page(&self, range: &TimeRange, cursor: Option<&str>) -> ApiResult<LogPage>;
}
