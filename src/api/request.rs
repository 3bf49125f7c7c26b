//! Authenticated GET request construction for the logs endpoints.

use crate::api::{ApiError, ApiResult};
use crate::timeexpr::TimeRange;
use reqwest::Url;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Page size requested from the download endpoint.
pub const PAGE_LIMIT: usize = 1000;

/// Builds request URLs for one profile's logs endpoints.
///
/// Produces the two shapes the API exposes:
/// `/profiles/{profile}/logs` (bounded download) and
/// `/profiles/{profile}/logs/stream` (live tail). No retries or backoff
/// happen at this layer; failures propagate to the caller.
#[derive(Debug, Clone)]
pub struct LogsRequestBuilder {
    base_url: Url,
    profile: String,
}

impl LogsRequestBuilder {
    /// Create a builder for `profile` rooted at `base_url`.
    pub fn new(base_url: Url, profile: impl Into<String>) -> Self {
        Self {
            base_url,
            profile: profile.into(),
        }
    }

    /// Build the download-endpoint URL for one page of `range`.
    ///
    /// The `cursor` parameter is appended only when a continuation token is
    /// actually in hand; the first request of a range sends none.
    pub fn download_url(&self, range: &TimeRange, cursor: Option<&str>) -> ApiResult<Url> {
        let mut url = self.endpoint_url("logs")?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("from", &range.from.to_string())
                .append_pair("to", &range.to.to_string())
                .append_pair("limit", &PAGE_LIMIT.to_string())
                .append_pair("raw", "1");

            if let Some(token) = cursor {
                pairs.append_pair("cursor", token);
            }
        }

        Ok(url)
    }

    /// Build the stream-endpoint URL, with an optional server-side keyword
    /// search.
    pub fn stream_url(&self, keyword: Option<&str>) -> ApiResult<Url> {
        let mut url = self.endpoint_url("logs/stream")?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("raw", "1");

            if let Some(keyword) = keyword {
                pairs.append_pair("search", keyword);
            }
        }

        Ok(url)
    }

    fn endpoint_url(&self, suffix: &str) -> ApiResult<Url> {
        let path = format!("profiles/{}/{}", self.profile, suffix);
        self.base_url
            .join(&path)
            .map_err(|e| ApiError::Request(format!("invalid endpoint URL: {e}")))
    }
}
