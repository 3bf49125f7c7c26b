//! HTTP client for the logs API.

use crate::api::request::{LogsRequestBuilder, API_KEY_HEADER};
use crate::api::{ApiError, ApiResult, LogsApi};
use crate::timeexpr::TimeRange;
use crate::LogPage;
use async_trait::async_trait;
use futures_util::io::{AsyncBufReadExt, BufReader};
use futures_util::{Stream, TryStreamExt};
use reqwest::{Client, Response, Url};
use std::io;
use std::time::Duration;
use tracing::debug;

/// Per-call timeout for download-page requests.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Immutable per-run API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Root URL of the API, e.g. `https://api.nextdns.io`
    pub base_url: Url,
    /// Static API key sent in the `X-Api-Key` header
    pub api_key: String,
    /// Profile identifier whose logs are fetched
    pub profile: String,
}

/// Client for both logs endpoints.
///
/// Holds two underlying HTTP clients: download calls are bounded by a 20 s
/// timeout, while the stream connection is intentionally held open without
/// one.
pub struct LogsClient {
    builder: LogsRequestBuilder,
    api_key: String,
    download_http: Client,
    stream_http: Client,
}

impl LogsClient {
    /// Create a client from the per-run configuration.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let download_http = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {e}")))?;

        let stream_http = Client::builder()
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            builder: LogsRequestBuilder::new(config.base_url, config.profile),
            api_key: config.api_key,
            download_http,
            stream_http,
        })
    }

    /// Open the long-lived stream connection and expose the response body as
    /// a sequence of newline-delimited lines.
    pub async fn open_stream(
        &self,
        keyword: Option<&str>,
    ) -> ApiResult<impl Stream<Item = io::Result<String>>> {
        let url = self.builder.stream_url(keyword)?;
        debug!("Opening log stream: {}", url);

        let response = self.get(&self.stream_http, url).await?;

        let reader = response
            .bytes_stream()
            .map_err(io::Error::other)
            .into_async_read();

        Ok(BufReader::new(reader).lines())
    }

    async fn get(&self, http: &Client, url: Url) -> ApiResult<Response> {
        http.get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }
}

#[async_trait]
impl LogsApi for LogsClient {
    async fn fetch_page(&self, range: &TimeRange, cursor: Option<&str>) -> ApiResult<LogPage> {
        let url = self.builder.download_url(range, cursor)?;
        debug!("Fetching log page: {}", url);

        let response = self.get(&self.download_http, url).await?;

        // The body is decoded regardless of HTTP status; a non-2xx error
        // page surfaces as a decode failure rather than a status error.
        response
            .json::<LogPage>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
