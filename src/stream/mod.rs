//! Unbounded live-tail consumer for the log stream endpoint.
//!
//! One long-lived connection yields an effectively infinite sequence of
//! newline-delimited frames. Data frames carry a JSON log record behind an
//! event-stream framing prefix; keep-alive and control lines carry nothing
//! and are silently discarded. The loop has no natural exit: it runs until
//! the connection closes, a read fails, or shutdown is requested.

use crate::output::{OutputError, RecordSink};
use crate::shutdown::ShutdownCoordinator;
use futures_util::{Stream, StreamExt};
use std::io;
use tracing::{debug, info};

/// Stream consumer errors
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Read failure on the open connection. Fatal: the consumer does not
    /// transparently reconnect.
    #[error("stream read error: {0}")]
    Read(#[from] io::Error),

    /// Output sink error
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Framing convention of the stream protocol.
///
/// The marker token identifies lines that carry a data frame and the prefix
/// is the protocol envelope stripped from them. Both are named configuration
/// rather than hard-coded offsets, so a change in the API's framing shows up
/// here instead of silently misparsing payloads.
#[derive(Debug, Clone)]
pub struct FrameFormat {
    /// Token that must appear in a line for it to count as a data frame
    pub marker: String,
    /// Envelope prefix stripped from data frames
    pub data_prefix: String,
}

impl Default for FrameFormat {
    /// The event-stream convention the logs API uses: data frames embed a
    /// `timestamp` field and are prefixed with `data:`.
    fn default() -> Self {
        Self {
            marker: "timestamp".to_string(),
            data_prefix: "data:".to_string(),
        }
    }
}

impl FrameFormat {
    /// Extract the JSON payload of a data frame, or `None` for control and
    /// keep-alive lines.
    pub fn payload<'a>(&self, line: &'a str) -> Option<&'a str> {
        if !line.contains(&self.marker) {
            return None;
        }

        let stripped = line
            .trim_start()
            .strip_prefix(&self.data_prefix)
            .unwrap_or(line);

        let payload = stripped.trim();
        if payload.is_empty() {
            None
        } else {
            Some(payload)
        }
    }
}

/// Optional keyword gate between the stream and the sink.
///
/// When no keyword is configured every payload passes.
#[derive(Debug, Clone, Default)]
pub struct StreamFilter {
    keyword: Option<String>,
}

impl StreamFilter {
    /// Build a filter from an optional keyword.
    pub fn new(keyword: Option<String>) -> Self {
        Self { keyword }
    }

    /// Whether a payload should be forwarded to the sink.
    pub fn matches(&self, payload: &str) -> bool {
        match &self.keyword {
            Some(keyword) => payload.contains(keyword.as_str()),
            None => true,
        }
    }
}

/// Console echo seam for matched payloads.
///
/// Every data frame is rendered for human observation regardless of whether
/// the filter forwarded it to the sink. The rendering itself (pretty
/// formatting, coloring) is a capability of the implementor.
pub trait PayloadEcho {
    /// Render one payload to the console.
    fn echo(&mut self, payload: &str);
}

/// Echo that pretty-prints each payload as indented JSON on stdout.
///
/// Payloads that fail to parse are printed verbatim rather than dropped.
#[derive(Debug, Default)]
pub struct PrettyEcho;

impl PayloadEcho for PrettyEcho {
    fn echo(&mut self, payload: &str) {
        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(pretty) => println!("{pretty}"),
                Err(_) => println!("{payload}"),
            },
            Err(_) => println!("{payload}"),
        }
    }
}

/// Counters accumulated over one stream session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Data frames recognized on the connection
    pub frames_seen: u64,
    /// Data frames forwarded to the sink
    pub frames_written: u64,
}

/// Consumes the line stream, filtering and forwarding data frames.
#[derive(Debug, Clone, Default)]
pub struct StreamConsumer {
    format: FrameFormat,
    filter: StreamFilter,
}

impl StreamConsumer {
    /// Create a consumer with the given framing and filter.
    pub fn new(format: FrameFormat, filter: StreamFilter) -> Self {
        Self { format, filter }
    }

    /// Process lines until the stream ends, a read fails, or shutdown is
    /// requested.
    ///
    /// Data frames are echoed to the console unconditionally and forwarded
    /// to the sink only when the filter matches. The shutdown signal is
    /// observed between reads, so an in-flight read is never preempted.
    pub async fn consume<L, S, E>(
        &self,
        mut lines: L,
        sink: &mut S,
        echo: &mut E,
        shutdown: &ShutdownCoordinator,
    ) -> Result<StreamSummary, StreamError>
    where
        L: Stream<Item = io::Result<String>> + Unpin,
        S: RecordSink,
        E: PayloadEcho,
    {
        let mut summary = StreamSummary::default();

        loop {
            let line = tokio::select! {
                _ = shutdown.wait_for_shutdown() => {
                    info!("Shutdown requested - closing stream");
                    break;
                }
                line = lines.next() => line,
            };

            match line {
                None => {
                    info!("Stream connection closed by remote");
                    break;
                }
                Some(Err(e)) => return Err(StreamError::Read(e)),
                Some(Ok(line)) => {
                    let Some(payload) = self.format.payload(&line) else {
                        debug!("Discarding control line");
                        continue;
                    };

                    summary.frames_seen += 1;

                    if self.filter.matches(payload) {
                        sink.append_fragment(payload)?;
                        sink.flush()?;
                        summary.frames_written += 1;
                    }

                    echo.echo(payload);
                }
            }
        }

        Ok(summary)
    }
}
