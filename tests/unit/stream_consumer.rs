//! Unit tests for the live-tail stream consumer

use dns_log_downloader::output::{OutputResult, RecordSink};
use dns_log_downloader::shutdown::ShutdownCoordinator;
use dns_log_downloader::stream::{
    FrameFormat, PayloadEcho, StreamConsumer, StreamFilter, StreamSummary,
};
use dns_log_downloader::LogRecord;
use futures::stream;
use std::io;

/// In-memory sink capturing appended fragments.
#[derive(Default)]
struct VecSink {
    fragments: Vec<String>,
}

impl RecordSink for VecSink {
    fn append(&mut self, record: &LogRecord) -> OutputResult<()> {
        self.fragments.push(serde_json::to_string(record).unwrap());
        Ok(())
    }

    fn append_fragment(&mut self, payload: &str) -> OutputResult<()> {
        self.fragments.push(payload.to_string());
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Echo capturing every rendered payload.
#[derive(Default)]
struct RecordingEcho {
    payloads: Vec<String>,
}

impl PayloadEcho for RecordingEcho {
    fn echo(&mut self, payload: &str) {
        self.payloads.push(payload.to_string());
    }
}

fn lines(items: Vec<io::Result<String>>) -> impl futures::Stream<Item = io::Result<String>> + Unpin
{
    stream::iter(items)
}

fn data_line(json: &str) -> io::Result<String> {
    Ok(format!("data: {json}"))
}

fn consumer(keyword: Option<&str>) -> StreamConsumer {
    StreamConsumer::new(
        FrameFormat::default(),
        StreamFilter::new(keyword.map(String::from)),
    )
}

#[tokio::test]
async fn unfiltered_frames_are_written_and_echoed() {
    let input = lines(vec![
        data_line(r#"{"timestamp":"2022-09-01T00:00:00Z","domain":"a.example"}"#),
        data_line(r#"{"timestamp":"2022-09-01T00:00:01Z","domain":"b.example"}"#),
    ]);
    let mut sink = VecSink::default();
    let mut echo = RecordingEcho::default();
    let shutdown = ShutdownCoordinator::new();

    let summary = consumer(None)
        .consume(input, &mut sink, &mut echo, &shutdown)
        .await
        .unwrap();

    assert_eq!(
        summary,
        StreamSummary {
            frames_seen: 2,
            frames_written: 2
        }
    );
    assert_eq!(sink.fragments.len(), 2);
    assert_eq!(echo.payloads.len(), 2);
    assert!(sink.fragments[0].contains("a.example"));
}

#[tokio::test]
async fn keyword_gates_the_sink_but_not_the_echo() {
    let input = lines(vec![
        data_line(r#"{"timestamp":"2022-09-01T00:00:00Z","status":"blocked"}"#),
        data_line(r#"{"timestamp":"2022-09-01T00:00:01Z","status":"default"}"#),
    ]);
    let mut sink = VecSink::default();
    let mut echo = RecordingEcho::default();
    let shutdown = ShutdownCoordinator::new();

    let summary = consumer(Some("blocked"))
        .consume(input, &mut sink, &mut echo, &shutdown)
        .await
        .unwrap();

    // Only the matching frame reaches the sink; both frames are echoed.
    assert_eq!(summary.frames_seen, 2);
    assert_eq!(summary.frames_written, 1);
    assert_eq!(sink.fragments.len(), 1);
    assert!(sink.fragments[0].contains("blocked"));
    assert_eq!(echo.payloads.len(), 2);
}

#[tokio::test]
async fn control_lines_are_silently_discarded() {
    let input = lines(vec![
        Ok(String::new()),
        Ok(": keep-alive".to_string()),
        Ok("id: 42".to_string()),
        data_line(r#"{"timestamp":"2022-09-01T00:00:00Z"}"#),
    ]);
    let mut sink = VecSink::default();
    let mut echo = RecordingEcho::default();
    let shutdown = ShutdownCoordinator::new();

    let summary = consumer(None)
        .consume(input, &mut sink, &mut echo, &shutdown)
        .await
        .unwrap();

    assert_eq!(summary.frames_seen, 1);
    assert_eq!(sink.fragments.len(), 1);
    assert_eq!(echo.payloads.len(), 1);
}

#[tokio::test]
async fn read_error_is_fatal() {
    let input = lines(vec![
        data_line(r#"{"timestamp":"2022-09-01T00:00:00Z"}"#),
        Err(io::Error::other("connection reset")),
    ]);
    let mut sink = VecSink::default();
    let mut echo = RecordingEcho::default();
    let shutdown = ShutdownCoordinator::new();

    let result = consumer(None)
        .consume(input, &mut sink, &mut echo, &shutdown)
        .await;

    assert!(result.is_err());
    // The frame read before the failure was already processed.
    assert_eq!(sink.fragments.len(), 1);
}

#[tokio::test]
async fn shutdown_request_ends_the_loop() {
    // A pending stream never yields; only the shutdown branch can fire.
    let input = stream::pending::<io::Result<String>>();
    let mut sink = VecSink::default();
    let mut echo = RecordingEcho::default();
    let shutdown = ShutdownCoordinator::new();
    shutdown.request_shutdown();

    let summary = consumer(None)
        .consume(input, &mut sink, &mut echo, &shutdown)
        .await
        .unwrap();

    assert_eq!(summary, StreamSummary::default());
    assert!(sink.fragments.is_empty());
}

#[tokio::test]
async fn end_of_stream_returns_summary() {
    let input = lines(Vec::new());
    let mut sink = VecSink::default();
    let mut echo = RecordingEcho::default();
    let shutdown = ShutdownCoordinator::new();

    let summary = consumer(None)
        .consume(input, &mut sink, &mut echo, &shutdown)
        .await
        .unwrap();

    assert_eq!(summary, StreamSummary::default());
}
