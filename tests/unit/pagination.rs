//! Unit tests for the download pagination loop

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dns_log_downloader::api::{ApiError, ApiResult, LogsApi};
use dns_log_downloader::download::{self, NullReporter, ProgressReporter, RunState};
use dns_log_downloader::output::{OutputResult, RecordSink};
use dns_log_downloader::timeexpr::{TimeExpr, TimeRange};
use dns_log_downloader::{LogPage, LogRecord, PageMeta, Pagination};
use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Mutex;

fn test_range() -> TimeRange {
    TimeRange::new(
        TimeExpr::from_str("-1h").unwrap(),
        TimeExpr::from_str("now").unwrap(),
    )
}

fn record(domain: &str, timestamp: DateTime<Utc>) -> LogRecord {
    LogRecord {
        timestamp,
        domain: domain.to_string(),
        root: "example.com".to_string(),
        tracker: None,
        query_type: "A".to_string(),
        dnssec: false,
        encrypted: true,
        protocol: "DNS-over-HTTPS".to_string(),
        client_ip: "192.0.2.1".to_string(),
        client: "test".to_string(),
        device: Default::default(),
        status: "default".to_string(),
        reasons: Vec::new(),
    }
}

fn records(prefix: &str, base: DateTime<Utc>, count: usize) -> Vec<LogRecord> {
    (0..count)
        .map(|i| {
            record(
                &format!("{prefix}-{i}.example.com"),
                base + chrono::Duration::seconds(i as i64),
            )
        })
        .collect()
}

fn page(data: Vec<LogRecord>, cursor: &str) -> LogPage {
    LogPage {
        data,
        meta: PageMeta {
            pagination: Pagination {
                cursor: cursor.to_string(),
            },
        },
    }
}

/// Scripted page source that records the cursor of every request.
struct MockApi {
    pages: Mutex<VecDeque<ApiResult<LogPage>>>,
    cursors_seen: Mutex<Vec<Option<String>>>,
}

impl MockApi {
    fn new(pages: Vec<ApiResult<LogPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            cursors_seen: Mutex::new(Vec::new()),
        }
    }

    fn cursors_seen(&self) -> Vec<Option<String>> {
        self.cursors_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogsApi for MockApi {
    async fn fetch_page(&self, _range: &TimeRange, cursor: Option<&str>) -> ApiResult<LogPage> {
        self.cursors_seen
            .lock()
            .unwrap()
            .push(cursor.map(String::from));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no more scripted pages".to_string())))
    }
}

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

/// Reporter capturing (count, max timestamp) after every page.
#[derive(Default)]
struct RecordingReporter {
    snapshots: Vec<(u64, Option<DateTime<Utc>>)>,
}

impl ProgressReporter for RecordingReporter {
    fn page_complete(&mut self, state: &RunState) {
        self.snapshots.push((state.records, state.max_timestamp));
    }
}

#[tokio::test]
async fn two_page_download_totals_and_order() {
    let base = Utc.with_ymd_and_hms(2022, 9, 1, 12, 0, 0).unwrap();
    let api = MockApi::new(vec![
        Ok(page(records("p1", base, 1000), "tok-1")),
        Ok(page(records("p2", base + chrono::Duration::hours(1), 50), "")),
    ]);
    let mut sink = VecSink::default();
    let mut reporter = RecordingReporter::default();

    let state = download::run(&api, &test_range(), &mut sink, &mut reporter)
        .await
        .unwrap();

    assert_eq!(state.records, 1050);
    assert_eq!(state.pages, 2);
    assert_eq!(sink.fragments.len(), 1050);

    // Exactly two requests: the first without a cursor, the second resuming
    // at the token from the first response.
    assert_eq!(
        api.cursors_seen(),
        vec![None, Some("tok-1".to_string())]
    );

    // Records land in arrival order.
    assert!(sink.fragments[0].contains("p1-0.example.com"));
    assert!(sink.fragments[999].contains("p1-999.example.com"));
    assert!(sink.fragments[1000].contains("p2-0.example.com"));
    assert!(sink.fragments[1049].contains("p2-49.example.com"));
}

#[tokio::test]
async fn empty_range_issues_exactly_one_request() {
    let api = MockApi::new(vec![Ok(page(Vec::new(), ""))]);
    let mut sink = VecSink::default();
    let mut reporter = NullReporter;

    let state = download::run(&api, &test_range(), &mut sink, &mut reporter)
        .await
        .unwrap();

    assert_eq!(state.pages, 1);
    assert_eq!(state.records, 0);
    assert_eq!(state.max_timestamp, None);
    assert!(sink.fragments.is_empty());
    assert_eq!(api.cursors_seen(), vec![None]);
}

#[tokio::test]
async fn zero_record_page_with_cursor_continues() {
    let base = Utc.with_ymd_and_hms(2022, 9, 1, 0, 0, 0).unwrap();
    let api = MockApi::new(vec![
        Ok(page(Vec::new(), "tok-1")),
        Ok(page(records("p2", base, 3), "tok-2")),
        Ok(page(Vec::new(), "")),
    ]);
    let mut sink = VecSink::default();
    let mut reporter = NullReporter;

    let state = download::run(&api, &test_range(), &mut sink, &mut reporter)
        .await
        .unwrap();

    assert_eq!(state.pages, 3);
    assert_eq!(state.records, 3);
    assert_eq!(
        api.cursors_seen(),
        vec![None, Some("tok-1".to_string()), Some("tok-2".to_string())]
    );
}

#[tokio::test]
async fn max_timestamp_is_maximum_across_all_pages() {
    let early = Utc.with_ymd_and_hms(2022, 9, 1, 0, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2022, 9, 1, 23, 59, 59).unwrap();
    let middle = Utc.with_ymd_and_hms(2022, 9, 1, 12, 0, 0).unwrap();

    // The newest record arrives on the first page; later pages must not
    // drag the maximum back down.
    let api = MockApi::new(vec![
        Ok(page(
            vec![record("a.example.com", early), record("b.example.com", late)],
            "tok-1",
        )),
        Ok(page(vec![record("c.example.com", middle)], "")),
    ]);
    let mut sink = VecSink::default();
    let mut reporter = RecordingReporter::default();

    let state = download::run(&api, &test_range(), &mut sink, &mut reporter)
        .await
        .unwrap();

    assert_eq!(state.max_timestamp, Some(late));
    assert_eq!(
        reporter.snapshots,
        vec![(2, Some(late)), (3, Some(late))]
    );
}

#[tokio::test]
async fn fetch_error_aborts_but_keeps_flushed_output() {
    let base = Utc.with_ymd_and_hms(2022, 9, 1, 0, 0, 0).unwrap();
    let api = MockApi::new(vec![
        Ok(page(records("p1", base, 2), "tok-1")),
        Err(ApiError::Network("connection reset".to_string())),
    ]);
    let mut sink = VecSink::default();
    let mut reporter = RecordingReporter::default();

    let result = download::run(&api, &test_range(), &mut sink, &mut reporter).await;

    assert!(result.is_err());
    // The first page made it to the sink before the abort.
    assert_eq!(sink.fragments.len(), 2);
    assert_eq!(reporter.snapshots.len(), 1);
}

#[tokio::test]
async fn reporter_sees_cumulative_counts() {
    let base = Utc.with_ymd_and_hms(2022, 9, 1, 0, 0, 0).unwrap();
    let api = MockApi::new(vec![
        Ok(page(records("p1", base, 5), "tok-1")),
        Ok(page(records("p2", base + chrono::Duration::minutes(1), 7), "")),
    ]);
    let mut sink = VecSink::default();
    let mut reporter = RecordingReporter::default();

    download::run(&api, &test_range(), &mut sink, &mut reporter)
        .await
        .unwrap();

    let counts: Vec<u64> = reporter.snapshots.iter().map(|(c, _)| *c).collect();
    assert_eq!(counts, vec![5, 12]);
}
