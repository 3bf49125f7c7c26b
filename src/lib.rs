//! # DNS Log Downloader Library
//!
//! A small library for retrieving DNS-query log records from the NextDNS
//! HTTP API and persisting them locally.
//!
//! ## Features
//!
//! - **Download mode**: bounded historical retrieval over a time range,
//!   paginated with the API's opaque continuation cursor
//! - **Stream mode**: unbounded live tail of the push-style log stream with
//!   optional keyword filtering and pretty console echo
//! - **Append-only output**: records are persisted as `{...},\n`-delimited
//!   JSON fragments in arrival order
//! - **Graceful shutdown**: the stream tail observes a shutdown signal
//!   between reads so Ctrl+C exits cleanly
//!
//! ## Architecture
//!
//! The library is organized into several core modules:
//!
//! - [`timeexpr`] - Time expression parsing and validation (`-1h`, `now`, `2022-09-01`)
//! - [`api`] - Request construction and the HTTP client for both endpoints
//! - [`download`] - Cursor-driven pagination loop with progress reporting
//! - [`stream`] - Unbounded line-stream consumer with keyword filtering
//! - [`output`] - Append-only record sink
//! - [`config`] - API key and profile loading from the environment
//! - [`shutdown`] - Graceful shutdown coordination

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request construction and HTTP client
pub mod api;

/// CLI command implementations
pub mod cli;

/// API key and profile configuration
pub mod config;

/// Download pagination loop
pub mod download;

/// Append-only record sink
pub mod output;

/// Graceful shutdown coordination shared across modes
pub mod shutdown;

/// Unbounded live-tail stream consumer
pub mod stream;

/// Time expression parsing
pub mod timeexpr;

// Re-export commonly used types
pub use timeexpr::{TimeExpr, TimeRange};

/// One DNS-query event as returned by the logs API.
///
/// Fields pass through serialization unchanged; the record is immutable once
/// received and is handed to the sink by value or shared reference, never
/// mutated. Most fields carry `#[serde(default)]` because the API omits them
/// for some query types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// When the query was received
    pub timestamp: DateTime<Utc>,
    /// Fully-qualified queried domain
    #[serde(default)]
    pub domain: String,
    /// Effective root domain of the query
    #[serde(default)]
    pub root: String,
    /// Tracker classification, when the domain is a known tracker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    /// DNS query type (A, AAAA, HTTPS, ...)
    #[serde(rename = "type", default)]
    pub query_type: String,
    /// Whether the response was DNSSEC-validated
    #[serde(default)]
    pub dnssec: bool,
    /// Whether the query arrived over an encrypted transport
    #[serde(default)]
    pub encrypted: bool,
    /// Transport protocol (DNS-over-HTTPS, UDP, ...)
    #[serde(default)]
    pub protocol: String,
    /// IP address the query came from
    #[serde(default)]
    pub client_ip: String,
    /// Client identifier configured on the profile
    #[serde(default)]
    pub client: String,
    /// Device the query was attributed to
    #[serde(default)]
    pub device: Device,
    /// Block/allow status of the query
    #[serde(default)]
    pub status: String,
    /// Ordered reason codes explaining the status
    #[serde(default)]
    pub reasons: Vec<Reason>,
}

/// Device sub-record of a [`LogRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Opaque device identifier
    #[serde(default)]
    pub id: String,
    /// Human-assigned device name
    #[serde(default)]
    pub name: String,
    /// Device model reported by the client
    #[serde(default)]
    pub model: String,
    /// Local IP address of the device
    #[serde(default)]
    pub local_ip: String,
}

/// One reason code attached to a [`LogRecord`] status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reason {
    /// Stable reason identifier
    #[serde(default)]
    pub id: String,
    /// Human-readable reason name
    #[serde(default)]
    pub name: String,
}

/// One page of the download endpoint's response body.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogPage {
    /// Records in the API's natural page order
    #[serde(default)]
    pub data: Vec<LogRecord>,
    /// Pagination metadata
    #[serde(default)]
    pub meta: PageMeta,
}

/// Metadata envelope of a [`LogPage`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PageMeta {
    /// Pagination block
    #[serde(default)]
    pub pagination: Pagination,
}

/// Continuation token carried by a [`LogPage`].
///
/// An empty `cursor` string means the page was the last one.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Pagination {
    /// Opaque continuation token; empty when pagination is complete
    #[serde(default)]
    pub cursor: String,
}
