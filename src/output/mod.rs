//! Append-only record sink.
//!
//! Both modes persist records through the same sink. Each record becomes one
//! serialized JSON object followed by the fixed `,\n` delimiter — a
//! comma-terminated sequence of objects rather than a valid JSON array or
//! JSON-lines stream. Consumers of the file wrap it in `[` / `]` (stripping
//! the final comma) or tolerate the trailing comma; the byte format is kept
//! for compatibility with existing tooling.

use crate::LogRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Delimiter appended after every record.
pub const RECORD_DELIMITER: &[u8] = b",\n";

/// Output sink errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for sink operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for `{...},\n` record fragments.
///
/// Writes are ordered; one accepted record corresponds to exactly one
/// fragment.
pub trait RecordSink {
    /// Serialize and append one record.
    fn append(&mut self, record: &LogRecord) -> OutputResult<()>;

    /// Append an already-serialized JSON object (stream payloads pass
    /// through without re-encoding).
    fn append_fragment(&mut self, payload: &str) -> OutputResult<()>;

    /// Flush buffered fragments to the destination.
    fn flush(&mut self) -> OutputResult<()>;
}

/// File-backed [`RecordSink`].
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
    records_written: u64,
}

impl FileSink {
    /// Create (truncate) the output file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating output file: {}", path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    OutputError::IoError(format!("failed to create directory: {e}"))
                })?;
            }
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("failed to create file: {e}")))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            records_written: 0,
        })
    }

    /// Number of fragments written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the sink.
    pub fn close(mut self) -> OutputResult<()> {
        self.flush()?;
        debug!(
            "Closed output file {} after {} records",
            self.path.display(),
            self.records_written
        );
        Ok(())
    }

    fn write_fragment(&mut self, bytes: &[u8]) -> OutputResult<()> {
        self.writer
            .write_all(bytes)
            .and_then(|()| self.writer.write_all(RECORD_DELIMITER))
            .map_err(|e| OutputError::IoError(format!("failed to write record: {e}")))?;
        self.records_written += 1;
        Ok(())
    }
}

impl RecordSink for FileSink {
    fn append(&mut self, record: &LogRecord) -> OutputResult<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| OutputError::SerializationError(e.to_string()))?;
        self.write_fragment(json.as_bytes())
    }

    fn append_fragment(&mut self, payload: &str) -> OutputResult<()> {
        self.write_fragment(payload.trim().as_bytes())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(e.to_string()))
    }
}
