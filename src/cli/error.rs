//! CLI error types and conversions

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::download::DownloadError;
use crate::output::OutputError;
use crate::stream::StreamError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Download error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Stream error
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Whether the error should surface as a usage message rather than a
    /// failure report.
    pub fn is_usage(&self) -> bool {
        matches!(self, CliError::InvalidArgument(_))
    }
}
