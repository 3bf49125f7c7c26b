//! Stream command implementation

use crate::api::{ApiConfig, LogsClient};
use crate::cli::{Cli, CliError};
use crate::config::Settings;
use crate::output::FileSink;
use crate::shutdown::SharedShutdown;
use crate::stream::{FrameFormat, PrettyEcho, StreamConsumer, StreamFilter};
use clap::Parser;
use reqwest::Url;
use tracing::info;

/// Arguments for the stream command
#[derive(Parser, Debug)]
pub struct StreamArgs {
    /// Only persist records whose payload contains this keyword
    pub keyword: Option<String>,
}

impl StreamArgs {
    /// Tail the live log stream until the connection closes or shutdown is
    /// requested.
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let settings = Settings::from_env()?;
        let base_url = Url::parse(&cli.api_url)
            .map_err(|e| CliError::InvalidArgument(format!("invalid API URL: {e}")))?;

        println!("streaming logs...");

        let client = LogsClient::new(ApiConfig {
            base_url,
            api_key: settings.api_key,
            profile: settings.profile,
        })?;

        let lines = client.open_stream(self.keyword.as_deref()).await?;

        let consumer = StreamConsumer::new(
            FrameFormat::default(),
            StreamFilter::new(self.keyword.clone()),
        );

        let mut sink = FileSink::create(&cli.output)?;
        let mut echo = PrettyEcho;

        let summary = consumer
            .consume(Box::pin(lines), &mut sink, &mut echo, &shutdown)
            .await?;
        sink.close()?;

        info!(
            "Stream ended: {} frames seen, {} written",
            summary.frames_seen, summary.frames_written
        );

        Ok(())
    }
}
