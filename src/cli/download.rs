//! Download command implementation

use crate::api::{ApiConfig, LogsClient};
use crate::cli::{Cli, CliError};
use crate::config::Settings;
use crate::download::{self, ConsoleReporter};
use crate::output::FileSink;
use crate::timeexpr::{TimeExpr, TimeRange};
use clap::Parser;
use reqwest::Url;
use std::str::FromStr;
use tracing::info;

/// Arguments for the download command
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Range start: relative offset (-1h), 'now', or a date (2022-09-01)
    #[arg(allow_hyphen_values = true)]
    pub start: String,

    /// Range end: relative offset (-1h), 'now', or a date (2022-09-01)
    #[arg(allow_hyphen_values = true)]
    pub end: String,
}

/// Parse one time expression, mapping rejection to a usage error.
fn parse_time_expr(input: &str) -> Result<TimeExpr, CliError> {
    TimeExpr::from_str(input).map_err(|e| {
        CliError::InvalidArgument(format!(
            "{e}\nExamples: download -1h now, download 2022-09-01 -1h"
        ))
    })
}

impl DownloadArgs {
    /// Parse and validate the start/end expressions into a range.
    pub fn parse_range(&self) -> Result<TimeRange, CliError> {
        let from = parse_time_expr(&self.start)?;
        let to = parse_time_expr(&self.end)?;
        Ok(TimeRange::new(from, to))
    }

    /// Run the download to completion and report the final count.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        // Validate the range before any network or filesystem activity.
        let range = self.parse_range()?;

        let settings = Settings::from_env()?;
        let base_url = Url::parse(&cli.api_url)
            .map_err(|e| CliError::InvalidArgument(format!("invalid API URL: {e}")))?;

        println!(
            "download logs - start: {} end: {}",
            range.from, range.to
        );

        let client = LogsClient::new(ApiConfig {
            base_url,
            api_key: settings.api_key,
            profile: settings.profile,
        })?;

        let mut sink = FileSink::create(&cli.output)?;
        let mut reporter = ConsoleReporter::new();

        info!(
            "Starting download: {} to {} -> {}",
            range.from,
            range.to,
            cli.output.display()
        );

        let result = download::run(&client, &range, &mut sink, &mut reporter).await;
        reporter.finish();

        let state = result?;
        sink.close()?;

        println!("\nDone with {} records", state.records);
        Ok(())
    }
}
