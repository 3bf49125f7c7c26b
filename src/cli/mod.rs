//! CLI command implementations

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod download;
pub mod error;
pub mod stream;

pub use download::DownloadArgs;
pub use error::CliError;
pub use stream::StreamArgs;

/// Default root URL of the logs API.
pub const DEFAULT_API_URL: &str = "https://api.nextdns.io";

/// DNS Log Downloader CLI
#[derive(Parser, Debug)]
#[command(name = "dns-log-downloader")]
#[command(about = "Download or live-tail DNS query logs from the NextDNS API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output file for record fragments
    #[arg(long, global = true, default_value = "output.log")]
    pub output: PathBuf,

    /// Root URL of the logs API
    #[arg(long, global = true, default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download historical logs over a time range
    Download(DownloadArgs),

    /// Live-tail newly arriving logs
    Stream(StreamArgs),
}
