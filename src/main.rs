//! Main entry point for the dns-log-downloader CLI

use clap::Parser;
use dns_log_downloader::cli::{Cli, CliError, Commands};
use dns_log_downloader::shutdown::ShutdownCoordinator;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dns_log_downloader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    // Ctrl+C requests a graceful stop; the stream loop observes it between
    // reads.
    let shutdown = ShutdownCoordinator::shared();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - shutting down...");
                shutdown.request_shutdown();
            }
        }
    });

    let result = match &cli.command {
        Commands::Download(args) => args.execute(&cli).await,
        Commands::Stream(args) => args.execute(&cli, shutdown.clone()).await,
    };

    if let Err(e) = result {
        std::process::exit(report_failure(e));
    }
}

/// Convert a command failure into the process exit code, printing the
/// diagnostic on the appropriate stream.
fn report_failure(e: CliError) -> i32 {
    if e.is_usage() {
        // Invalid invocations get a usage message on stdout.
        println!("{e}");
    } else {
        let err = anyhow::anyhow!(e);
        error!("Command failed: {}", err);
        eprintln!("Error: {err}");
    }
    1
}
