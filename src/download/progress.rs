//! Per-page progress reporting for download runs.
//!
//! Purely observational: reporters see the run state after each page and
//! have no effect on control flow.

use crate::download::RunState;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};

/// Receives the run state after each completed page.
pub trait ProgressReporter {
    /// Called once per page, after its records have been written.
    fn page_complete(&mut self, state: &RunState);
}

/// Reporter that does nothing. Useful when no console is attached.
#[derive(Debug, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn page_complete(&mut self, _state: &RunState) {}
}

/// Console reporter backed by an [`indicatif`] spinner.
///
/// Shows the cumulative record count and the human-readable timestamp of the
/// newest record seen so far.
pub struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    /// Create a spinner for one download run.
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("hardcoded template is valid"),
        );
        Self { bar }
    }

    /// Remove the spinner from the console.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
        match timestamp {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => "-".to_string(),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleReporter {
    fn page_complete(&mut self, state: &RunState) {
        self.bar.set_message(format!(
            "{} records · {}",
            state.records,
            Self::format_timestamp(state.max_timestamp)
        ));
        self.bar.tick();
    }
}
