//! Per-run logging handle.
//!
//! A [`Logger`] owns its own `tracing` dispatcher instead of installing a
//! global subscriber, so several pipelines (or tests) in one process never
//! share log state. Code that wants the `tracing` macros to reach this
//! logger enters it with [`Logger::enter`]; worker threads do this on start.

use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::dispatcher::{self, DefaultGuard, Dispatch};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, fmt};

#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Console logging on stderr, plus an append-only log file when `log_path` is set.
    ///
    /// The console shows INFO and above (DEBUG when `verbose`); the file
    /// always records DEBUG and above.
    pub fn new(log_path: Option<&Path>, verbose: bool) -> Result<Self> {
        let console_level = if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_level);

        let file_layer = match log_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_thread_names(true)
                        .with_writer(Mutex::new(file))
                        .with_filter(LevelFilter::DEBUG),
                )
            }
            None => None,
        };

        let subscriber = tracing_subscriber::registry().with(console).with(file_layer);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
        })
    }

    /// Route `tracing` events on the current thread to this logger until the guard drops.
    pub fn enter(&self) -> DefaultGuard {
        dispatcher::set_default(&self.dispatch)
    }

    pub fn info(&self, message: &str) {
        dispatcher::with_default(&self.dispatch, || tracing::info!("{}", message));
    }

    pub fn warning(&self, message: &str) {
        dispatcher::with_default(&self.dispatch, || tracing::warn!("{}", message));
    }

    /// Summary of a finished run.
    pub fn log_pipeline_stats(&self, elapsed: Duration, valid_lines: u64, match_count: usize) {
        let secs = elapsed.as_secs_f64();
        let throughput = if secs > 0.0 {
            valid_lines as f64 / secs
        } else {
            0.0
        };

        self.info("Pipeline statistics:");
        self.info(&format!("  Total time: {:.2?}", elapsed));
        self.info(&format!("  Lines processed: {}", valid_lines));
        self.info(&format!("  Throughput: {:.0} lines/sec", throughput));
        self.info(&format!("  Matches found: {}", match_count));
    }
}
