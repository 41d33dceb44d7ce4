//! Log setup. The terminal belongs to the dashboard, so logs only ever go to
//! a file through a non-blocking writer.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter directives, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "RESTOP_LOG";

const DEFAULT_LEVEL: &str = "warn";

/// The log file used when none is given: `restop.log` in the temp directory.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("restop.log")
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Installs the global subscriber writing to `path`.
///
/// Returns `None`, leaving logging off, when the file cannot be opened or a
/// subscriber is already installed. The guard must live until exit so
/// buffered lines are flushed.
pub fn init(path: &Path) -> Option<WorkerGuard> {
    let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}
