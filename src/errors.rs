//! Unified error type for restop.

use std::io;
use std::path::PathBuf;

/// Errors that can stop the dashboard or one of its setup steps.
///
/// Metric acquisition never produces one of these: provider failures are
/// reported as empty or absent values instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The console could not be switched into raw / alternate-screen mode.
    #[error("terminal initialization failed: {0}")]
    Terminal(#[source] io::Error),

    /// Drawing to or polling the terminal failed after startup.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The theme directory could not be listed.
    #[error("cannot read theme directory {}: {source}", path.display())]
    ThemeDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The theme directory was readable but held no `.theme` files.
    #[error("no theme files found in {}", .0.display())]
    NoThemes(PathBuf),

    /// The settings file could not be read or written.
    #[error("cannot access settings file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sampler thread could not be spawned.
    #[error("failed to start sampler thread: {0}")]
    Spawn(#[source] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
