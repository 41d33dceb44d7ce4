//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// A terminal resource monitor.
#[derive(Debug, Parser)]
#[command(name = "restop", version, about, long_about = None)]
pub struct Cli {
    /// Directory of `.theme` files
    #[arg(long, value_name = "DIR")]
    pub themes: Option<PathBuf>,

    /// Settings file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Samples per second for this run
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub hz: Option<u32>,

    /// Theme to start with, by name
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Log file (filter with RESTOP_LOG or RUST_LOG)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
