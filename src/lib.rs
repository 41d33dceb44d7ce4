//! restop: a terminal resource monitor.
//!
//! A sampler thread turns raw operating system counters into
//! [`types::MetricSnapshot`]s and publishes them into a shared state; the ui
//! thread routes input, and draws the panels, the process table and the
//! modal overlays from that state.

pub mod app;
pub mod cli;
pub mod collector;
pub mod config;
pub mod errors;
pub mod event;
pub mod history;
pub mod input;
pub mod logging;
pub mod sampler;
pub mod state;
pub mod theme;
pub mod types;
pub mod ui;

pub use crate::errors::{Error, Result};
