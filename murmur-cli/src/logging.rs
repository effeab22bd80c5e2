//! Process-wide log set-up.
//!
//! [`init`] runs once, first thing in `main`, before any component logs.
//! Library crates log through the `log` facade; the subscriber's `tracing-log`
//! bridge forwards those records. Output is unbuffered stderr, so nothing
//! needs flushing at exit.

use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};

/// Accepted `--loglevel` values.
pub const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over `level`.
///
/// Fails when a global subscriber or `log` logger is already installed.
pub fn init(level: &str, format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}
