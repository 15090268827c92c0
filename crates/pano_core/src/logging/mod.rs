//! Logging for batch runs.
//!
//! Two layers: a global `tracing` subscriber installed by the binary, and a
//! [`RunLogger`] per batch that mirrors every line into
//! `<logs_folder>/<run>.log` and keeps the last lines of tool output for
//! failure reports.
//!
//! ```no_run
//! use pano_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("batch", ".logs", LogConfig::default()).unwrap();
//! logger.phase("Stitch");
//! logger.command("MediaSDKTest -inputs a.insp ...");
//! logger.progress(50);
//! ```

mod run_logger;
mod types;

pub use run_logger::RunLogger;
pub use types::{LogConfig, LogLevel};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Warnings and errors only, captured per test.
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(LogLevel::Warn.directive())
        .with_test_writer()
        .try_init();
}
