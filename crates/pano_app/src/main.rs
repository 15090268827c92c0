//! pano-batch - batch stitching of 360° captures
//!
//! Usage:
//!   pano-batch [OPTIONS] <ASSET_DIR> <METADATA_DIR> <OUTPUT_DIR> [METADATA_OUTPUT_DIR]
//!
//! Exits with 1 on bad arguments, a missing asset directory or an unreadable
//! config file. Stitcher and embedder failures are reported but never change
//! the exit code.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use pano_core::config::{ConfigManager, Settings};
use pano_core::logging::{init_tracing, LogLevel, RunLogger};
use pano_core::models::{BatchReport, CorrelationMode};
use pano_core::orchestrator::{default_run_name, run_batch, BatchDirs};
use pano_core::process::SystemRunner;

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "pano-batch.toml";

/// Stitch raw 360° captures and attach their sidecar metadata
#[derive(Parser, Debug)]
#[command(name = "pano-batch", author, version, about, long_about = None)]
struct Cli {
    /// Directory with raw .insp / .insv captures
    asset_dir: PathBuf,

    /// Directory with .json sidecars named after the deliverables
    metadata_dir: PathBuf,

    /// Directory the stitched deliverables are written to
    output_dir: PathBuf,

    /// Directory for copied sidecars (defaults to OUTPUT_DIR)
    metadata_output_dir: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Metadata handling: copy, embed or copy_and_embed
    #[arg(short, long)]
    mode: Option<CorrelationMode>,

    /// Write the batch report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not usage errors
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    init_tracing(level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        settings.metadata.mode = mode;
    }

    let logger = Arc::new(create_logger(&settings, cli.verbose));
    if let Some(path) = logger.log_path() {
        tracing::info!("Logging to {}", path.display());
    }

    let dirs = BatchDirs::new(
        cli.asset_dir,
        cli.metadata_dir,
        cli.output_dir,
        cli.metadata_output_dir,
    );

    let report = run_batch(dirs, settings, Arc::new(SystemRunner::new()), logger)
        .context("Batch failed")?;

    if let Some(path) = cli.report {
        write_report(&report, &path)?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Load settings from an explicit path, the default file, or built-in defaults.
///
/// Only an explicitly given file is required to load.
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        let mut manager = ConfigManager::new(path);
        manager
            .load()
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        return Ok(manager.into_settings());
    }

    let mut manager = ConfigManager::new(DEFAULT_CONFIG_FILE);
    if !manager.path().exists() {
        return Ok(Settings::default());
    }

    match manager.load() {
        Ok(()) => Ok(manager.into_settings()),
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", DEFAULT_CONFIG_FILE, e);
            Ok(Settings::default())
        }
    }
}

/// Per-run logger writing under the configured logs folder.
///
/// Falls back to console-only logging if the log file cannot be created.
fn create_logger(settings: &Settings, verbose: bool) -> RunLogger {
    let mut config = settings.logging.log_config();
    if verbose {
        config.level = LogLevel::Debug;
    }

    let run_name = default_run_name();
    let logs_folder = &settings.logging.logs_folder;
    if logs_folder.is_empty() {
        return RunLogger::console(run_name, config);
    }

    match RunLogger::new(&run_name, logs_folder, config.clone()) {
        Ok(logger) => logger,
        Err(e) => {
            tracing::warn!("Cannot create log file in {}: {}", logs_folder, e);
            RunLogger::console(run_name, config)
        }
    }
}

fn write_report(report: &BatchReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))
}
