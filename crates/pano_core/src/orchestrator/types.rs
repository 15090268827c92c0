//! Core types for the batch pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::RunLogger;
use crate::models::{BatchReport, CorrelationOutcome, Diagnostic, ResolvedUnit, UnitOutcome};
use crate::process::ProcessRunner;

use super::pipeline::CancelHandle;

/// Directories a batch run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDirs {
    /// Raw captures (`.insp`, `.insv`).
    pub asset_dir: PathBuf,
    /// Sidecar `.json` files.
    pub metadata_dir: PathBuf,
    /// Stitched deliverables.
    pub output_dir: PathBuf,
    /// Where copied sidecars go; defaults to `output_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_output_dir: Option<PathBuf>,
}

impl BatchDirs {
    pub fn new(
        asset_dir: impl Into<PathBuf>,
        metadata_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        metadata_output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            metadata_dir: metadata_dir.into(),
            output_dir: output_dir.into(),
            metadata_output_dir,
        }
    }

    /// Directory copied sidecars are written to.
    pub fn sidecar_destination(&self) -> &Path {
        self.metadata_output_dir
            .as_deref()
            .unwrap_or(self.output_dir.as_path())
    }
}

/// Read-only context passed to pipeline steps.
///
/// Contains run configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `BatchState`.
pub struct Context {
    pub dirs: BatchDirs,
    /// Application settings.
    pub settings: Settings,
    /// Run name, used in errors and the log file name.
    pub run_name: String,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    /// Launches the stitcher and embedder.
    pub runner: Arc<dyn ProcessRunner>,
    /// Checked between units.
    pub cancel: CancelHandle,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(
        dirs: BatchDirs,
        settings: Settings,
        run_name: impl Into<String>,
        logger: Arc<RunLogger>,
        runner: Arc<dyn ProcessRunner>,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            dirs,
            settings,
            run_name: run_name.into(),
            logger,
            runner,
            cancel,
        }
    }
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Each step writes its own section once; diagnostics are appended by
/// every step in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchState {
    pub run_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    /// Resolution results (from Resolve step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolveOutput>,
    /// Dispatch results (from Stitch step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stitch: Option<StitchOutput>,
    /// Correlation results (from Correlate step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelateOutput>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchState {
    /// Create a new state with the given ID.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Units resolved so far (empty before the Resolve step).
    pub fn units(&self) -> &[ResolvedUnit] {
        self.resolution
            .as_ref()
            .map(|r| r.units.as_slice())
            .unwrap_or(&[])
    }

    /// Record and log diagnostics.
    pub fn record(
        &mut self,
        logger: &RunLogger,
        diagnostics: impl IntoIterator<Item = Diagnostic>,
    ) {
        for diagnostic in diagnostics {
            logger.warn(&diagnostic.to_string());
            self.diagnostics.push(diagnostic);
        }
    }

    /// Convert the accumulated state into the final report.
    pub fn into_report(self) -> BatchReport {
        BatchReport {
            started_at: self.started_at,
            finished_at: Some(chrono::Local::now().to_rfc3339()),
            units: self.resolution.map(|r| r.units).unwrap_or_default(),
            stitch: self.stitch.map(|s| s.outcomes).unwrap_or_default(),
            correlation: self.correlation.map(|c| c.outcomes).unwrap_or_default(),
            diagnostics: self.diagnostics,
        }
    }
}

/// Output from the Resolve step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveOutput {
    /// Units in dispatch order, with unique output basenames.
    pub units: Vec<ResolvedUnit>,
}

/// Output from the Stitch step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StitchOutput {
    pub outcomes: Vec<UnitOutcome>,
}

/// Output from the Correlate step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelateOutput {
    pub outcomes: Vec<CorrelationOutcome>,
}

/// Outcome of a step execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (with reason).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use crate::models::DiagnosticKind;

    #[test]
    fn sidecar_destination_defaults_to_output() {
        let dirs = BatchDirs::new("/in", "/meta", "/out", None);
        assert_eq!(dirs.sidecar_destination(), Path::new("/out"));

        let dirs = BatchDirs::new("/in", "/meta", "/out", Some(PathBuf::from("/sidecars")));
        assert_eq!(dirs.sidecar_destination(), Path::new("/sidecars"));
    }

    #[test]
    fn batch_state_starts_empty() {
        let state = BatchState::new("run-1");
        assert_eq!(state.run_id, "run-1");
        assert!(state.started_at.is_some());
        assert!(state.units().is_empty());
    }

    #[test]
    fn record_appends_in_order() {
        let logger = RunLogger::console("state-test", LogConfig::default());
        let mut state = BatchState::new("run-1");

        state.record(
            &logger,
            vec![
                Diagnostic::skipped_file("/in/a.txt", "unrecognized extension 'txt'"),
                Diagnostic::io_failure("/in/b", "unreadable"),
            ],
        );

        assert_eq!(state.diagnostics.len(), 2);
        assert_eq!(state.diagnostics[1].kind, DiagnosticKind::IoFailure);
    }

    #[test]
    fn into_report_stamps_finish_time() {
        let report = BatchState::new("run-1").into_report();
        assert!(report.started_at.is_some());
        assert!(report.finished_at.is_some());
        assert!(report.units.is_empty());
    }
}
