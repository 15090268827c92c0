//! Per-unit diagnostics and the structured run report.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::assets::{MetadataRecord, ResolvedUnit};

/// Category of a non-fatal problem found during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A directory the run depends on is missing.
    NotFound,
    /// Unrecognized extension or eye marker.
    SkippedFile,
    /// Deliverable format the correlator cannot handle.
    UnsupportedFormat,
    /// Primary eye without its secondary.
    MissingPartner,
    /// Unit would overwrite another unit's output.
    DuplicateOutput,
    /// External tool failed or could not be launched.
    ProcessFailure,
    /// Filesystem error on a single entry or sidecar.
    IoFailure,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiagnosticKind::NotFound => "NotFound",
            DiagnosticKind::SkippedFile => "SkippedFile",
            DiagnosticKind::UnsupportedFormat => "UnsupportedFormat",
            DiagnosticKind::MissingPartner => "MissingPartner",
            DiagnosticKind::DuplicateOutput => "DuplicateOutput",
            DiagnosticKind::ProcessFailure => "ProcessFailure",
            DiagnosticKind::IoFailure => "IoFailure",
        };
        f.write_str(name)
    }
}

/// A non-fatal problem tied to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: PathBuf,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn skipped_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::SkippedFile, path, message)
    }

    pub fn missing_partner(primary: impl Into<PathBuf>, expected: &Path) -> Self {
        Self::new(
            DiagnosticKind::MissingPartner,
            primary,
            format!("secondary eye not found at {}", expected.display()),
        )
    }

    pub fn io_failure(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::IoFailure, path, message)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.path.display(), self.message)
    }
}

/// How a single stitch dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Succeeded,
    /// Exited non-zero (`None` when killed by a signal).
    Failed { exit_code: Option<i32> },
    /// Could not be started at all.
    LaunchFailed { message: String },
    /// Not dispatched because the run was cancelled.
    Cancelled,
}

impl UnitStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, UnitStatus::Succeeded)
    }
}

/// Record of one stitch dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOutcome {
    pub output_basename: String,
    pub output_path: PathBuf,
    /// Command line exactly as logged before execution.
    pub command_line: String,
    #[serde(flatten)]
    pub status: UnitStatus,
}

/// What the correlator did with one sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationStatus {
    Copied,
    Embedded,
    CopiedAndEmbedded,
    /// Destination sidecar already existed; nothing written.
    AlreadyPresent,
    /// No deliverable with this basename.
    NoDeliverable,
    UnsupportedFormat,
    Failed { message: String },
}

/// A sidecar paired with the deliverable it was matched to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationOutcome {
    pub record: MetadataRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliverable: Option<PathBuf>,
    #[serde(flatten)]
    pub status: CorrelationStatus,
}

/// Everything a run produced, in a form suitable for JSON output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    /// Units that survived resolution, in dispatch order.
    pub units: Vec<ResolvedUnit>,
    pub stitch: Vec<UnitOutcome>,
    pub correlation: Vec<CorrelationOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    pub fn summary(&self) -> BatchSummary {
        let stitched = self.stitch.iter().filter(|o| o.status.is_success()).count();
        let sidecars_written = self
            .correlation
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    CorrelationStatus::Copied
                        | CorrelationStatus::Embedded
                        | CorrelationStatus::CopiedAndEmbedded
                )
            })
            .count();
        let sidecars_skipped = self
            .correlation
            .iter()
            .filter(|o| o.status == CorrelationStatus::AlreadyPresent)
            .count();

        BatchSummary {
            units: self.units.len(),
            stitched,
            stitch_failed: self.stitch.len() - stitched,
            sidecars_written,
            sidecars_skipped,
            diagnostics: self.diagnostics.len(),
        }
    }
}

/// Counts shown at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub units: usize,
    pub stitched: usize,
    pub stitch_failed: usize,
    pub sidecars_written: usize,
    pub sidecars_skipped: usize,
    pub diagnostics: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} units, {} stitched, {} failed, {} sidecars written, {} already present, \
             {} diagnostics",
            self.units,
            self.stitched,
            self.stitch_failed,
            self.sidecars_written,
            self.sidecars_skipped,
            self.diagnostics
        )
    }
}
