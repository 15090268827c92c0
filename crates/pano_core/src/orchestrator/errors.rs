//! Error types for the batch pipeline.
//!
//! Only directory-level problems are errors. Per-unit failures are
//! diagnostics in the batch report.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Diagnostic, DiagnosticKind};
use crate::scan::ScanError;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The asset directory is missing or not a directory.
    #[error("Asset directory not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Run '{run_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        run_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    #[error("Run '{run_name}' was cancelled")]
    Cancelled { run_name: String },
}

impl PipelineError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn step_failed(
        run_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            run_name: run_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    pub fn cancelled(run_name: impl Into<String>) -> Self {
        Self::Cancelled {
            run_name: run_name.into(),
        }
    }

    /// Whether the run failed because a required directory is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            PipelineError::NotFound { .. } => true,
            PipelineError::StepFailed { source, .. } => {
                matches!(source, StepError::Scan(ScanError::NotFound(_)))
            }
            PipelineError::Cancelled { .. } => false,
        }
    }
}

/// Error that stops a single step.
#[derive(Error, Debug)]
pub enum StepError {
    /// A required tool setting is empty.
    #[error("No executable configured for '{setting}'")]
    ToolNotConfigured { setting: &'static str },

    #[error("Failed to {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory could not be scanned.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl StepError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            StepError::ToolNotConfigured { .. } => None,
            StepError::Io { path, .. } => Some(path),
            StepError::Scan(e) => Some(e.path()),
        }
    }

    /// Diagnostic recorded in place of this error when the step's failure
    /// does not end the batch.
    pub fn to_diagnostic(&self, step_name: &str) -> Diagnostic {
        let kind = match self {
            StepError::Scan(ScanError::NotFound(_)) => DiagnosticKind::NotFound,
            _ => DiagnosticKind::IoFailure,
        };
        Diagnostic::new(
            kind,
            self.path().map(Path::to_path_buf).unwrap_or_default(),
            format!("{} step abandoned: {}", step_name, self),
        )
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn unreadable(path: &str) -> StepError {
        StepError::Scan(ScanError::ReadDir {
            path: PathBuf::from(path),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        })
    }

    #[test]
    fn io_error_names_operation_and_path() {
        let err = StepError::io(
            "create output directory",
            "/out",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("create output directory /out"));
        assert!(msg.contains("denied"));
        assert_eq!(err.path(), Some(Path::new("/out")));
    }

    #[test]
    fn step_failure_carries_run_and_step() {
        let err = PipelineError::step_failed("batch_20240101", "Stitch", unreadable("/raw"));

        let msg = err.to_string();
        assert!(msg.contains("batch_20240101"));
        assert!(msg.contains("Stitch"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn scan_not_found_is_not_found() {
        let err = PipelineError::step_failed(
            "batch",
            "Resolve",
            StepError::from(ScanError::NotFound(PathBuf::from("/gone"))),
        );
        assert!(err.is_not_found());
        assert!(!PipelineError::cancelled("batch").is_not_found());
    }

    #[test]
    fn diagnostic_keeps_offending_path() {
        let diagnostic = unreadable("/meta").to_diagnostic("Correlate");
        assert_eq!(diagnostic.kind, DiagnosticKind::IoFailure);
        assert_eq!(diagnostic.path, PathBuf::from("/meta"));
        assert!(diagnostic.message.contains("Correlate"));

        let missing = StepError::from(ScanError::NotFound(PathBuf::from("/meta")));
        assert_eq!(missing.to_diagnostic("Correlate").kind, DiagnosticKind::NotFound);
    }
}
