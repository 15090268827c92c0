//! Join of sidecar records against stitched deliverables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::logging::RunLogger;
use crate::models::{
    CorrelationOutcome, CorrelationStatus, Diagnostic, DiagnosticKind, MediaClass, MetadataRecord,
};
use crate::scan::{snapshot, ScanError, ScanResult};

use super::action::{CorrelationAction, MatchedRecord};

const SIDECAR_EXTENSION: &str = "json";

/// Outcomes of one correlation pass.
#[derive(Debug, Clone, Default)]
pub struct Correlation {
    /// One outcome per sidecar record, sorted by sidecar file name.
    pub outcomes: Vec<CorrelationOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Deliverables in the output directory, keyed by basename.
#[derive(Debug, Clone, Default)]
pub struct DeliverableIndex {
    by_basename: BTreeMap<String, PathBuf>,
}

impl DeliverableIndex {
    /// Index every non-sidecar file in `output_dir`.
    ///
    /// A missing output directory gives an empty index. When several files
    /// share a basename the first by name wins.
    pub fn build(output_dir: &Path) -> ScanResult<Self> {
        let snap = match snapshot(output_dir) {
            Ok(snap) => snap,
            Err(ScanError::NotFound(_)) => return Ok(Self::default()),
            Err(e) => return Err(e),
        };

        let mut index = Self::default();
        for entry in snap.entries {
            if is_sidecar(entry.extension.as_deref()) {
                continue;
            }
            if let Some(existing) = index.by_basename.get(&entry.basename) {
                tracing::warn!(
                    "Deliverable {} shares its basename with {}, ignoring it",
                    entry.path.display(),
                    existing.display()
                );
                continue;
            }
            index.by_basename.insert(entry.basename, entry.path);
        }

        Ok(index)
    }

    pub fn get(&self, basename: &str) -> Option<&Path> {
        self.by_basename.get(basename).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.by_basename.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_basename.is_empty()
    }
}

/// Collect the `.json` sidecars of the metadata source directory.
pub fn collect_records(metadata_dir: &Path) -> ScanResult<(Vec<MetadataRecord>, Vec<Diagnostic>)> {
    let snap = snapshot(metadata_dir)?;

    let records = snap
        .entries
        .into_iter()
        .filter(|entry| is_sidecar(entry.extension.as_deref()))
        .map(|entry| MetadataRecord::new(entry.basename, entry.path))
        .collect();

    Ok((records, snap.diagnostics))
}

fn is_sidecar(extension: Option<&str>) -> bool {
    extension.is_some_and(|ext| ext.eq_ignore_ascii_case(SIDECAR_EXTENSION))
}

/// Applies a [`CorrelationAction`] to every sidecar that has a deliverable.
pub struct MetadataCorrelator<'a> {
    action: &'a dyn CorrelationAction,
    logger: &'a RunLogger,
}

impl<'a> MetadataCorrelator<'a> {
    pub fn new(action: &'a dyn CorrelationAction, logger: &'a RunLogger) -> Self {
        Self { action, logger }
    }

    /// Correlate `metadata_dir` against `output_dir`, writing copies into
    /// `destination_dir`.
    ///
    /// Fails only if the metadata directory cannot be scanned; every per-record
    /// problem becomes a diagnostic.
    pub fn correlate(
        &self,
        metadata_dir: &Path,
        output_dir: &Path,
        destination_dir: &Path,
    ) -> ScanResult<Correlation> {
        let (records, scan_diagnostics) = collect_records(metadata_dir)?;
        let index = DeliverableIndex::build(output_dir)?;

        self.logger.info(&format!(
            "Correlating {} sidecar(s) against {} deliverable(s) ({} mode)",
            records.len(),
            index.len(),
            self.action.name()
        ));

        let mut correlation = Correlation {
            diagnostics: scan_diagnostics,
            ..Correlation::default()
        };

        for record in records {
            let (outcome, diagnostic) = self.correlate_one(record, &index, destination_dir);
            if let Some(diagnostic) = diagnostic {
                self.logger.warn(&diagnostic.to_string());
                correlation.diagnostics.push(diagnostic);
            }
            correlation.outcomes.push(outcome);
        }

        Ok(correlation)
    }

    fn correlate_one(
        &self,
        record: MetadataRecord,
        index: &DeliverableIndex,
        destination_dir: &Path,
    ) -> (CorrelationOutcome, Option<Diagnostic>) {
        let Some(deliverable) = index.get(&record.basename) else {
            self.logger
                .debug(&format!("No deliverable for sidecar '{}'", record.basename));
            return (
                CorrelationOutcome {
                    record,
                    deliverable: None,
                    status: CorrelationStatus::NoDeliverable,
                },
                None,
            );
        };
        let deliverable = deliverable.to_path_buf();

        let extension = deliverable
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(class) = MediaClass::from_extension(&extension) else {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::UnsupportedFormat,
                &deliverable,
                format!("no metadata handling for '{}' deliverables", extension),
            );
            return (
                CorrelationOutcome {
                    record,
                    deliverable: Some(deliverable),
                    status: CorrelationStatus::UnsupportedFormat,
                },
                Some(diagnostic),
            );
        };

        let destination =
            destination_dir.join(format!("{}.{}", record.basename, SIDECAR_EXTENSION));

        if self.action.guards_destination() && destination.exists() {
            self.logger
                .info(&format!("{} already present, skipping", destination.display()));
            return (
                CorrelationOutcome {
                    record,
                    deliverable: Some(deliverable),
                    status: CorrelationStatus::AlreadyPresent,
                },
                None,
            );
        }

        let matched = MatchedRecord {
            record: &record,
            deliverable: &deliverable,
            class,
            destination: &destination,
        };

        let (status, diagnostic) = match self.action.apply(&matched, self.logger) {
            Ok(status) => {
                self.logger.success(&format!(
                    "{}: {}",
                    record.basename,
                    status_label(&status)
                ));
                (status, None)
            }
            Err(e) => {
                let diagnostic =
                    Diagnostic::new(e.diagnostic_kind(), &record.sidecar_path, e.to_string());
                (
                    CorrelationStatus::Failed {
                        message: e.to_string(),
                    },
                    Some(diagnostic),
                )
            }
        };

        (
            CorrelationOutcome {
                record,
                deliverable: Some(deliverable),
                status,
            },
            diagnostic,
        )
    }
}

fn status_label(status: &CorrelationStatus) -> &'static str {
    match status {
        CorrelationStatus::Copied => "sidecar copied",
        CorrelationStatus::Embedded => "metadata embedded",
        CorrelationStatus::CopiedAndEmbedded => "sidecar copied and embedded",
        CorrelationStatus::AlreadyPresent => "already present",
        CorrelationStatus::NoDeliverable => "no deliverable",
        CorrelationStatus::UnsupportedFormat => "unsupported format",
        CorrelationStatus::Failed { .. } => "failed",
    }
}
