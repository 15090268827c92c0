//! Correlate step - pairs sidecar metadata with the stitched deliverables.

use crate::correlate::{build_action, MetadataCorrelator};
use crate::models::{Diagnostic, DiagnosticKind};
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::{OnFailure, PipelineStep};
use crate::orchestrator::types::{BatchState, Context, CorrelateOutput, StepOutcome};

/// Correlate step for copying or embedding sidecar metadata.
///
/// A missing metadata directory is a diagnostic, not a failure. Any other
/// error is recorded as a diagnostic too, so stitched output is never
/// thrown away over sidecars.
pub struct CorrelateStep;

impl CorrelateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CorrelateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CorrelateStep {
    fn name(&self) -> &'static str {
        "Correlate"
    }

    fn execute(&self, ctx: &Context, state: &mut BatchState) -> StepResult<StepOutcome> {
        let metadata_dir = &ctx.dirs.metadata_dir;

        if !metadata_dir.is_dir() {
            state.record(
                &ctx.logger,
                [Diagnostic::new(
                    DiagnosticKind::NotFound,
                    metadata_dir,
                    "metadata source directory does not exist",
                )],
            );
            state.correlation = Some(CorrelateOutput::default());
            return Ok(StepOutcome::Skipped(
                "Metadata source directory not found".to_string(),
            ));
        }

        let mode = ctx.settings.metadata.mode;
        let action = build_action(mode, &ctx.settings, ctx.runner.as_ref());
        let destination = ctx.dirs.sidecar_destination();

        ctx.logger.info(&format!(
            "Correlating {} -> {} ({} mode)",
            metadata_dir.display(),
            destination.display(),
            mode
        ));

        let correlation = MetadataCorrelator::new(action.as_ref(), &ctx.logger).correlate(
            metadata_dir,
            &ctx.dirs.output_dir,
            destination,
        )?;

        // Correlator already logged per-record diagnostics
        state.diagnostics.extend(correlation.diagnostics);
        state.correlation = Some(CorrelateOutput {
            outcomes: correlation.outcomes,
        });

        Ok(StepOutcome::Success)
    }

    fn on_failure(&self) -> OnFailure {
        OnFailure::Record
    }
}
