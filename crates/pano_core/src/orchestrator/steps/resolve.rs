//! Resolve step - scans the asset directory and pairs captures into units.

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{BatchState, Context, ResolveOutput, StepOutcome};
use crate::pairing::PairingResolver;
use crate::scan::snapshot;

/// Resolve step for turning raw captures into stitch units.
///
/// Takes one snapshot of the asset directory, so files appearing while the
/// batch runs are not picked up.
pub struct ResolveStep;

impl ResolveStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResolveStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ResolveStep {
    fn name(&self) -> &'static str {
        "Resolve"
    }

    fn execute(&self, ctx: &Context, state: &mut BatchState) -> StepResult<StepOutcome> {
        ctx.logger
            .info(&format!("Scanning {}", ctx.dirs.asset_dir.display()));

        let snap = snapshot(&ctx.dirs.asset_dir)?;
        state.record(&ctx.logger, snap.diagnostics);

        let file_count = snap.entries.len();
        let resolution = PairingResolver::new(&ctx.settings.stitch).resolve(snap.entries);
        state.record(&ctx.logger, resolution.diagnostics);

        ctx.logger.info(&format!(
            "Resolved {} unit(s) from {} file(s)",
            resolution.units.len(),
            file_count
        ));
        for unit in &resolution.units {
            ctx.logger.debug(&format!(
                "  {} '{}' <- {}",
                unit.kind,
                unit.output_basename,
                unit.inputs
                    .iter()
                    .map(|i| i.file_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        state.resolution = Some(ResolveOutput {
            units: resolution.units,
        });

        Ok(StepOutcome::Success)
    }
}
