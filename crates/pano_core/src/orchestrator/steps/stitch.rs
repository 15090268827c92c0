//! Stitch step - builds one stitcher command per unit and runs them in order.

use std::fs;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{BatchState, Context, StepOutcome, StitchOutput};
use crate::stitch::{StitchCommandBuilder, StitchDispatcher};

/// Stitch step for dispatching resolved units to the stitcher.
///
/// Tool failures are recorded per unit and never fail the step.
pub struct StitchStep;

impl StitchStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StitchStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for StitchStep {
    fn name(&self) -> &'static str {
        "Stitch"
    }

    fn execute(&self, ctx: &Context, state: &mut BatchState) -> StepResult<StepOutcome> {
        if ctx.settings.tools.stitcher.trim().is_empty() {
            return Err(StepError::ToolNotConfigured {
                setting: "tools.stitcher",
            });
        }

        fs::create_dir_all(&ctx.dirs.output_dir)
            .map_err(|e| StepError::io("create output directory", &ctx.dirs.output_dir, e))?;

        if state.units().is_empty() {
            state.stitch = Some(StitchOutput::default());
            return Ok(StepOutcome::Skipped("No units to stitch".to_string()));
        }

        let builder = StitchCommandBuilder::new(
            &ctx.settings.tools.stitcher,
            &ctx.settings.stitch,
            &ctx.dirs.output_dir,
        );
        let commands = builder.build_all(state.units());

        ctx.logger.info(&format!(
            "Stitching {} unit(s) into {}",
            commands.len(),
            ctx.dirs.output_dir.display()
        ));

        let dispatch = StitchDispatcher::new(ctx.runner.as_ref(), &ctx.logger)
            .with_cancel(ctx.cancel.clone())
            .dispatch(&commands);

        ctx.logger.info(&format!(
            "Stitched {}/{} unit(s), {} failed",
            dispatch.succeeded(),
            commands.len(),
            dispatch.failed()
        ));

        // Dispatcher already logged each failure
        state.diagnostics.extend(dispatch.diagnostics);
        state.stitch = Some(StitchOutput {
            outcomes: dispatch.outcomes,
        });

        Ok(StepOutcome::Success)
    }
}
