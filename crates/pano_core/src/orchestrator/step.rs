//! One phase of a batch run.

use super::errors::StepResult;
use super::types::{BatchState, Context, StepOutcome};

/// What a step's error does to the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    /// Stop the batch and return the error.
    #[default]
    Abort,
    /// Record the error as a diagnostic and keep the work done so far.
    Record,
}

/// A phase of the batch pipeline.
///
/// Steps read the run [`Context`] and write their results into
/// [`BatchState`]. Per-file problems belong in `state.diagnostics`; an `Err`
/// is reserved for problems that leave the step unable to do anything.
pub trait PipelineStep: Send + Sync {
    /// Name used in log phases and errors.
    fn name(&self) -> &'static str;

    fn execute(&self, ctx: &Context, state: &mut BatchState) -> StepResult<StepOutcome>;

    fn on_failure(&self) -> OnFailure {
        OnFailure::Abort
    }
}
