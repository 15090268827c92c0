//! Sequential step runner and cancellation flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::errors::{PipelineError, PipelineResult};
use super::step::{OnFailure, PipelineStep};
use super::types::{BatchState, Context, StepOutcome};

/// Runs steps in order against one [`BatchState`].
///
/// Cancellation is checked before each step. A failing step either ends the
/// run or, if it asks for [`OnFailure::Record`], leaves a diagnostic and the
/// run moves on.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
    cancel: CancelHandle,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing cancellation flag.
    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = handle;
        self
    }

    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, ctx: &Context, state: &mut BatchState) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult::default();

        for step in &self.steps {
            let name = step.name();
            if self.cancel.is_cancelled() {
                ctx.logger.warn(&format!("Cancelled before step '{}'", name));
                return Err(PipelineError::cancelled(&ctx.run_name));
            }

            ctx.logger.phase(name);

            match step.execute(ctx, state) {
                Ok(StepOutcome::Success) => {
                    ctx.logger.success(&format!("{} completed", name));
                    result.steps_completed.push(name);
                }
                Ok(StepOutcome::Skipped(reason)) => {
                    ctx.logger.info(&format!("{} skipped: {}", name, reason));
                    result.steps_skipped.push(name);
                }
                Err(e) if step.on_failure() == OnFailure::Record => {
                    state.record(&ctx.logger, [e.to_diagnostic(name)]);
                    result.steps_skipped.push(name);
                }
                Err(e) => {
                    ctx.logger.error(&format!("{} failed: {}", name, e));
                    return Err(PipelineError::step_failed(&ctx.run_name, name, e));
                }
            }
        }

        Ok(result)
    }
}

/// Handle for cancelling a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    ///
    /// Work stops at the next step or unit boundary; a running external
    /// process is never interrupted.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Steps that ran, by name.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunResult {
    pub steps_completed: Vec<&'static str>,
    /// Skipped by the step itself, or failed with [`OnFailure::Record`].
    pub steps_skipped: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::{LogConfig, RunLogger};
    use crate::models::DiagnosticKind;
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::orchestrator::types::BatchDirs;
    use crate::process::testing::RecordingRunner;
    use crate::scan::ScanError;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Skip,
        Fail(OnFailure),
    }

    struct ScriptedStep {
        name: &'static str,
        behaviour: Behaviour,
        runs: Arc<AtomicUsize>,
    }

    impl PipelineStep for ScriptedStep {
        fn name(&self) -> &'static str {
            self.name
        }

        fn execute(&self, _ctx: &Context, _state: &mut BatchState) -> StepResult<StepOutcome> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed => Ok(StepOutcome::Success),
                Behaviour::Skip => Ok(StepOutcome::Skipped("nothing to do".to_string())),
                Behaviour::Fail(_) => Err(StepError::Scan(ScanError::ReadDir {
                    path: PathBuf::from("/meta"),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                })),
            }
        }

        fn on_failure(&self) -> OnFailure {
            match self.behaviour {
                Behaviour::Fail(policy) => policy,
                _ => OnFailure::Abort,
            }
        }
    }

    fn step(name: &'static str, behaviour: Behaviour, runs: &Arc<AtomicUsize>) -> ScriptedStep {
        ScriptedStep {
            name,
            behaviour,
            runs: Arc::clone(runs),
        }
    }

    fn context(cancel: CancelHandle) -> Context {
        Context::new(
            BatchDirs::new("/in", "/meta", "/out", None),
            Settings::default(),
            "pipeline-test",
            Arc::new(RunLogger::console("pipeline-test", LogConfig::default())),
            Arc::new(RecordingRunner::new()),
            cancel,
        )
    }

    #[test]
    fn runs_steps_and_tracks_skips() {
        let runs = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("Step1", Behaviour::Succeed, &runs))
            .with_step(step("Step2", Behaviour::Skip, &runs));
        let ctx = context(CancelHandle::new());
        let mut state = BatchState::new("run");

        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(pipeline.step_names(), vec!["Step1", "Step2"]);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(result.steps_completed, vec!["Step1"]);
        assert_eq!(result.steps_skipped, vec!["Step2"]);
    }

    #[test]
    fn recorded_failure_keeps_the_run_going() {
        let runs = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("Correlate", Behaviour::Fail(OnFailure::Record), &runs))
            .with_step(step("After", Behaviour::Succeed, &runs));
        let ctx = context(CancelHandle::new());
        let mut state = BatchState::new("run");

        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(result.steps_skipped, vec!["Correlate"]);
        assert_eq!(result.steps_completed, vec!["After"]);
        assert_eq!(state.diagnostics.len(), 1);
        assert_eq!(state.diagnostics[0].kind, DiagnosticKind::IoFailure);
        assert_eq!(state.diagnostics[0].path, PathBuf::from("/meta"));
    }

    #[test]
    fn aborting_failure_stops_the_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("Stitch", Behaviour::Fail(OnFailure::Abort), &runs))
            .with_step(step("After", Behaviour::Succeed, &runs));
        let ctx = context(CancelHandle::new());
        let mut state = BatchState::new("run");

        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::StepFailed { ref step_name, .. } if step_name == "Stitch"
        ));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(state.diagnostics.is_empty());
    }

    #[test]
    fn cancelled_pipeline_runs_nothing() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = CancelHandle::new();
        let pipeline = Pipeline::new()
            .with_cancel_handle(handle.clone())
            .with_step(step("Step1", Behaviour::Succeed, &runs));
        let ctx = context(handle.clone());
        let mut state = BatchState::new("run");

        handle.cancel();
        let result = pipeline.run(&ctx, &mut state);

        assert!(matches!(result, Err(PipelineError::Cancelled { .. })));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
