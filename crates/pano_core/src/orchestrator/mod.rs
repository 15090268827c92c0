//! Pipeline orchestrator for coordinating a batch run.
//!
//! A batch is a fixed sequence of steps sharing one read-only [`Context`]
//! and one accumulating [`BatchState`]. Resolve and Stitch failures end the
//! run; a Correlate failure only adds a diagnostic.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Resolve    (scan assets, pair stereo eyes)
//!     ├── Step: Stitch     (one stitcher run per unit)
//!     └── Step: Correlate  (copy/embed sidecar metadata)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pano_core::orchestrator::{run_batch, BatchDirs};
//!
//! let dirs = BatchDirs::new("raw", "meta", "out", None);
//! let report = run_batch(dirs, settings, Arc::new(SystemRunner::new()), logger)?;
//! println!("{}", report.summary());
//! ```

mod batch;
mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use batch::{default_run_name, run_batch, run_batch_with_cancel};
pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::{OnFailure, PipelineStep};
pub use steps::{CorrelateStep, ResolveStep, StitchStep};
pub use types::{
    BatchDirs, BatchState, Context, CorrelateOutput, ResolveOutput, StepOutcome, StitchOutput,
};

/// Create a standard pipeline with all steps in the correct order.
///
/// 1. Resolve - scan the asset directory and build units
/// 2. Stitch - run the stitcher for each unit
/// 3. Correlate - attach sidecar metadata to the deliverables
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ResolveStep::new())
        .with_step(StitchStep::new())
        .with_step(CorrelateStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_order() {
        assert_eq!(
            create_standard_pipeline().step_names(),
            vec!["Resolve", "Stitch", "Correlate"]
        );
    }

    #[test]
    fn only_correlate_survives_its_own_failure() {
        assert_eq!(ResolveStep::new().on_failure(), OnFailure::Abort);
        assert_eq!(StitchStep::new().on_failure(), OnFailure::Abort);
        assert_eq!(CorrelateStep::new().on_failure(), OnFailure::Record);
    }
}
