//! Entry point for running one batch through the standard pipeline.

use std::sync::Arc;

use crate::config::Settings;
use crate::logging::RunLogger;
use crate::models::BatchReport;
use crate::process::ProcessRunner;

use super::errors::{PipelineError, PipelineResult};
use super::pipeline::CancelHandle;
use super::types::{BatchDirs, BatchState, Context};
use super::create_standard_pipeline;

/// Run name derived from the current local time, e.g. `batch_20240101_103000`.
pub fn default_run_name() -> String {
    chrono::Local::now().format("batch_%Y%m%d_%H%M%S").to_string()
}

/// Run one batch: resolve, stitch, correlate.
///
/// Fails only when the asset directory is missing or a step cannot run at
/// all. External tool failures and per-file problems end up in the report.
pub fn run_batch(
    dirs: BatchDirs,
    settings: Settings,
    runner: Arc<dyn ProcessRunner>,
    logger: Arc<RunLogger>,
) -> PipelineResult<BatchReport> {
    run_batch_with_cancel(dirs, settings, runner, logger, CancelHandle::new())
}

/// [`run_batch`] with a cancellation handle.
///
/// A cancelled run still returns the partial report; units that were never
/// dispatched are marked cancelled.
pub fn run_batch_with_cancel(
    dirs: BatchDirs,
    settings: Settings,
    runner: Arc<dyn ProcessRunner>,
    logger: Arc<RunLogger>,
    cancel: CancelHandle,
) -> PipelineResult<BatchReport> {
    if !dirs.asset_dir.is_dir() {
        logger.error(&format!(
            "Asset directory not found: {}",
            dirs.asset_dir.display()
        ));
        return Err(PipelineError::not_found(&dirs.asset_dir));
    }

    let run_name = logger.run_name().to_string();

    logger.section(&format!("Batch {}", run_name));
    logger.info(&format!("Assets:   {}", dirs.asset_dir.display()));
    logger.info(&format!("Metadata: {}", dirs.metadata_dir.display()));
    logger.info(&format!("Output:   {}", dirs.output_dir.display()));
    if let Some(ref sidecars) = dirs.metadata_output_dir {
        logger.info(&format!("Sidecars: {}", sidecars.display()));
    }

    let pipeline = create_standard_pipeline().with_cancel_handle(cancel.clone());
    let ctx = Context::new(dirs, settings, &run_name, Arc::clone(&logger), runner, cancel);
    let mut state = BatchState::new(&run_name);

    match pipeline.run(&ctx, &mut state) {
        Ok(run_result) => {
            logger.debug(&format!(
                "Steps completed: {:?}, skipped: {:?}",
                run_result.steps_completed, run_result.steps_skipped
            ));
        }
        Err(PipelineError::Cancelled { .. }) => {
            logger.warn("Batch cancelled, report is partial");
        }
        Err(e) => {
            logger.error(&format!("Batch failed: {}", e));
            logger.flush();
            return Err(e);
        }
    }

    let report = state.into_report();
    logger.success(&format!("Batch finished: {}", report.summary()));
    logger.flush();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use crate::models::{CorrelationMode, CorrelationStatus, DiagnosticKind, UnitKind, UnitStatus};
    use crate::process::testing::{Invocation, RecordingRunner, Scripted};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _root: TempDir,
        assets: PathBuf,
        meta: PathBuf,
        out: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempdir().unwrap();
            let assets = root.path().join("assets");
            let meta = root.path().join("meta");
            let out = root.path().join("out");
            fs::create_dir_all(&assets).unwrap();
            fs::create_dir_all(&meta).unwrap();
            Self {
                _root: root,
                assets,
                meta,
                out,
            }
        }

        fn asset(&self, name: &str) {
            fs::write(self.assets.join(name), b"raw").unwrap();
        }

        fn sidecar(&self, name: &str, body: &str) {
            fs::write(self.meta.join(name), body).unwrap();
        }

        fn dirs(&self) -> BatchDirs {
            BatchDirs::new(&self.assets, &self.meta, &self.out, None)
        }
    }

    /// Runner that creates the `-output` file like the real stitcher.
    fn stitcher() -> Arc<RecordingRunner> {
        Arc::new(RecordingRunner::new().with_hook(write_output))
    }

    fn write_output(invocation: &Invocation) {
        if let Some(i) = invocation.args.iter().position(|a| a == "-output") {
            fs::write(&invocation.args[i + 1], b"stitched").unwrap();
        }
    }

    fn logger() -> Arc<RunLogger> {
        crate::logging::init_test_tracing();
        Arc::new(RunLogger::console("batch-test", LogConfig::default()))
    }

    #[test]
    fn full_batch_stitches_and_copies() {
        let fx = Fixture::new();
        fx.asset("scene_00_001.insv");
        fx.asset("scene_10_001.insv");
        fx.asset("panorama.insp");
        fx.asset("notes.txt");
        fx.sidecar("scene.json", r#"{"scene": true}"#);
        fx.sidecar("panorama.json", "{}");
        fx.sidecar("orphan.json", "{}");

        let runner = stitcher();
        let report = run_batch(fx.dirs(), Settings::default(), runner.clone(), logger()).unwrap();

        let units: Vec<(&str, UnitKind)> = report
            .units
            .iter()
            .map(|u| (u.output_basename.as_str(), u.kind))
            .collect();
        assert_eq!(
            units,
            vec![("panorama", UnitKind::Image), ("scene", UnitKind::StereoPair)]
        );

        assert_eq!(runner.call_count(), 2);
        assert!(report.stitch.iter().all(|o| o.status.is_success()));
        assert!(fx.out.join("panorama.jpg").exists());
        assert!(fx.out.join("scene.mp4").exists());

        assert_eq!(
            fs::read_to_string(fx.out.join("scene.json")).unwrap(),
            r#"{"scene": true}"#
        );
        assert!(fx.out.join("panorama.json").exists());
        assert!(!fx.out.join("orphan.json").exists());

        assert_eq!(report.diagnostics_of(DiagnosticKind::SkippedFile).count(), 1);

        let summary = report.summary();
        assert_eq!(summary.units, 2);
        assert_eq!(summary.stitched, 2);
        assert_eq!(summary.sidecars_written, 2);
        assert!(report.started_at.is_some() && report.finished_at.is_some());
    }

    #[test]
    fn second_run_leaves_sidecars_alone() {
        let fx = Fixture::new();
        fx.asset("clip.insp");
        fx.sidecar("clip.json", "{\"v\": 1}");

        run_batch(fx.dirs(), Settings::default(), stitcher(), logger()).unwrap();
        let report = run_batch(fx.dirs(), Settings::default(), stitcher(), logger()).unwrap();

        assert_eq!(report.correlation.len(), 1);
        assert_eq!(report.correlation[0].status, CorrelationStatus::AlreadyPresent);
        assert_eq!(
            fs::read_to_string(fx.out.join("clip.json")).unwrap(),
            "{\"v\": 1}"
        );
    }

    #[test]
    fn missing_asset_dir_is_fatal() {
        let fx = Fixture::new();
        let dirs = BatchDirs::new(fx.assets.join("missing"), &fx.meta, &fx.out, None);
        let runner = stitcher();

        let err = run_batch(dirs, Settings::default(), runner.clone(), logger()).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(runner.call_count(), 0);
        assert!(!fx.out.exists());
    }

    #[test]
    fn missing_metadata_dir_is_a_diagnostic() {
        let fx = Fixture::new();
        fx.asset("panorama.insp");
        let dirs = BatchDirs::new(&fx.assets, fx.meta.join("missing"), &fx.out, None);

        let report = run_batch(dirs, Settings::default(), stitcher(), logger()).unwrap();

        assert_eq!(report.summary().stitched, 1);
        assert!(report.correlation.is_empty());
        assert_eq!(report.diagnostics_of(DiagnosticKind::NotFound).count(), 1);
    }

    #[test]
    fn stitch_failure_does_not_stop_batch() {
        let fx = Fixture::new();
        fx.asset("a.insp");
        fx.asset("b.insp");
        fx.sidecar("a.json", "{}");
        fx.sidecar("b.json", "{}");

        let runner = stitcher();
        runner.push(Scripted::Exit(1));
        let report = run_batch(fx.dirs(), Settings::default(), runner.clone(), logger()).unwrap();

        assert_eq!(runner.call_count(), 2);
        assert_eq!(
            report.stitch[0].status,
            UnitStatus::Failed { exit_code: Some(1) }
        );
        assert_eq!(report.stitch[1].status, UnitStatus::Succeeded);
        assert_eq!(report.diagnostics_of(DiagnosticKind::ProcessFailure).count(), 1);

        // Only the produced deliverable gets its sidecar
        assert!(!fx.out.join("a.json").exists());
        assert!(fx.out.join("b.json").exists());
    }

    #[test]
    fn lone_primary_yields_no_work() {
        let fx = Fixture::new();
        fx.asset("scene_00_002.insv");

        let runner = stitcher();
        let report = run_batch(fx.dirs(), Settings::default(), runner.clone(), logger()).unwrap();

        assert!(report.units.is_empty());
        assert_eq!(runner.call_count(), 0);
        assert_eq!(report.diagnostics_of(DiagnosticKind::MissingPartner).count(), 1);
        assert!(fx.out.is_dir());
    }

    #[test]
    fn sidecars_go_to_metadata_output_dir() {
        let fx = Fixture::new();
        fx.asset("panorama.insp");
        fx.sidecar("panorama.json", "{}");
        let sidecars = fx.out.with_file_name("sidecars");
        let dirs = BatchDirs::new(&fx.assets, &fx.meta, &fx.out, Some(sidecars.clone()));

        run_batch(dirs, Settings::default(), stitcher(), logger()).unwrap();

        assert!(sidecars.join("panorama.json").exists());
        assert!(!fx.out.join("panorama.json").exists());
    }

    #[test]
    fn embed_mode_invokes_embedder() {
        let fx = Fixture::new();
        fx.asset("panorama.insp");
        fx.sidecar("panorama.json", "{}");
        let mut settings = Settings::default();
        settings.metadata.mode = CorrelationMode::Embed;

        let runner = stitcher();
        let report = run_batch(fx.dirs(), settings, runner.clone(), logger()).unwrap();

        let calls = runner.invocations();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "MediaSDKTest");
        assert_eq!(calls[1].program, "exiftool");
        assert_eq!(report.correlation[0].status, CorrelationStatus::Embedded);
        assert!(!fx.out.join("panorama.json").exists());
    }

    #[test]
    fn cancelled_batch_returns_partial_report() {
        let fx = Fixture::new();
        fx.asset("a.insp");
        fx.asset("b.insp");

        let cancel = CancelHandle::new();
        let hook_cancel = cancel.clone();
        let runner = Arc::new(RecordingRunner::new().with_hook(move |inv| {
            write_output(inv);
            hook_cancel.cancel();
        }));

        let report =
            run_batch_with_cancel(fx.dirs(), Settings::default(), runner.clone(), logger(), cancel)
                .unwrap();

        assert_eq!(runner.call_count(), 1);
        assert_eq!(report.stitch[1].status, UnitStatus::Cancelled);
        assert!(report.correlation.is_empty());
        assert!(fx.out.join("a.jpg").exists());
    }
}
