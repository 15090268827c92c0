//! What the correlator does with each matched sidecar.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Settings;
use crate::logging::RunLogger;
use crate::models::{
    CorrelationMode, CorrelationStatus, DiagnosticKind, MediaClass, MetadataRecord,
};
use crate::process::ProcessRunner;

use super::copy::{copy_sidecar, CopyError, CopyOutcome};
use super::embed::EmbedCommandBuilder;

/// A sidecar matched to its deliverable.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRecord<'a> {
    pub record: &'a MetadataRecord,
    pub deliverable: &'a Path,
    pub class: MediaClass,
    /// Where a copied sidecar goes.
    pub destination: &'a Path,
}

/// Failure of one action on one record.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error("{program} failed on {} with {status}", .target.display())]
    EmbedFailed {
        program: String,
        target: PathBuf,
        status: String,
    },

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ActionError {
    /// Diagnostic category this failure is reported under.
    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            ActionError::Copy(_) => DiagnosticKind::IoFailure,
            ActionError::EmbedFailed { .. } | ActionError::Launch { .. } => {
                DiagnosticKind::ProcessFailure
            }
        }
    }
}

/// One correlation mode.
///
/// All modes share the same join; only the per-record work differs.
pub trait CorrelationAction: Send + Sync {
    fn name(&self) -> &str;

    /// Whether an existing destination sidecar means the record is done.
    ///
    /// When true, the correlator skips the record without calling
    /// [`apply`](Self::apply) if the destination already exists.
    fn guards_destination(&self) -> bool;

    fn apply(&self, matched: &MatchedRecord<'_>, logger: &RunLogger)
        -> Result<CorrelationStatus, ActionError>;
}

/// Copy the sidecar next to the deliverable.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopySidecar;

impl CorrelationAction for CopySidecar {
    fn name(&self) -> &str {
        "copy"
    }

    fn guards_destination(&self) -> bool {
        true
    }

    fn apply(
        &self,
        matched: &MatchedRecord<'_>,
        logger: &RunLogger,
    ) -> Result<CorrelationStatus, ActionError> {
        match copy_sidecar(&matched.record.sidecar_path, matched.destination)? {
            CopyOutcome::Copied(bytes) => {
                logger.debug(&format!(
                    "Copied {} ({} bytes) to {}",
                    matched.record.sidecar_path.display(),
                    bytes,
                    matched.destination.display()
                ));
                Ok(CorrelationStatus::Copied)
            }
            CopyOutcome::AlreadyPresent => Ok(CorrelationStatus::AlreadyPresent),
        }
    }
}

/// Write the sidecar into the deliverable with the embedder tool.
pub struct EmbedMetadata<'a> {
    settings: &'a Settings,
    runner: &'a dyn ProcessRunner,
}

impl<'a> EmbedMetadata<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn ProcessRunner) -> Self {
        Self { settings, runner }
    }

    fn embed(&self, matched: &MatchedRecord<'_>, logger: &RunLogger) -> Result<(), ActionError> {
        let builder = EmbedCommandBuilder::new(&self.settings.tools, &self.settings.metadata);
        let command = builder.build(
            &matched.record.sidecar_path,
            matched.deliverable,
            matched.class,
        );

        logger.command(&command.command_line());
        logger.clear_tail();

        let output = self
            .runner
            .run(&command.program, &command.args)
            .map_err(|source| ActionError::Launch {
                program: command.program.clone(),
                source,
            })?;

        for line in output.stdout.lines() {
            logger.output_line(line, false);
        }
        for line in output.stderr.lines() {
            logger.output_line(line, true);
        }

        if output.success {
            return Ok(());
        }

        logger.show_tail(&command.program);
        let status = match output.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "a signal".to_string(),
        };
        Err(ActionError::EmbedFailed {
            program: command.program,
            target: matched.deliverable.to_path_buf(),
            status,
        })
    }
}

impl CorrelationAction for EmbedMetadata<'_> {
    fn name(&self) -> &str {
        "embed"
    }

    fn guards_destination(&self) -> bool {
        false
    }

    fn apply(
        &self,
        matched: &MatchedRecord<'_>,
        logger: &RunLogger,
    ) -> Result<CorrelationStatus, ActionError> {
        self.embed(matched, logger)?;
        Ok(CorrelationStatus::Embedded)
    }
}

/// Copy the sidecar if it is not there yet, then embed it.
pub struct CopyThenEmbed<'a> {
    embed: EmbedMetadata<'a>,
}

impl<'a> CopyThenEmbed<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            embed: EmbedMetadata::new(settings, runner),
        }
    }
}

impl CorrelationAction for CopyThenEmbed<'_> {
    fn name(&self) -> &str {
        "copy_and_embed"
    }

    // Embedding still happens when the copy already exists
    fn guards_destination(&self) -> bool {
        false
    }

    fn apply(
        &self,
        matched: &MatchedRecord<'_>,
        logger: &RunLogger,
    ) -> Result<CorrelationStatus, ActionError> {
        let copied = CopySidecar.apply(matched, logger)?;
        self.embed.embed(matched, logger)?;

        Ok(match copied {
            CorrelationStatus::Copied => CorrelationStatus::CopiedAndEmbedded,
            _ => CorrelationStatus::Embedded,
        })
    }
}

/// Action implementing `mode`.
pub fn build_action<'a>(
    mode: CorrelationMode,
    settings: &'a Settings,
    runner: &'a dyn ProcessRunner,
) -> Box<dyn CorrelationAction + 'a> {
    match mode {
        CorrelationMode::Copy => Box::new(CopySidecar),
        CorrelationMode::Embed => Box::new(EmbedMetadata::new(settings, runner)),
        CorrelationMode::CopyAndEmbed => Box::new(CopyThenEmbed::new(settings, runner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use crate::process::testing::{RecordingRunner, Scripted};
    use std::fs;
    use tempfile::tempdir;

    fn logger() -> RunLogger {
        RunLogger::console("action-test", LogConfig::default())
    }

    #[test]
    fn build_action_matches_mode() {
        let settings = Settings::default();
        let runner = RecordingRunner::new();

        assert_eq!(build_action(CorrelationMode::Copy, &settings, &runner).name(), "copy");
        assert_eq!(build_action(CorrelationMode::Embed, &settings, &runner).name(), "embed");
        assert_eq!(
            build_action(CorrelationMode::CopyAndEmbed, &settings, &runner).name(),
            "copy_and_embed"
        );
        assert!(build_action(CorrelationMode::Copy, &settings, &runner).guards_destination());
        assert!(!build_action(CorrelationMode::Embed, &settings, &runner).guards_destination());
    }

    #[test]
    fn embed_runs_tool_against_deliverable() {
        let settings = Settings::default();
        let runner = RecordingRunner::new();
        let record = MetadataRecord::new("pano", "/meta/pano.json");
        let matched = MatchedRecord {
            record: &record,
            deliverable: Path::new("/out/pano.jpg"),
            class: MediaClass::StillImage,
            destination: Path::new("/out/pano.json"),
        };

        let status = EmbedMetadata::new(&settings, &runner)
            .apply(&matched, &logger())
            .unwrap();

        assert_eq!(status, CorrelationStatus::Embedded);
        let calls = runner.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "exiftool");
        assert!(calls[0].args.contains(&"/out/pano.jpg".to_string()));
    }

    #[test]
    fn embed_failure_is_process_failure() {
        let settings = Settings::default();
        let runner = RecordingRunner::new();
        runner.push(Scripted::Exit(1));
        let record = MetadataRecord::new("clip", "/meta/clip.json");
        let matched = MatchedRecord {
            record: &record,
            deliverable: Path::new("/out/clip.mp4"),
            class: MediaClass::VideoContainer,
            destination: Path::new("/out/clip.json"),
        };

        let err = EmbedMetadata::new(&settings, &runner)
            .apply(&matched, &logger())
            .unwrap_err();

        assert_eq!(err.diagnostic_kind(), DiagnosticKind::ProcessFailure);
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn copy_then_embed_reports_both() {
        let dir = tempdir().unwrap();
        let sidecar = dir.path().join("clip.json");
        fs::write(&sidecar, "{}").unwrap();
        let destination = dir.path().join("out").join("clip.json");

        let settings = Settings::default();
        let runner = RecordingRunner::new();
        let record = MetadataRecord::new("clip", &sidecar);
        let matched = MatchedRecord {
            record: &record,
            deliverable: Path::new("/out/clip.mp4"),
            class: MediaClass::VideoContainer,
            destination: &destination,
        };
        let action = CopyThenEmbed::new(&settings, &runner);

        assert_eq!(
            action.apply(&matched, &logger()).unwrap(),
            CorrelationStatus::CopiedAndEmbedded
        );
        assert!(destination.exists());

        // Second pass only embeds
        assert_eq!(
            action.apply(&matched, &logger()).unwrap(),
            CorrelationStatus::Embedded
        );
        assert_eq!(runner.call_count(), 2);
    }
}
