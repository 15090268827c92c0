//! Sequential execution of stitch commands.

use crate::logging::RunLogger;
use crate::models::{Diagnostic, DiagnosticKind, UnitOutcome, UnitStatus};
use crate::orchestrator::CancelHandle;
use crate::process::{ProcessOutput, ProcessRunner};

use super::builder::StitchCommand;

/// Outcomes of one dispatch pass.
#[derive(Debug, Clone, Default)]
pub struct Dispatch {
    /// One outcome per command, in command order.
    pub outcomes: Vec<UnitOutcome>,
    /// One `ProcessFailure` per failed unit.
    pub diagnostics: Vec<Diagnostic>,
}

impl Dispatch {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    UnitStatus::Failed { .. } | UnitStatus::LaunchFailed { .. }
                )
            })
            .count()
    }
}

/// Runs stitch commands one at a time.
///
/// A failing unit is recorded and logged; the remaining units still run.
/// Cancellation is only observed between units.
pub struct StitchDispatcher<'a> {
    runner: &'a dyn ProcessRunner,
    logger: &'a RunLogger,
    cancel: Option<CancelHandle>,
}

impl<'a> StitchDispatcher<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, logger: &'a RunLogger) -> Self {
        Self {
            runner,
            logger,
            cancel: None,
        }
    }

    /// Stop dispatching once `handle` is cancelled.
    pub fn with_cancel(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    /// Run every command in order.
    pub fn dispatch(&self, commands: &[StitchCommand]) -> Dispatch {
        let mut dispatch = Dispatch::default();
        let total = commands.len();

        for (i, command) in commands.iter().enumerate() {
            if self.is_cancelled() {
                self.logger.warn(&format!(
                    "Cancelled before '{}', {} unit(s) not dispatched",
                    command.output_basename,
                    total - i
                ));
                dispatch
                    .outcomes
                    .extend(commands[i..].iter().map(cancelled_outcome));
                break;
            }

            self.logger
                .section(&format!("Unit {}/{}: {}", i + 1, total, command.output_basename));

            let (outcome, diagnostic) = self.dispatch_one(command);
            dispatch.outcomes.push(outcome);
            dispatch.diagnostics.extend(diagnostic);

            if total > 0 {
                self.logger.progress((((i + 1) * 100) / total) as u32);
            }
        }

        dispatch
    }

    fn dispatch_one(&self, command: &StitchCommand) -> (UnitOutcome, Option<Diagnostic>) {
        let command_line = command.command_line();
        self.logger.command(&command_line);
        self.logger.clear_tail();

        let result = self.runner.run(&command.program, &command.args);

        let status = match result {
            Ok(output) => {
                self.record_output(&output);
                if output.success {
                    UnitStatus::Succeeded
                } else {
                    UnitStatus::Failed {
                        exit_code: output.exit_code,
                    }
                }
            }
            Err(e) => UnitStatus::LaunchFailed {
                message: e.to_string(),
            },
        };

        let diagnostic = match &status {
            UnitStatus::Succeeded => {
                self.logger
                    .success(&format!("Wrote {}", command.output_path.display()));
                None
            }
            UnitStatus::Failed { exit_code } => {
                let message = match exit_code {
                    Some(code) => format!("{} exited with code {}", command.program, code),
                    None => format!("{} was terminated by a signal", command.program),
                };
                let diagnostic =
                    Diagnostic::new(DiagnosticKind::ProcessFailure, &command.output_path, message);
                self.logger.error(&diagnostic.to_string());
                self.logger.show_tail(&command.program);
                Some(diagnostic)
            }
            UnitStatus::LaunchFailed { message } => {
                let message = format!("failed to launch {}: {}", command.program, message);
                let diagnostic =
                    Diagnostic::new(DiagnosticKind::ProcessFailure, &command.output_path, message);
                self.logger.error(&diagnostic.to_string());
                Some(diagnostic)
            }
            UnitStatus::Cancelled => None,
        };

        let outcome = UnitOutcome {
            output_basename: command.output_basename.clone(),
            output_path: command.output_path.clone(),
            command_line,
            status,
        };

        (outcome, diagnostic)
    }

    fn record_output(&self, output: &ProcessOutput) {
        for line in output.stdout.lines() {
            self.logger.output_line(line, false);
        }
        for line in output.stderr.lines() {
            self.logger.output_line(line, true);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }
}

fn cancelled_outcome(command: &StitchCommand) -> UnitOutcome {
    UnitOutcome {
        output_basename: command.output_basename.clone(),
        output_path: command.output_path.clone(),
        command_line: command.command_line(),
        status: UnitStatus::Cancelled,
    }
}
