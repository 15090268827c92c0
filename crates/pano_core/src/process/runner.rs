//! External process execution.

use std::io;
use std::process::{Command, Stdio};

/// Captured result of one external process run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` if terminated by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// A successful run with no output.
    pub fn succeeded() -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            ..Default::default()
        }
    }

    /// A run that exited with the given code.
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            success: code == 0,
            ..Default::default()
        }
    }
}

/// Capability to run an external program and report how it exited.
///
/// `Err` means the program could not be launched; a launched program that
/// fails is an `Ok` with `success == false`.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput>;
}

/// Runs programs with `std::process::Command`, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput> {
        tracing::debug!("Spawning {}", program);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Render a program and its arguments as a copy-pasteable shell line.
pub fn format_command_line(program: &str, args: &[String]) -> String {
    let mut line = quote_token(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote_token(arg));
    }
    line
}

/// Quote a token for display if the shell would split or expand it.
fn quote_token(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token.chars().any(|c| {
            c.is_whitespace()
                || matches!(
                    c,
                    '"' | '\'' | '$' | '`' | '\\' | '<' | '>' | '|' | '&' | ';' | '*' | '?'
                )
        });

    if !needs_quotes {
        return token.to_string();
    }

    format!("'{}'", token.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_tokens() {
        let args = vec!["-inputs".to_string(), "/in/a.insp".to_string()];
        assert_eq!(format_command_line("MediaSDKTest", &args), "MediaSDKTest -inputs /in/a.insp");
    }

    #[test]
    fn quotes_tokens_with_spaces() {
        let args = vec!["-output".to_string(), "/out/my pano.jpg".to_string()];
        assert_eq!(
            format_command_line("MediaSDKTest", &args),
            "MediaSDKTest -output '/out/my pano.jpg'"
        );
    }

    #[test]
    fn quotes_redirect_like_tokens() {
        let args = vec!["-XMP-xmp:FrameGroups<=/meta/it's.json".to_string()];
        assert_eq!(
            format_command_line("exiftool", &args),
            r"exiftool '-XMP-xmp:FrameGroups<=/meta/it'\''s.json'"
        );
    }

    #[test]
    fn exited_output_tracks_success() {
        assert!(ProcessOutput::exited(0).success);
        assert!(!ProcessOutput::exited(2).success);
        assert_eq!(ProcessOutput::exited(2).exit_code, Some(2));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_status() {
        let runner = SystemRunner::new();

        let ok = runner.run("sh", &["-c".to_string(), "exit 0".to_string()]).unwrap();
        assert!(ok.success);

        let failed = runner
            .run("sh", &["-c".to_string(), "echo boom >&2; exit 3".to_string()])
            .unwrap();
        assert!(!failed.success);
        assert_eq!(failed.exit_code, Some(3));
        assert!(failed.stderr.contains("boom"));
    }

    #[test]
    fn system_runner_reports_launch_failure() {
        let runner = SystemRunner::new();
        assert!(runner.run("/nonexistent/pano/stitcher", &[]).is_err());
    }
}
