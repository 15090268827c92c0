//! In-memory process runner for tests.

use std::collections::VecDeque;
use std::io;

use parking_lot::Mutex;

use super::runner::{ProcessOutput, ProcessRunner};

/// One recorded call to [`RecordingRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Scripted result for the next call.
#[derive(Debug, Clone)]
pub enum Scripted {
    Exit(i32),
    LaunchError(String),
}

type RunHook = Box<dyn Fn(&Invocation) + Send + Sync>;

/// Records invocations instead of spawning processes.
///
/// Calls succeed with exit code 0 unless a result was scripted with
/// [`RecordingRunner::push`]. A hook can simulate the tool's side effects,
/// e.g. creating the output file.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    script: Mutex<VecDeque<Scripted>>,
    hook: Option<RunHook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` on every invocation.
    pub fn with_hook(mut self, hook: impl Fn(&Invocation) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Queue the result of the next unscripted call.
    pub fn push(&self, result: Scripted) {
        self.script.lock().push_back(result);
    }

    /// All invocations so far, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        };
        self.calls.lock().push(invocation.clone());

        match self.script.lock().pop_front() {
            Some(Scripted::LaunchError(message)) => {
                return Err(io::Error::new(io::ErrorKind::NotFound, message))
            }
            Some(Scripted::Exit(code)) if code != 0 => return Ok(ProcessOutput::exited(code)),
            _ => {}
        }

        if let Some(ref hook) = self.hook {
            hook(&invocation);
        }
        Ok(ProcessOutput::succeeded())
    }
}
