//! Levels, run-logger settings and line markers.

/// Severity of a run-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How a [`RunLogger`](super::RunLogger) filters and formats a batch log.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Keep stitcher and embedder output in the tail buffer only.
    pub compact: bool,
    /// In compact mode, only log progress when it crosses a multiple of this.
    pub progress_step: u32,
    /// Tool output lines replayed after a failing unit.
    pub error_tail: usize,
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            progress_step: 20,
            error_tail: 20,
            show_timestamps: true,
        }
    }
}

/// Leading marker of a structured run-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    /// `$ MediaSDKTest -inputs ...`
    Command,
    /// `=== Stitch ===`
    Phase,
    /// `--- Unit 1/3: scene ---`
    Section,
    Success,
    Warning,
    Error,
}

impl Marker {
    pub(crate) fn mark(self, message: &str) -> String {
        match self {
            Marker::Command => format!("$ {}", message),
            Marker::Phase => format!("=== {} ===", message),
            Marker::Section => format!("--- {} ---", message),
            Marker::Success => format!("[SUCCESS] {}", message),
            Marker::Warning => format!("[WARNING] {}", message),
            Marker::Error => format!("[ERROR] {}", message),
        }
    }
}
