//! External process capability.
//!
//! The stitcher and the metadata embedder are opaque command-line tools.
//! Everything that launches them goes through [`ProcessRunner`], so callers
//! can be tested with [`testing::RecordingRunner`] instead of real processes.

mod runner;
pub mod testing;

pub use runner::{format_command_line, ProcessOutput, ProcessRunner, SystemRunner};
