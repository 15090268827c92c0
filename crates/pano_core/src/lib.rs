//! Pano Core - batch stitching of 360° captures
//!
//! Scans a directory of raw camera captures, pairs stereo video eyes,
//! drives an external stitcher once per unit and attaches sidecar
//! metadata to the results. No UI dependencies; the `pano-batch` binary
//! is a thin CLI over [`orchestrator::run_batch`].

pub mod config;
pub mod correlate;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod pairing;
pub mod process;
pub mod scan;
pub mod stitch;

pub use orchestrator::{run_batch, BatchDirs};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
