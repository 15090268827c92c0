//! Data models for pano-batch.
//!
//! This module contains the core data structures used throughout the crate:
//! - Enums for asset kinds, eyes, unit kinds and output formats
//! - Scanned assets, resolved units and sidecar records
//! - Diagnostics and the structured run report

mod assets;
mod enums;
mod report;

pub use assets::{AssetFile, MetadataRecord, ResolvedUnit};
pub use enums::{
    AssetKind, CorrelationMode, Eye, ImageFormat, MediaClass, StereoNaming, UnitKind,
    VideoContainer, VideoLayout,
};
pub use report::{
    BatchReport, BatchSummary, CorrelationOutcome, CorrelationStatus, Diagnostic,
    DiagnosticKind, UnitOutcome, UnitStatus,
};
