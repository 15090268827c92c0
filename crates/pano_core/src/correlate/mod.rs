//! Metadata correlation.
//!
//! Joins `.json` sidecars from the metadata source directory against the
//! stitched deliverables by exact basename, then applies the configured
//! [`CorrelationAction`]:
//!
//! - `copy`: copy the sidecar, never overwriting an existing one
//! - `embed`: write the sidecar into the deliverable with the embedder tool
//! - `copy_and_embed`: both

mod action;
mod copy;
mod correlator;
mod embed;

pub use action::{
    build_action, ActionError, CopySidecar, CopyThenEmbed, CorrelationAction, EmbedMetadata,
    MatchedRecord,
};
pub use copy::{copy_sidecar, CopyError, CopyOutcome};
pub use correlator::{collect_records, Correlation, DeliverableIndex, MetadataCorrelator};
pub use embed::{EmbedCommand, EmbedCommandBuilder};
