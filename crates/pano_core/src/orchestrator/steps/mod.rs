//! Pipeline step implementations.
//!
//! Each step handles one phase of a batch run.

mod correlate;
mod resolve;
mod stitch;

pub use correlate::CorrelateStep;
pub use resolve::ResolveStep;
pub use stitch::StitchStep;
