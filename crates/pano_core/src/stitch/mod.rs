//! Stitch command construction and dispatch.
//!
//! - `StitchCommandBuilder`: pure mapping from a resolved unit to an argument vector
//! - `StitchDispatcher`: runs the commands sequentially through a `ProcessRunner`

mod builder;
mod dispatcher;

pub use builder::{StitchCommand, StitchCommandBuilder};
pub use dispatcher::{Dispatch, StitchDispatcher};
