//! Pairing of raw capture files into stitch units.
//!
//! This module provides:
//! - `marker`: pure parsing of the `_00_###` / `_10_###` eye markers
//! - `PairingResolver`: classification by extension and partner lookup

mod marker;
mod resolver;

pub use marker::{
    derive_secondary_basename, derive_secondary_path, parse_eye_marker, stereo_output_basename,
    EyeMarker,
};
pub use resolver::{dedupe_outputs, PairingResolver, Resolution};
