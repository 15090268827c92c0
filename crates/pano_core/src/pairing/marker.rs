//! Eye-channel markers encoded in stereo video file names.
//!
//! A stereo capture is stored as two files that differ only in the channel
//! marker right before the extension: `<stem>_00_<seq>` for the primary eye
//! and `<stem>_10_<seq>` for the secondary eye, `<seq>` being three digits.
//!
//! Everything here is pure string/path manipulation; nothing touches the
//! filesystem.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Eye, StereoNaming};

static EYE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<stem>.*)_(?P<channel>00|10)_(?P<seq>[0-9]{3})$")
        .expect("eye marker pattern is valid")
});

/// Parsed channel marker of a stereo video basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EyeMarker {
    pub eye: Eye,
    /// Everything before the marker (may be empty).
    pub stem: String,
    /// Three-digit sequence index.
    pub sequence: String,
}

/// Parse the trailing eye marker of a basename (no extension).
///
/// Returns `None` when the name carries neither marker; callers must not
/// guess an eye in that case.
pub fn parse_eye_marker(basename: &str) -> Option<EyeMarker> {
    let caps = EYE_MARKER.captures(basename)?;
    let eye = match &caps["channel"] {
        "00" => Eye::Primary,
        _ => Eye::Secondary,
    };

    Some(EyeMarker {
        eye,
        stem: caps["stem"].to_string(),
        sequence: caps["seq"].to_string(),
    })
}

/// Basename of the secondary eye for a primary basename.
///
/// Only the trailing marker is substituted. Returns `None` if the name is
/// not a primary eye.
pub fn derive_secondary_basename(primary_basename: &str) -> Option<String> {
    let marker = parse_eye_marker(primary_basename)?;
    if marker.eye != Eye::Primary {
        return None;
    }

    Some(format!(
        "{}{}{}",
        marker.stem,
        Eye::Secondary.marker(),
        marker.sequence
    ))
}

/// Expected path of the secondary eye, next to the primary and with the same
/// extension.
pub fn derive_secondary_path(primary_path: &Path) -> Option<PathBuf> {
    let basename = primary_path.file_stem()?.to_str()?;
    let secondary = derive_secondary_basename(basename)?;

    let file_name = match primary_path.extension() {
        Some(ext) => format!("{}.{}", secondary, ext.to_string_lossy()),
        None => secondary,
    };

    Some(primary_path.with_file_name(file_name))
}

/// Output basename for a stereo pair.
pub fn stereo_output_basename(
    primary_basename: &str,
    marker: &EyeMarker,
    naming: StereoNaming,
) -> String {
    match naming {
        StereoNaming::StripMarker if !marker.stem.is_empty() => marker.stem.clone(),
        _ => primary_basename.to_string(),
    }
}
