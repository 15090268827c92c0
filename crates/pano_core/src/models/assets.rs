//! Scanned assets, resolved work units and sidecar records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::{AssetKind, UnitKind};

/// A recognized raw capture file, snapshotted at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name without extension.
    pub basename: String,
    /// Extension without the leading dot.
    pub extension: String,
    /// Kind decided from the extension.
    pub kind: AssetKind,
}

impl AssetFile {
    pub fn new(
        path: impl Into<PathBuf>,
        basename: impl Into<String>,
        extension: impl Into<String>,
        kind: AssetKind,
    ) -> Self {
        Self {
            path: path.into(),
            basename: basename.into(),
            extension: extension.into(),
            kind,
        }
    }

    /// File name as it appears on disk.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.basename, self.extension)
    }
}

/// One unit of stitching work.
///
/// Stereo pairs always carry `[primary, secondary]` in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUnit {
    pub kind: UnitKind,
    /// Basename of the deliverable (no extension).
    pub output_basename: String,
    /// Ordered stitcher inputs.
    pub inputs: Vec<AssetFile>,
    /// Extension of the deliverable (no dot).
    pub output_extension: String,
}

impl ResolvedUnit {
    /// A single still panorama.
    pub fn image(asset: AssetFile, output_extension: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Image,
            output_basename: asset.basename.clone(),
            inputs: vec![asset],
            output_extension: output_extension.into(),
        }
    }

    /// A verified primary/secondary eye pair.
    pub fn stereo_pair(
        primary: AssetFile,
        secondary: AssetFile,
        output_basename: impl Into<String>,
        output_extension: impl Into<String>,
    ) -> Self {
        Self {
            kind: UnitKind::StereoPair,
            output_basename: output_basename.into(),
            inputs: vec![primary, secondary],
            output_extension: output_extension.into(),
        }
    }

    /// Deliverable file name, e.g. `scene.mp4`.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.output_basename, self.output_extension)
    }

    /// Path of the first input, used to identify the unit in logs.
    pub fn lead_input(&self) -> Option<&PathBuf> {
        self.inputs.first().map(|a| &a.path)
    }
}

/// A JSON sidecar found in the metadata source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Basename shared with the deliverable it describes.
    pub basename: String,
    /// Path to the sidecar file.
    pub sidecar_path: PathBuf,
}

impl MetadataRecord {
    pub fn new(basename: impl Into<String>, sidecar_path: impl Into<PathBuf>) -> Self {
        Self {
            basename: basename.into(),
            sidecar_path: sidecar_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(name: &str) -> AssetFile {
        AssetFile::new(
            format!("/in/{}.insv", name),
            name,
            "insv",
            AssetKind::StereoVideoEye,
        )
    }

    #[test]
    fn image_unit_keeps_stem() {
        let asset =
            AssetFile::new("/in/panorama.insp", "panorama", "insp", AssetKind::StillPanorama);
        let unit = ResolvedUnit::image(asset, "jpg");
        assert_eq!(unit.kind, UnitKind::Image);
        assert_eq!(unit.output_file_name(), "panorama.jpg");
        assert_eq!(unit.inputs.len(), 1);
    }

    #[test]
    fn stereo_pair_orders_inputs() {
        let unit =
            ResolvedUnit::stereo_pair(eye("scene_00_001"), eye("scene_10_001"), "scene", "mp4");
        assert_eq!(unit.inputs[0].basename, "scene_00_001");
        assert_eq!(unit.inputs[1].basename, "scene_10_001");
        assert_eq!(unit.lead_input(), Some(&PathBuf::from("/in/scene_00_001.insv")));
    }
}
