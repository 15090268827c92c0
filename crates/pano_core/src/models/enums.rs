//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// Kind of raw capture file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Single-shot 360° photo (`.insp`).
    StillPanorama,
    /// One eye of a dual-fisheye video capture (`.insv`).
    StereoVideoEye,
}

impl AssetKind {
    /// Classify an extension. Matching is case-sensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "insp" => Some(AssetKind::StillPanorama),
            "insv" => Some(AssetKind::StereoVideoEye),
            _ => None,
        }
    }

    /// Extension this kind is recognized by.
    pub fn extension(&self) -> &'static str {
        match self {
            AssetKind::StillPanorama => "insp",
            AssetKind::StereoVideoEye => "insv",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::StillPanorama => write!(f, "still panorama"),
            AssetKind::StereoVideoEye => write!(f, "stereo video eye"),
        }
    }
}

/// Eye channel of a stereo video file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    /// Channel marker `_00_`.
    Primary,
    /// Channel marker `_10_`.
    Secondary,
}

impl Eye {
    /// Filename marker that encodes this channel.
    pub fn marker(&self) -> &'static str {
        match self {
            Eye::Primary => "_00_",
            Eye::Secondary => "_10_",
        }
    }
}

/// Kind of work unit handed to the stitcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Image,
    StereoPair,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Image => write!(f, "image"),
            UnitKind::StereoPair => write!(f, "stereo pair"),
        }
    }
}

/// Still-image format produced by the stitcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// Video container produced by the stitcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    #[default]
    Mp4,
    Mov,
}

impl VideoContainer {
    pub fn extension(&self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "mp4",
            VideoContainer::Mov => "mov",
        }
    }
}

/// How stitched stereo video is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoLayout {
    /// One video file per pair.
    #[default]
    SingleFile,
    /// A directory of frames per pair.
    ImageSequence,
}

/// How the output basename of a stereo pair is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StereoNaming {
    /// `scene_00_001` -> `scene`.
    #[default]
    StripMarker,
    /// `scene_00_001` -> `scene_00_001`.
    KeepStem,
}

/// What the correlator does with each matched sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMode {
    /// Copy the sidecar next to the deliverable.
    #[default]
    Copy,
    /// Embed the sidecar into the deliverable's metadata.
    Embed,
    /// Copy, then embed.
    CopyAndEmbed,
}

impl std::fmt::Display for CorrelationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationMode::Copy => write!(f, "copy"),
            CorrelationMode::Embed => write!(f, "embed"),
            CorrelationMode::CopyAndEmbed => write!(f, "copy_and_embed"),
        }
    }
}

impl std::str::FromStr for CorrelationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(CorrelationMode::Copy),
            "embed" => Ok(CorrelationMode::Embed),
            "copy_and_embed" | "copy-and-embed" => Ok(CorrelationMode::CopyAndEmbed),
            other => Err(format!(
                "unknown correlation mode '{}' (expected copy, embed or copy_and_embed)",
                other
            )),
        }
    }
}

/// Broad class of a deliverable, used to pick the embedding command shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaClass {
    StillImage,
    VideoContainer,
}

impl MediaClass {
    /// Classify a deliverable extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" => Some(MediaClass::StillImage),
            "mp4" | "mov" | "avi" => Some(MediaClass::VideoContainer),
            _ => None,
        }
    }
}
