//! Settings struct with TOML-based sections.
//!
//! Every field has a serde default, so a partial file (or none) is valid.

use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;
use crate::models::{CorrelationMode, ImageFormat, StereoNaming, VideoContainer, VideoLayout};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Stitch output geometry and formats.
    #[serde(default)]
    pub stitch: StitchSettings,

    /// Sidecar correlation behavior.
    #[serde(default)]
    pub metadata: MetadataSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// External collaborators invoked by the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Stitching executable (name on PATH or full path).
    #[serde(default = "default_stitcher")]
    pub stitcher: String,

    /// Metadata embedding executable.
    #[serde(default = "default_embedder")]
    pub embedder: String,

    /// ExifTool config file passed for video targets. Empty disables it.
    #[serde(default = "default_exiftool_config")]
    pub exiftool_config: String,
}

fn default_stitcher() -> String {
    "MediaSDKTest".to_string()
}

fn default_embedder() -> String {
    "exiftool".to_string()
}

fn default_exiftool_config() -> String {
    "./.ExifTool_config".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            stitcher: default_stitcher(),
            embedder: default_embedder(),
            exiftool_config: default_exiftool_config(),
        }
    }
}

/// Output geometry and formats handed to the stitcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchSettings {
    /// Value of `-stitch_type`.
    #[serde(default = "default_stitch_type")]
    pub stitch_type: String,

    /// Value of `-output_size`, `WIDTHxHEIGHT`.
    #[serde(default = "default_output_size")]
    pub output_size: String,

    /// Format for stitched stills and image-sequence frames.
    #[serde(default)]
    pub image_format: ImageFormat,

    /// Container for stitched stereo video.
    #[serde(default)]
    pub video_container: VideoContainer,

    /// Single video file or image sequence per stereo pair.
    #[serde(default)]
    pub video_layout: VideoLayout,

    /// How stereo output basenames are derived.
    #[serde(default)]
    pub stereo_naming: StereoNaming,
}

fn default_stitch_type() -> String {
    "dynamicstitch".to_string()
}

fn default_output_size() -> String {
    "1920x960".to_string()
}

impl Default for StitchSettings {
    fn default() -> Self {
        Self {
            stitch_type: default_stitch_type(),
            output_size: default_output_size(),
            image_format: ImageFormat::default(),
            video_container: VideoContainer::default(),
            video_layout: VideoLayout::default(),
            stereo_naming: StereoNaming::default(),
        }
    }
}

/// Sidecar correlation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSettings {
    /// Copy, embed, or both.
    #[serde(default)]
    pub mode: CorrelationMode,

    /// Tag written into still images.
    #[serde(default = "default_image_tag")]
    pub image_tag: String,

    /// Tag written into video containers.
    #[serde(default = "default_video_tag")]
    pub video_tag: String,
}

fn default_image_tag() -> String {
    "XMP-xxx:FrameGroups".to_string()
}

fn default_video_tag() -> String {
    "XMP-xmp:FrameGroups".to_string()
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            mode: CorrelationMode::default(),
            image_tag: default_image_tag(),
            video_tag: default_video_tag(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Keep external tool output in the tail buffer only.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines to show after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Prefix log file lines with a timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Folder for per-run log files. Empty disables the log file.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
            logs_folder: default_logs_folder(),
        }
    }
}

impl LoggingSettings {
    /// Logger configuration derived from these settings.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            compact: self.compact,
            progress_step: self.progress_step.max(1),
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
            ..LogConfig::default()
        }
    }
}
