//! Stitcher command builder.
//!
//! Builds the argument vector for the stitching tool from a resolved unit and
//! the output settings. Pure: no filesystem access, and the same unit and
//! settings always give the same command.
//!
//! # Argument shape
//!
//! - **Image**: `-inputs <in> -output <out> -stitch_type <t> -image_type <fmt>
//!   -output_size <WxH>`
//! - **Stereo pair**: `-inputs <primary> <secondary> -output <out> -stitch_type <t>
//!   -output_size <WxH>`
//! - **Stereo pair, image sequence**: `-output` is replaced by
//!   `-image_sequence_dir <dir> -image_type <fmt>`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::StitchSettings;
use crate::models::{ResolvedUnit, UnitKind, VideoLayout};
use crate::process::format_command_line;

/// Fully built stitcher invocation for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchCommand {
    pub program: String,
    pub args: Vec<String>,
    /// File (or frame directory) the stitcher will produce.
    pub output_path: PathBuf,
    pub output_basename: String,
}

impl StitchCommand {
    /// Command line as it is logged before execution.
    pub fn command_line(&self) -> String {
        format_command_line(&self.program, &self.args)
    }
}

/// Builder for stitcher command-line arguments.
pub struct StitchCommandBuilder<'a> {
    program: &'a str,
    settings: &'a StitchSettings,
    output_dir: &'a Path,
}

impl<'a> StitchCommandBuilder<'a> {
    /// Create a new builder.
    pub fn new(program: &'a str, settings: &'a StitchSettings, output_dir: &'a Path) -> Self {
        Self {
            program,
            settings,
            output_dir,
        }
    }

    /// Where the unit's deliverable goes.
    pub fn output_path(&self, unit: &ResolvedUnit) -> PathBuf {
        if self.writes_sequence(unit) {
            self.output_dir.join(&unit.output_basename)
        } else {
            self.output_dir.join(unit.output_file_name())
        }
    }

    /// Build the command for one unit.
    pub fn build(&self, unit: &ResolvedUnit) -> StitchCommand {
        let output_path = self.output_path(unit);
        let mut args = Vec::new();

        args.push("-inputs".to_string());
        for input in &unit.inputs {
            args.push(input.path.to_string_lossy().to_string());
        }

        if self.writes_sequence(unit) {
            args.push("-image_sequence_dir".to_string());
            args.push(output_path.to_string_lossy().to_string());
        } else {
            args.push("-output".to_string());
            args.push(output_path.to_string_lossy().to_string());
        }

        args.push("-stitch_type".to_string());
        args.push(self.settings.stitch_type.clone());

        // Stills and frame sequences need the image encoding spelled out
        if unit.kind == UnitKind::Image || self.writes_sequence(unit) {
            args.push("-image_type".to_string());
            args.push(unit.output_extension.clone());
        }

        args.push("-output_size".to_string());
        args.push(self.settings.output_size.clone());

        StitchCommand {
            program: self.program.to_string(),
            args,
            output_path,
            output_basename: unit.output_basename.clone(),
        }
    }

    /// Build commands for all units, preserving order.
    pub fn build_all(&self, units: &[ResolvedUnit]) -> Vec<StitchCommand> {
        units.iter().map(|unit| self.build(unit)).collect()
    }

    fn writes_sequence(&self, unit: &ResolvedUnit) -> bool {
        match unit.kind {
            UnitKind::Image => false,
            UnitKind::StereoPair => self.settings.video_layout == VideoLayout::ImageSequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetFile, AssetKind, ImageFormat};

    fn image_unit() -> ResolvedUnit {
        ResolvedUnit::image(
            AssetFile::new("/in/panorama.insp", "panorama", "insp", AssetKind::StillPanorama),
            "jpg",
        )
    }

    fn pair_unit(extension: &str) -> ResolvedUnit {
        let eye = |name: &str| {
            AssetFile::new(format!("/in/{}.insv", name), name, "insv", AssetKind::StereoVideoEye)
        };
        ResolvedUnit::stereo_pair(eye("scene_00_001"), eye("scene_10_001"), "scene", extension)
    }

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_image_command() {
        let settings = StitchSettings::default();
        let builder = StitchCommandBuilder::new("MediaSDKTest", &settings, Path::new("/out"));
        let cmd = builder.build(&image_unit());

        assert_eq!(cmd.program, "MediaSDKTest");
        assert_eq!(
            cmd.args,
            strings(&[
                "-inputs",
                "/in/panorama.insp",
                "-output",
                "/out/panorama.jpg",
                "-stitch_type",
                "dynamicstitch",
                "-image_type",
                "jpg",
                "-output_size",
                "1920x960",
            ])
        );
        assert_eq!(cmd.output_path, PathBuf::from("/out/panorama.jpg"));
    }

    #[test]
    fn builds_stereo_command_with_ordered_inputs() {
        let settings = StitchSettings::default();
        let builder = StitchCommandBuilder::new("MediaSDKTest", &settings, Path::new("/out"));
        let cmd = builder.build(&pair_unit("mp4"));

        assert_eq!(
            cmd.args,
            strings(&[
                "-inputs",
                "/in/scene_00_001.insv",
                "/in/scene_10_001.insv",
                "-output",
                "/out/scene.mp4",
                "-stitch_type",
                "dynamicstitch",
                "-output_size",
                "1920x960",
            ])
        );
        assert!(!cmd.args.contains(&"-image_type".to_string()));
    }

    #[test]
    fn builds_image_sequence_command() {
        let settings = StitchSettings {
            video_layout: VideoLayout::ImageSequence,
            image_format: ImageFormat::Png,
            output_size: "3840x1920".to_string(),
            ..StitchSettings::default()
        };
        let builder = StitchCommandBuilder::new("MediaSDKTest", &settings, Path::new("/out"));
        let cmd = builder.build(&pair_unit("png"));

        assert_eq!(cmd.output_path, PathBuf::from("/out/scene"));
        assert!(cmd
            .args
            .windows(2)
            .any(|w| w[0] == "-image_sequence_dir" && w[1] == "/out/scene"));
        assert!(cmd.args.windows(2).any(|w| w[0] == "-image_type" && w[1] == "png"));
        assert!(cmd.args.windows(2).any(|w| w[0] == "-output_size" && w[1] == "3840x1920"));
        assert!(!cmd.args.contains(&"-output".to_string()));
    }

    #[test]
    fn build_is_deterministic() {
        let settings = StitchSettings::default();
        let builder = StitchCommandBuilder::new("MediaSDKTest", &settings, Path::new("/out"));
        let unit = pair_unit("mp4");

        assert_eq!(builder.build(&unit), builder.build(&unit));
        assert_eq!(builder.build(&unit).command_line(), builder.build(&unit).command_line());
    }

    #[test]
    fn build_all_preserves_order() {
        let settings = StitchSettings::default();
        let builder = StitchCommandBuilder::new("MediaSDKTest", &settings, Path::new("/out"));
        let cmds = builder.build_all(&[pair_unit("mp4"), image_unit()]);

        let names: Vec<&str> = cmds.iter().map(|c| c.output_basename.as_str()).collect();
        assert_eq!(names, vec!["scene", "panorama"]);
    }
}
