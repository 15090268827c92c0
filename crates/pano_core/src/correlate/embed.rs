//! Metadata embedder command builder.
//!
//! The command shape depends on the deliverable's media class:
//!
//! - **Still image**: `-v -<image_tag><=<sidecar> <target> -overwrite_original`
//! - **Video container**: `-config <cfg> -v -<video_tag><=<sidecar> <target> -overwrite_original`
//!
//! The `-config` pair is left out when no embedder config file is set.

use std::path::Path;

use crate::config::{MetadataSettings, ToolSettings};
use crate::models::MediaClass;
use crate::process::format_command_line;

/// Fully built embedder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EmbedCommand {
    pub fn command_line(&self) -> String {
        format_command_line(&self.program, &self.args)
    }
}

/// Builder for embedder command-line arguments.
pub struct EmbedCommandBuilder<'a> {
    tools: &'a ToolSettings,
    metadata: &'a MetadataSettings,
}

impl<'a> EmbedCommandBuilder<'a> {
    pub fn new(tools: &'a ToolSettings, metadata: &'a MetadataSettings) -> Self {
        Self { tools, metadata }
    }

    /// Build the command that writes `sidecar` into `target`.
    pub fn build(&self, sidecar: &Path, target: &Path, class: MediaClass) -> EmbedCommand {
        let mut args = Vec::new();

        let tag = match class {
            MediaClass::StillImage => &self.metadata.image_tag,
            MediaClass::VideoContainer => {
                if !self.tools.exiftool_config.is_empty() {
                    args.push("-config".to_string());
                    args.push(self.tools.exiftool_config.clone());
                }
                &self.metadata.video_tag
            }
        };

        args.push("-v".to_string());
        args.push(format!("-{}<={}", tag, sidecar.to_string_lossy()));
        args.push(target.to_string_lossy().to_string());
        args.push("-overwrite_original".to_string());

        EmbedCommand {
            program: self.tools.embedder.clone(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_image_command() {
        let tools = ToolSettings::default();
        let metadata = MetadataSettings::default();
        let cmd = EmbedCommandBuilder::new(&tools, &metadata).build(
            Path::new("/meta/pano.json"),
            Path::new("/out/pano.jpg"),
            MediaClass::StillImage,
        );

        assert_eq!(cmd.program, "exiftool");
        assert_eq!(
            cmd.args,
            strings(&[
                "-v",
                "-XMP-xxx:FrameGroups<=/meta/pano.json",
                "/out/pano.jpg",
                "-overwrite_original",
            ])
        );
    }

    #[test]
    fn builds_video_command_with_config() {
        let tools = ToolSettings::default();
        let metadata = MetadataSettings::default();
        let cmd = EmbedCommandBuilder::new(&tools, &metadata).build(
            Path::new("/meta/clip.json"),
            Path::new("/out/clip.mp4"),
            MediaClass::VideoContainer,
        );

        assert_eq!(
            cmd.args,
            strings(&[
                "-config",
                "./.ExifTool_config",
                "-v",
                "-XMP-xmp:FrameGroups<=/meta/clip.json",
                "/out/clip.mp4",
                "-overwrite_original",
            ])
        );
    }

    #[test]
    fn omits_empty_config() {
        let tools = ToolSettings {
            exiftool_config: String::new(),
            ..ToolSettings::default()
        };
        let metadata = MetadataSettings::default();
        let cmd = EmbedCommandBuilder::new(&tools, &metadata).build(
            Path::new("/meta/clip.json"),
            Path::new("/out/clip.mov"),
            MediaClass::VideoContainer,
        );

        assert_eq!(cmd.args[0], "-v");
        assert!(!cmd.args.contains(&"-config".to_string()));
    }
}
