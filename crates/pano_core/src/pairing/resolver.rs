//! Classification of scanned files into stitch units.

use std::collections::HashSet;

use crate::config::StitchSettings;
use crate::models::{
    AssetFile, AssetKind, Diagnostic, DiagnosticKind, Eye, ResolvedUnit, StereoNaming,
    VideoLayout,
};
use crate::scan::ScanEntry;

use super::marker::{derive_secondary_path, parse_eye_marker, stereo_output_basename};

/// Units and diagnostics produced from one directory.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Units in resolution order, with unique output basenames.
    pub units: Vec<ResolvedUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns scanned entries into [`ResolvedUnit`]s.
///
/// Still panoramas map 1:1 to image units. Stereo video files are paired
/// primary-to-secondary via the filename marker; the secondary must exist on
/// disk when the primary is resolved.
#[derive(Debug, Clone)]
pub struct PairingResolver {
    naming: StereoNaming,
    image_extension: &'static str,
    stereo_extension: &'static str,
}

impl PairingResolver {
    /// Create a resolver using the output formats from the stitch settings.
    pub fn new(settings: &StitchSettings) -> Self {
        // Image sequences are written as frames in the still-image format
        let stereo_extension = match settings.video_layout {
            VideoLayout::SingleFile => settings.video_container.extension(),
            VideoLayout::ImageSequence => settings.image_format.extension(),
        };

        Self {
            naming: settings.stereo_naming,
            image_extension: settings.image_format.extension(),
            stereo_extension,
        }
    }

    /// Resolve a sequence of scanned entries.
    ///
    /// Never fails: every problem is recorded as a diagnostic and the entry
    /// is left out.
    pub fn resolve<I>(&self, entries: I) -> Resolution
    where
        I: IntoIterator<Item = ScanEntry>,
    {
        let mut resolution = Resolution::default();

        for entry in entries {
            match self.resolve_entry(&entry) {
                Ok(Some(unit)) => {
                    tracing::debug!(
                        "Resolved {} unit '{}' from {}",
                        unit.kind,
                        unit.output_basename,
                        entry.path.display()
                    );
                    resolution.units.push(unit);
                }
                Ok(None) => {}
                Err(diag) => resolution.diagnostics.push(diag),
            }
        }

        let (units, duplicates) = dedupe_outputs(resolution.units);
        resolution.units = units;
        resolution.diagnostics.extend(duplicates);
        resolution
    }

    /// Resolve one entry.
    ///
    /// `Ok(None)` means the entry is intentionally not a unit (a secondary
    /// eye, which is only ever referenced as a partner).
    fn resolve_entry(&self, entry: &ScanEntry) -> Result<Option<ResolvedUnit>, Diagnostic> {
        let Some(extension) = entry.extension.as_deref() else {
            return Err(Diagnostic::skipped_file(&entry.path, "no file extension"));
        };

        let Some(kind) = AssetKind::from_extension(extension) else {
            return Err(Diagnostic::skipped_file(
                &entry.path,
                format!("unrecognized extension '{}'", extension),
            ));
        };

        let asset = AssetFile::new(&entry.path, &entry.basename, extension, kind);

        match kind {
            AssetKind::StillPanorama => Ok(Some(ResolvedUnit::image(asset, self.image_extension))),
            AssetKind::StereoVideoEye => self.resolve_eye(asset),
        }
    }

    fn resolve_eye(&self, primary: AssetFile) -> Result<Option<ResolvedUnit>, Diagnostic> {
        let Some(marker) = parse_eye_marker(&primary.basename) else {
            return Err(Diagnostic::skipped_file(
                &primary.path,
                "stereo video without an eye marker (_00_### or _10_###)",
            ));
        };

        if marker.eye == Eye::Secondary {
            tracing::trace!(
                "{} is a secondary eye, pairing from its primary",
                primary.path.display()
            );
            return Ok(None);
        }

        let Some(secondary_path) = derive_secondary_path(&primary.path) else {
            return Err(Diagnostic::skipped_file(
                &primary.path,
                "cannot derive secondary eye name",
            ));
        };

        if !secondary_path.is_file() {
            return Err(Diagnostic::missing_partner(&primary.path, &secondary_path));
        }

        let secondary_basename = secondary_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let secondary = AssetFile::new(
            &secondary_path,
            secondary_basename,
            primary.extension.clone(),
            AssetKind::StereoVideoEye,
        );

        let output_basename = stereo_output_basename(&primary.basename, &marker, self.naming);
        Ok(Some(ResolvedUnit::stereo_pair(
            primary,
            secondary,
            output_basename,
            self.stereo_extension,
        )))
    }
}

/// Keep the first unit per output basename; later ones become
/// `DuplicateOutput` diagnostics.
///
/// The extension is ignored: sidecars are matched to deliverables by
/// basename, so `scene.jpg` and `scene.mp4` cannot both be kept.
pub fn dedupe_outputs(units: Vec<ResolvedUnit>) -> (Vec<ResolvedUnit>, Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(units.len());
    let mut diagnostics = Vec::new();

    for unit in units {
        if seen.insert(unit.output_basename.clone()) {
            kept.push(unit);
            continue;
        }

        let path = unit.lead_input().cloned().unwrap_or_default();
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::DuplicateOutput,
            path,
            format!(
                "output basename '{}' is already used by another unit",
                unit.output_basename
            ),
        ));
    }

    (kept, diagnostics)
}
