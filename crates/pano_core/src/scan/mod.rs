//! Flat directory scanning.
//!
//! Lists the regular files of one directory without recursing. Symbolic
//! links and subdirectories are skipped. Enumeration order is whatever the
//! filesystem returns; use [`snapshot`] when a stable order is needed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Diagnostic;

/// Errors that can occur while scanning a directory.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read entry in {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            ScanError::NotFound(path) => path,
            ScanError::ReadDir { path, .. } => path,
            ScanError::ReadEntry { path, .. } => path,
        }
    }
}

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// A regular file found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub path: PathBuf,
    /// File name without the final extension.
    pub basename: String,
    /// Final extension without the dot, if any.
    pub extension: Option<String>,
}

impl ScanEntry {
    /// Build an entry from a file path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let basename = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().to_string());

        Self {
            path,
            basename,
            extension,
        }
    }

    /// File name as it appears on disk.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Lazy iterator over the regular files of one directory.
///
/// Not restartable: scan again to get a fresh view.
pub struct DirectoryScan {
    dir: PathBuf,
    inner: fs::ReadDir,
}

impl DirectoryScan {
    /// Directory being scanned.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Iterator for DirectoryScan {
    type Item = ScanResult<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(ScanError::ReadEntry {
                        path: self.dir.clone(),
                        source,
                    }))
                }
            };

            // DirEntry::file_type does not follow symlinks
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(source) => {
                    return Some(Err(ScanError::ReadEntry {
                        path: entry.path(),
                        source,
                    }))
                }
            };

            if !file_type.is_file() {
                tracing::trace!("Skipping non-regular entry {}", entry.path().display());
                continue;
            }

            return Some(Ok(ScanEntry::from_path(entry.path())));
        }
    }
}

/// Start scanning a directory.
///
/// Fails with [`ScanError::NotFound`] if the path does not exist or is not a
/// directory.
pub fn scan_directory(dir: &Path) -> ScanResult<DirectoryScan> {
    if !dir.is_dir() {
        return Err(ScanError::NotFound(dir.to_path_buf()));
    }

    let inner = fs::read_dir(dir).map_err(|source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    tracing::debug!("Scanning {}", dir.display());

    Ok(DirectoryScan {
        dir: dir.to_path_buf(),
        inner,
    })
}

/// A fully read directory, sorted by file name.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub entries: Vec<ScanEntry>,
    /// Entries that could not be read.
    pub diagnostics: Vec<Diagnostic>,
}

/// Read a whole directory once and sort it by file name.
///
/// Unreadable entries become `IoFailure` diagnostics instead of failing the
/// scan.
pub fn snapshot(dir: &Path) -> ScanResult<Snapshot> {
    let mut snapshot = Snapshot::default();

    for item in scan_directory(dir)? {
        match item {
            Ok(entry) => snapshot.entries.push(entry),
            Err(e) => {
                tracing::warn!("{}", e);
                snapshot
                    .diagnostics
                    .push(Diagnostic::io_failure(e.path(), e.to_string()));
            }
        }
    }

    snapshot.entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(snapshot)
}
