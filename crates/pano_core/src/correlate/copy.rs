//! Sidecar copying that never overwrites.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure while copying one sidecar.
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("cannot open sidecar {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed copying {} to {}: {source}", .from.display(), .to.display())]
    Write {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a successful [`copy_sidecar`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Destination written with this many bytes.
    Copied(u64),
    /// Destination already existed and was left untouched.
    AlreadyPresent,
}

/// Copy `source` to `destination` byte for byte.
///
/// The destination is opened with create-new semantics, so an existing file
/// is reported as [`CopyOutcome::AlreadyPresent`] rather than overwritten.
/// A copy that fails midway removes the partial destination.
pub fn copy_sidecar(source: &Path, destination: &Path) -> Result<CopyOutcome, CopyError> {
    let mut reader = File::open(source).map_err(|e| CopyError::Open {
        path: source.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CopyError::Create {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let mut writer = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(CopyOutcome::AlreadyPresent);
        }
        Err(e) => {
            return Err(CopyError::Create {
                path: destination.to_path_buf(),
                source: e,
            })
        }
    };

    let copied = io::copy(&mut reader, &mut writer).and_then(|bytes| {
        writer.flush()?;
        Ok(bytes)
    });

    match copied {
        Ok(bytes) => Ok(CopyOutcome::Copied(bytes)),
        Err(e) => {
            drop(writer);
            if let Err(cleanup) = fs::remove_file(destination) {
                tracing::warn!(
                    "Could not remove partial sidecar {}: {}",
                    destination.display(),
                    cleanup
                );
            }
            Err(CopyError::Write {
                from: source.to_path_buf(),
                to: destination.to_path_buf(),
                source: e,
            })
        }
    }
}
