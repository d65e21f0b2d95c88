//! Scratch directories for downloads and unpacking
//!
//! Temp dirs are never created under the current working directory, even when
//! TMPDIR is relative (e.g. TMPDIR=tmp).

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::{InstallerError, Result};

/// Returns a directory path suitable for creating temporary directories.
/// Never returns a relative path.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        PathBuf::from("/tmp")
    }
}

/// Create a fresh scratch directory, removed when the guard drops
pub fn scratch_dir(purpose: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("installer-{purpose}-"))
        .tempdir_in(temp_dir_base())
        .map_err(|e| InstallerError::IoError {
            message: format!("Failed to create temporary directory: {e}"),
        })
}
