//! Path helpers shared by the SSH, shell and clone commands

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{InstallerError, Result};

/// The user's home directory; `HOME` wins over the passwd entry
pub fn home_dir() -> Result<PathBuf> {
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or(InstallerError::HomeNotFound)
}

/// Expand a leading `~/` against `home`
pub fn expand_tilde(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Join an absolute system path (e.g. `/etc/ssh`) under an alternate root
pub fn under_root(root: &Path, absolute: &str) -> PathBuf {
    root.join(absolute.trim_start_matches('/'))
}

/// File name without its extension, as a UTF-8 string
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
