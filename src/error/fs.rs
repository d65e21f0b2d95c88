//! File system errors

use std::path::Path;

use super::InstallerError;

/// Creates a read failure for `path`
pub fn read_failed(path: &Path, err: impl std::fmt::Display) -> InstallerError {
    InstallerError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a write failure for `path`
pub fn write_failed(path: &Path, err: impl std::fmt::Display) -> InstallerError {
    InstallerError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a not-found error for `path`
pub fn not_found(path: &Path) -> InstallerError {
    InstallerError::FileNotFound {
        path: path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_failed_carries_path() {
        let err = read_failed(Path::new("/etc/shadow"), "permission denied");
        assert!(matches!(err, InstallerError::FileReadFailed { .. }));
        assert!(err.to_string().contains("/etc/shadow"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_not_found() {
        let err = not_found(Path::new("/nope"));
        assert_eq!(err.to_string(), "File not found: /nope");
    }
}
