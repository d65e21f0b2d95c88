//! Common test utilities for installer integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A sandbox directory standing in for HOME and the filesystem root
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the sandbox root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new sandbox
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the sandbox
    #[allow(dead_code)]
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the sandbox
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in the sandbox
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// The installer binary with HOME pointed at the sandbox and no
    /// ambient configuration leaking in
    pub fn cmd(&self) -> Command {
        let mut cmd = installer_cmd();
        cmd.env("HOME", &self.path)
            .env_remove("GITHUB_TOKEN")
            .env_remove("INSTALLER_PATH_BINARIES")
            .env_remove("INSTALLER_GITHUB_API")
            .env_remove("INSTALLER_REMOTE_RUNNER")
            .env_remove("RUST_LOG");
        cmd
    }
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn installer_cmd() -> Command {
    Command::cargo_bin("installer").unwrap()
}
