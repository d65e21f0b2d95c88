//! Subprocess errors

use std::io;
use std::process::ExitStatus;

use super::InstallerError;

/// Maps a spawn failure, distinguishing a missing program
pub fn spawn_failed(program: &str, err: &io::Error) -> InstallerError {
    if err.kind() == io::ErrorKind::NotFound {
        InstallerError::CommandNotFound {
            program: program.to_string(),
        }
    } else {
        InstallerError::IoError {
            message: format!("Failed to run {program}: {err}"),
        }
    }
}

/// Creates a failure for a command that exited unsuccessfully
pub fn failed(command: &str, status: ExitStatus) -> InstallerError {
    InstallerError::CommandFailed {
        command: command.to_string(),
        status: status.to_string(),
    }
}
