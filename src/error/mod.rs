//! Error types and handling for the installer
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Convenience constructors for the most common variants live in sub-modules:
//! - [`fs`]: File system errors
//! - [`process`]: Subprocess errors

pub mod fs;
pub mod process;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for installer operations
#[derive(Error, Diagnostic, Debug)]
pub enum InstallerError {
    // Platform errors
    #[error("Unsupported platform: {system}/{machine}")]
    #[diagnostic(
        code(installer::platform::unsupported),
        help("Supported platforms: linux and macos on x86_64 or aarch64")
    )]
    UnsupportedPlatform { system: String, machine: String },

    #[error("Unsupported system for '{operation}': {system}")]
    #[diagnostic(
        code(installer::platform::unsupported_system),
        help("This operation relies on apt and only runs on Debian-based Linux hosts")
    )]
    UnsupportedSystem { operation: String, system: String },

    // Release resolution errors
    #[error("No release of {owner}/{repo} matches tag pattern '{tag}'")]
    #[diagnostic(code(installer::resolve::release_not_found))]
    ReleaseNotFound {
        owner: String,
        repo: String,
        tag: String,
    },

    #[error("No asset of {owner}/{repo} matches this host; candidates: [{candidates}]")]
    #[diagnostic(
        code(installer::resolve::no_match),
        help("Relax the match flags or adjust --not-matches / --not-endswith")
    )]
    NoMatchingAsset {
        owner: String,
        repo: String,
        candidates: String,
    },

    #[error("{count} assets of {owner}/{repo} match this host: [{candidates}]")]
    #[diagnostic(
        code(installer::resolve::ambiguous),
        help("Add --not-matches or --not-endswith filters to narrow the selection to one asset")
    )]
    AmbiguousAsset {
        owner: String,
        repo: String,
        count: usize,
        candidates: String,
    },

    #[error("Invalid pattern '{pattern}': {reason}")]
    #[diagnostic(code(installer::resolve::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    // Network errors
    #[error("HTTP {status} from {url}: {reason}")]
    #[diagnostic(
        code(installer::http::status),
        help("Check the repository name, and set GITHUB_TOKEN if you are being rate limited")
    )]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Request to {url} failed: {reason}")]
    #[diagnostic(code(installer::http::transport))]
    HttpTransport { url: String, reason: String },

    #[error("Failed to parse response: {reason}")]
    #[diagnostic(code(installer::http::parse_failed))]
    ResponseParseFailed { reason: String },

    // Archive errors
    #[error("Failed to decompress {path}: {reason}")]
    #[diagnostic(code(installer::archive::decompress_failed))]
    DecompressFailed { path: String, reason: String },

    #[error("Archive member '{member}' not found under {path}")]
    #[diagnostic(code(installer::archive::member_not_found))]
    MemberNotFound { member: String, path: String },

    // Permission and ownership errors
    #[error("Invalid permissions: '{perms}'")]
    #[diagnostic(
        code(installer::perms::invalid),
        help("Use symbolic form like u=rwx,g=rx,o=rx or octal like 755")
    )]
    InvalidPermissions { perms: String },

    #[error("User not found: {name}")]
    #[diagnostic(code(installer::perms::user_not_found))]
    UserNotFound { name: String },

    #[error("Group not found: {name}")]
    #[diagnostic(code(installer::perms::group_not_found))]
    GroupNotFound { name: String },

    #[error("Failed to change ownership of {path}: {reason}")]
    #[diagnostic(
        code(installer::perms::chown_failed),
        help("Changing ownership usually requires root; retry with --sudo")
    )]
    ChownFailed { path: String, reason: String },

    // Subprocess errors
    #[error("Command not found: {program}")]
    #[diagnostic(code(installer::process::not_found))]
    CommandNotFound { program: String },

    #[error("Command `{command}` failed with {status}")]
    #[diagnostic(code(installer::process::failed))]
    CommandFailed { command: String, status: String },

    // Input errors
    #[error("Invalid SSH target '{target}'")]
    #[diagnostic(
        code(installer::ssh::invalid_target),
        help("Use the form user@host")
    )]
    InvalidSshTarget { target: String },

    #[error("Invalid shell for 'etc': '{shell}'")]
    #[diagnostic(
        code(installer::shell::invalid_for_etc),
        help("/etc/profile.d only sources POSIX shell scripts; use bash or sh")
    )]
    InvalidShellForEtc { shell: String },

    #[error("Unsupported shell: '{shell}'")]
    #[diagnostic(
        code(installer::shell::unsupported),
        help("Supported shells: bash, zsh, fish, sh")
    )]
    UnsupportedShell { shell: String },

    #[error("Could not determine home directory")]
    #[diagnostic(code(installer::fs::home_not_found), help("Set the HOME environment variable"))]
    HomeNotFound,

    #[error("VERSION_CODENAME not found in {path}")]
    #[diagnostic(code(installer::packages::codename_not_found))]
    CodenameNotFound { path: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(installer::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(code(installer::git::open_failed))]
    GitOpenFailed { path: String, reason: String },

    #[error("Failed to resolve git ref '{git_ref}': {reason}")]
    #[diagnostic(code(installer::git::ref_resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(installer::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(installer::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(installer::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(installer::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for InstallerError {
    fn from(err: std::io::Error) -> Self {
        InstallerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for InstallerError {
    fn from(err: serde_json::Error) -> Self {
        InstallerError::ResponseParseFailed {
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for InstallerError {
    fn from(err: git2::Error) -> Self {
        InstallerError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

impl From<walkdir::Error> for InstallerError {
    fn from(err: walkdir::Error) -> Self {
        InstallerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for InstallerError {
    fn from(err: regex::Error) -> Self {
        InstallerError::InvalidPattern {
            pattern: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, InstallerError>;
