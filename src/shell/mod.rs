//! Shell startup configuration: rc files and `/etc/profile.d` scripts

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::{debug, info};

use crate::error::{InstallerError, Result, fs as fs_error};
use crate::install;
use crate::path_utils;

/// Supported interactive shells
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Sh,
}

impl Shell {
    /// Parse a shell name or path such as `/usr/bin/zsh`
    pub fn parse_name(value: &str) -> Result<Self> {
        let name = Path::new(value.trim())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match name.as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            "sh" | "dash" => Ok(Shell::Sh),
            _ => Err(InstallerError::UnsupportedShell {
                shell: value.to_string(),
            }),
        }
    }

    /// The login shell from `$SHELL`
    pub fn from_env() -> Result<Self> {
        let value = std::env::var("SHELL").unwrap_or_default();
        Self::parse_name(&value)
    }

    pub fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
            Shell::Sh => "sh",
        }
    }

    /// Per-user startup file relative to the home directory
    pub fn rc_file(self, home: &Path) -> PathBuf {
        match self {
            Shell::Bash => home.join(".bashrc"),
            Shell::Zsh => home.join(".zshrc"),
            Shell::Fish => home.join(".config/fish/config.fish"),
            Shell::Sh => home.join(".profile"),
        }
    }
}

/// Lines to add for each shell family; `sh` uses the bash lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellLines {
    pub bash: Vec<String>,
    pub zsh: Vec<String>,
    pub fish: Vec<String>,
}

impl ShellLines {
    pub fn for_shell(&self, shell: Shell) -> &[String] {
        match shell {
            Shell::Bash | Shell::Sh => &self.bash,
            Shell::Zsh => &self.zsh,
            Shell::Fish => &self.fish,
        }
    }
}

/// Where shell lines get written
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub shell: Shell,
    pub home: PathBuf,
    /// Write `<root>/etc/profile.d/<name>.sh` instead of the user rc file
    pub etc: Option<String>,
    pub root: PathBuf,
    pub sudo: bool,
}

/// Apply `lines` for the configured shell; returns the file written
pub fn configure(config: &ShellConfig, lines: &ShellLines) -> Result<PathBuf> {
    let lines = lines.for_shell(config.shell);
    if let Some(name) = &config.etc {
        if !matches!(config.shell, Shell::Bash | Shell::Sh) {
            return Err(InstallerError::InvalidShellForEtc {
                shell: config.shell.name().to_string(),
            });
        }
        let path = path_utils::under_root(&config.root, &format!("/etc/profile.d/{name}.sh"));
        install::write_if_changed(&path, &profile_script(lines), config.sudo)?;
        return Ok(path);
    }

    let path = config.shell.rc_file(&config.home);
    for line in lines {
        append_line(&path, line)?;
    }
    Ok(path)
}

/// Contents of a `/etc/profile.d` script
pub fn profile_script(lines: &[String]) -> String {
    format!("#!/usr/bin/env sh\n\n{}\n", lines.join("\n"))
}

/// Append `line` to `path` unless an identical line is already there.
/// Returns whether the file changed.
pub fn append_line(path: &Path, line: &str) -> Result<bool> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(fs_error::read_failed(path, e)),
    };
    if existing.lines().any(|l| l.trim_end() == line) {
        debug!("{} already contains '{line}'", path.display());
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(parent, e))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| fs_error::write_failed(path, e))?;
    let prefix = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    writeln!(file, "{prefix}{line}").map_err(|e| fs_error::write_failed(path, e))?;
    info!("Added '{line}' to {}", path.display());
    Ok(true)
}
