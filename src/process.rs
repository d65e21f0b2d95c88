//! Subprocess execution with optional sudo escalation
//!
//! Every external command (apt-get, ssh-keyscan, git, sudo cp, ...) goes
//! through [`Cmd`] so the command line is logged the same way and failures map
//! onto [`InstallerError`].

use std::ffi::OsStr;
use std::fmt;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{Result, process as process_error};

/// Whether the process runs with root privileges already
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Whether `program` can be found on PATH
pub fn have_command(program: &str) -> bool {
    which::which(program).is_ok()
}

/// A command line, optionally prefixed with `sudo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    sudo: bool,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            sudo: false,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string_lossy().into_owned()));
        self
    }

    /// Run through `sudo`, unless already root
    #[must_use]
    pub fn sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo && !is_root();
        self
    }

    fn command(&self) -> Command {
        if self.sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&self.program).args(&self.args);
            cmd
        } else {
            let mut cmd = Command::new(&self.program);
            cmd.args(&self.args);
            cmd
        }
    }

    fn launcher(&self) -> &str {
        if self.sudo { "sudo" } else { &self.program }
    }

    /// Run with inherited stdio, failing on a non-zero exit
    pub fn run(&self) -> Result<()> {
        info!("Running: {self}");
        let status = self
            .command()
            .status()
            .map_err(|e| process_error::spawn_failed(self.launcher(), &e))?;
        if status.success() {
            Ok(())
        } else {
            Err(process_error::failed(&self.to_string(), status))
        }
    }

    /// Run and capture stdout, failing on a non-zero exit
    pub fn output(&self) -> Result<String> {
        debug!("Running: {self}");
        let output = self
            .command()
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| process_error::spawn_failed(self.launcher(), &e))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(process_error::failed(&self.to_string(), output.status))
        }
    }

    /// Run silently and report whether it exited zero
    pub fn succeeds(&self) -> Result<bool> {
        debug!("Running: {self}");
        let status = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| process_error::spawn_failed(self.launcher(), &e))?;
        Ok(status.success())
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sudo {
            write!(f, "sudo ")?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
