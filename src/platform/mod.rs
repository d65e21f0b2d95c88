//! Host platform detection and asset naming aliases
//!
//! Release assets name their target in many spellings (`amd64` vs `x86_64`,
//! `macos` vs `darwin`). Each axis of the host platform is an enum carrying the
//! alias group used when matching asset names.

use std::fmt;
use std::process::Command;

use log::debug;

use crate::error::{InstallerError, Result};

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    Linux,
    Darwin,
}

impl System {
    /// Lowercase spellings found in asset names
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            System::Linux => &["linux"],
            System::Darwin => &["darwin", "macos", "apple"],
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            System::Linux => write!(f, "Linux"),
            System::Darwin => write!(f, "Darwin"),
        }
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    X86_64,
    Aarch64,
}

impl Machine {
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Machine::X86_64 => &["x86_64", "amd64"],
            Machine::Aarch64 => &["aarch64", "arm64"],
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Machine::X86_64 => write!(f, "x86_64"),
            Machine::Aarch64 => write!(f, "aarch64"),
        }
    }
}

/// C standard library family (Linux only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Libc {
    Gnu,
    Musl,
}

impl Libc {
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Libc::Gnu => &["gnu", "glibc"],
            Libc::Musl => &["musl"],
        }
    }
}

/// The host as seen by the asset resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub system: System,
    pub machine: Machine,
    /// `None` where assets carry no libc marker (macOS)
    pub libc: Option<Libc>,
}

impl Platform {
    /// Detect the running host.
    ///
    /// Fails for anything other than Linux/macOS on x86_64/aarch64, before
    /// any network access happens.
    pub fn detect() -> Result<Self> {
        let mut platform = Self::from_parts(std::env::consts::OS, std::env::consts::ARCH, None)?;
        if platform.system == System::Linux {
            platform.libc = Some(if host_is_musl() { Libc::Musl } else { Libc::Gnu });
        }
        debug!("Detected platform: {platform:?}");
        Ok(platform)
    }

    /// Build a platform from `std::env::consts`-style names
    pub fn from_parts(os: &str, arch: &str, libc: Option<Libc>) -> Result<Self> {
        let system = match os {
            "linux" => System::Linux,
            "macos" | "darwin" => System::Darwin,
            _ => return Err(unsupported(os, arch)),
        };
        let machine = match arch {
            "x86_64" | "amd64" => Machine::X86_64,
            "aarch64" | "arm64" => Machine::Aarch64,
            _ => return Err(unsupported(os, arch)),
        };
        let libc = match system {
            System::Linux => libc,
            System::Darwin => None,
        };
        Ok(Self {
            system,
            machine,
            libc,
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.system, self.machine)?;
        match self.libc {
            Some(Libc::Gnu) => write!(f, " (gnu)"),
            Some(Libc::Musl) => write!(f, " (musl)"),
            None => Ok(()),
        }
    }
}

fn unsupported(os: &str, arch: &str) -> InstallerError {
    InstallerError::UnsupportedPlatform {
        system: os.to_string(),
        machine: arch.to_string(),
    }
}

/// A musl host links its own binaries against musl, which `ldd` reports.
fn host_is_musl() -> bool {
    let Ok(ls) = which::which("ls") else {
        return false;
    };
    let Ok(ldd) = which::which("ldd") else {
        return false;
    };
    let Ok(output) = Command::new(ldd).arg(ls).output() else {
        return false;
    };
    String::from_utf8_lossy(&output.stdout).contains("musl")
        || String::from_utf8_lossy(&output.stderr).contains("musl")
}
