//! apt packages and the Docker engine

pub mod docker;

use log::info;

use crate::error::{InstallerError, Result};
use crate::platform::System;
use crate::process::Cmd;

pub use docker::{DockerConfig, setup_docker};

/// Fail unless running on Linux
pub(crate) fn require_linux(system: System, operation: &str) -> Result<()> {
    match system {
        System::Linux => Ok(()),
        System::Darwin => Err(InstallerError::UnsupportedSystem {
            operation: operation.to_string(),
            system: system.to_string(),
        }),
    }
}

pub(crate) fn apt_update(sudo: bool) -> Result<()> {
    Cmd::new("apt-get").arg("update").sudo(sudo).run()
}

pub(crate) fn apt_install(packages: &[&str], sudo: bool) -> Result<()> {
    Cmd::new("apt-get")
        .args(["install", "-y"])
        .args(packages)
        .sudo(sudo)
        .run()
}

/// `apt-get update && apt-get install -y <name>`
pub fn apt_package(system: System, name: &str, sudo: bool) -> Result<()> {
    require_linux(system, "apt-package")?;
    info!("Installing '{name}' with apt");
    apt_update(sudo)?;
    apt_install(&[name], sudo)
}
