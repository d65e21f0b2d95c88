//! Docker engine from Docker's own apt repository

use std::path::{Path, PathBuf};

use log::info;
use regex::Regex;

use super::{apt_install, apt_update, require_linux};
use crate::error::{InstallerError, Result, fs as fs_error};
use crate::install;
use crate::path_utils;
use crate::platform::System;
use crate::process::{Cmd, have_command};

const CONFLICTING: &[&str] = &[
    "docker.io",
    "docker-doc",
    "docker-compose",
    "podman-docker",
    "containerd",
    "runc",
];
const PREREQUISITES: &[&str] = &["ca-certificates", "curl"];
const PACKAGES: &[&str] = &[
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
    "docker-compose-plugin",
];
const GPG_URL: &str = "https://download.docker.com/linux/debian/gpg";
const KEYRING: &str = "/etc/apt/keyrings/docker.asc";
const SOURCES: &str = "/etc/apt/sources.list.d/docker.sources";

#[derive(Debug, Clone, Default)]
pub struct DockerConfig {
    pub sudo: bool,
    /// Added to the `docker` group
    pub user: Option<String>,
    /// Filesystem root holding `etc/`
    pub root: PathBuf,
}

/// `VERSION_CODENAME` from an os-release file
pub fn codename(os_release: &str) -> Option<String> {
    let pattern = Regex::new(r"(?m)^VERSION_CODENAME=(\w+)$").ok()?;
    pattern
        .captures(os_release)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Body of the deb822 sources file
pub fn sources(codename: &str) -> String {
    format!(
        "Types: deb\n\
         URIs: https://download.docker.com/linux/debian\n\
         Suites: {codename}\n\
         Components: stable\n\
         Signed-By: {KEYRING}\n"
    )
}

fn read_codename(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| fs_error::read_failed(path, e))?;
    codename(&text).ok_or_else(|| InstallerError::CodenameNotFound {
        path: path.display().to_string(),
    })
}

pub fn setup_docker(system: System, config: &DockerConfig) -> Result<()> {
    require_linux(system, "docker")?;
    configure(config, have_command("docker"))
}

/// The engine is installed only when `docker` is missing; group membership
/// is applied either way
fn configure(config: &DockerConfig, installed: bool) -> Result<()> {
    if installed {
        info!("'docker' is already installed");
    } else {
        install_engine(config)?;
    }

    if let Some(user) = &config.user {
        Cmd::new("usermod")
            .args(["-aG", "docker", user.as_str()])
            .sudo(config.sudo)
            .run()?;
        info!("Added '{user}' to the docker group");
    }
    Ok(())
}

fn install_engine(config: &DockerConfig) -> Result<()> {
    let sudo = config.sudo;
    Cmd::new("apt-get")
        .args(["remove", "-y"])
        .args(CONFLICTING)
        .sudo(sudo)
        .run()?;
    apt_update(sudo)?;
    apt_install(PREREQUISITES, sudo)?;

    let keyring = path_utils::under_root(&config.root, KEYRING);
    if let Some(dir) = keyring.parent() {
        Cmd::new("install")
            .args(["-m", "0755", "-d"])
            .arg(dir)
            .sudo(sudo)
            .run()?;
    }
    Cmd::new("curl")
        .arg("-fsSL")
        .arg(GPG_URL)
        .arg("-o")
        .arg(&keyring)
        .sudo(sudo)
        .run()?;
    Cmd::new("chmod").arg("a+r").arg(&keyring).sudo(sudo).run()?;

    let codename = read_codename(&path_utils::under_root(&config.root, "/etc/os-release"))?;
    let sources_path = path_utils::under_root(&config.root, SOURCES);
    install::write_if_changed(&sources_path, &sources(&codename), sudo)?;

    apt_update(sudo)?;
    apt_install(PACKAGES, sudo)
}
