//! Deploy keys: a private key per repository, reachable through a `Host` alias

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{ensure_private_dir, ssh_dir, write_private};
use crate::error::{InstallerError, Result, fs as fs_error};
use crate::install;
use crate::path_utils;
use crate::process::{Cmd, have_command};

const INDENT: &str = "    ";

/// Where the key and its config stanza were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployKey {
    /// Host alias, the key file's stem
    pub alias: String,
    pub key: PathBuf,
    pub config: PathBuf,
}

fn key_path(home: &Path, stem: &str) -> PathBuf {
    ssh_dir(home).join("deploy-keys").join(stem)
}

/// The `Host` stanza for a deploy key
pub fn config_block(stem: &str, host: &str, port: Option<u16>, home: &Path) -> String {
    let mut lines = vec![
        format!("Host {stem}"),
        format!("{INDENT}User git"),
        format!("{INDENT}HostName {host}"),
    ];
    if let Some(port) = port {
        lines.push(format!("{INDENT}Port {port}"));
    }
    lines.extend([
        format!("{INDENT}IdentityFile {}", key_path(home, stem).display()),
        format!("{INDENT}IdentitiesOnly yes"),
        format!("{INDENT}BatchMode yes"),
        format!("{INDENT}HostKeyAlgorithms ssh-ed25519"),
        format!("{INDENT}StrictHostKeyChecking yes"),
    ]);
    format!("{}\n", lines.join("\n"))
}

/// Copy `key` into `~/.ssh/deploy-keys` and write its config stanza
pub fn setup_deploy_key(
    key: &Path,
    host: &str,
    port: Option<u16>,
    home: &Path,
) -> Result<DeployKey> {
    let key = path_utils::expand_tilde(key, home);
    if !key.is_file() {
        return Err(fs_error::not_found(&key));
    }
    let stem = path_utils::file_stem(&key).ok_or_else(|| fs_error::not_found(&key))?;

    let ssh = ssh_dir(home);
    ensure_private_dir(&ssh)?;
    let keys_dir = ssh.join("deploy-keys");
    ensure_private_dir(&keys_dir)?;
    let dest = keys_dir.join(&stem);
    let bytes = fs::read(&key).map_err(|e| fs_error::read_failed(&key, e))?;
    if write_private(&dest, &bytes)? {
        info!("Copied deploy key to {}", dest.display());
    }

    let config = ssh.join("config.d").join(format!("{stem}.conf"));
    install::write_if_changed(&config, &config_block(&stem, host, port, home), false)?;

    Ok(DeployKey {
        alias: stem,
        key: dest,
        config,
    })
}

/// The name `known_hosts` uses for `host`: `[host]:port` for non-default ports
pub fn known_hosts_name(host: &str, port: Option<u16>) -> String {
    match port {
        Some(port) if port != 22 => format!("[{host}]:{port}"),
        _ => host.to_string(),
    }
}

/// Whether `known_hosts` lists `host` in plain text
pub fn has_host_entry(known_hosts: &str, host: &str, port: Option<u16>) -> bool {
    let wanted = known_hosts_name(host, port);
    known_hosts
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .filter_map(|l| l.split_whitespace().next())
        .any(|hosts| hosts.split(',').any(|h| h == wanted))
}

/// Whether any entry is hashed (`HashKnownHosts yes`)
fn has_hashed_entries(known_hosts: &str) -> bool {
    known_hosts.lines().any(|l| l.trim_start().starts_with("|1|"))
}

/// Look `host` up with `ssh-keygen -F`, which understands hashed entries
fn keygen_finds(path: &Path, host: &str, port: Option<u16>) -> Result<bool> {
    if !have_command("ssh-keygen") {
        warn!("ssh-keygen not found; cannot search hashed entries in {}", path.display());
        return Ok(false);
    }
    Cmd::new("ssh-keygen")
        .arg("-F")
        .arg(known_hosts_name(host, port))
        .arg("-f")
        .arg(path)
        .succeeds()
}

/// Seed `~/.ssh/known_hosts` with the host's ed25519 key
pub fn setup_known_hosts(host: &str, port: Option<u16>, home: &Path) -> Result<PathBuf> {
    let ssh = ssh_dir(home);
    ensure_private_dir(&ssh)?;
    let path = ssh.join("known_hosts");
    let existing = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(fs_error::read_failed(&path, e)),
    };
    if has_host_entry(&existing, host, port)
        || (has_hashed_entries(&existing) && keygen_finds(&path, host, port)?)
    {
        debug!("{host} is already in {}", path.display());
        return Ok(path);
    }

    let mut cmd = Cmd::new("ssh-keyscan");
    if let Some(port) = port {
        cmd = cmd.arg("-p").arg(port.to_string());
    }
    let cmd = cmd.args(["-t", "ed25519", host]);
    let scanned = cmd.output()?;
    let entries: Vec<&str> = scanned
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .collect();
    if entries.is_empty() {
        return Err(InstallerError::CommandFailed {
            command: cmd.to_string(),
            status: "no host keys returned".to_string(),
        });
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| fs_error::write_failed(&path, e))?;
    let prefix = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    writeln!(file, "{prefix}{}", entries.join("\n")).map_err(|e| fs_error::write_failed(&path, e))?;
    info!("Added {host} to {}", path.display());
    Ok(path)
}
