//! OpenSSH client and server configuration

pub mod deploy_key;
pub mod remote;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Result, fs as fs_error};
use crate::install;
use crate::path_utils;
use crate::shell;

pub use deploy_key::{setup_deploy_key, setup_known_hosts};

const SSHD_DROP_IN: &str = "/etc/ssh/sshd_config.d/default.conf";

/// `~/.ssh`
pub fn ssh_dir(home: &Path) -> PathBuf {
    home.join(".ssh")
}

/// Create `dir` with mode 0700 if missing
pub(crate) fn ensure_private_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|e| fs_error::write_failed(dir, e))?;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
            .map_err(|e| fs_error::write_failed(dir, e))?;
    }
    Ok(())
}

/// Write `content` with mode 0600 unless the file already holds it
pub(crate) fn write_private(path: &Path, content: &[u8]) -> Result<bool> {
    let changed = fs::read(path).map_or(true, |current| current != content);
    if changed {
        fs::write(path, content).map_err(|e| fs_error::write_failed(path, e))?;
    }
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| fs_error::write_failed(path, e))?;
    Ok(changed)
}

/// Replace `~/.ssh/authorized_keys` with `keys`.
///
/// A key that names an existing file contributes that file's lines.
pub fn setup_authorized_keys(keys: &[String], home: &Path) -> Result<PathBuf> {
    let mut lines = Vec::with_capacity(keys.len());
    for key in keys {
        let candidate = path_utils::expand_tilde(Path::new(key), home);
        if candidate.is_file() {
            let text = fs::read_to_string(&candidate)
                .map_err(|e| fs_error::read_failed(&candidate, e))?;
            lines.extend(text.lines().filter(|l| !l.trim().is_empty()).map(str::to_string));
        } else {
            lines.push(key.trim().to_string());
        }
    }

    let dir = ssh_dir(home);
    ensure_private_dir(&dir)?;
    let path = dir.join("authorized_keys");
    write_private(&path, format!("{}\n", lines.join("\n")).as_bytes())?;
    info!("Wrote {} key(s) to {}", lines.len(), path.display());
    Ok(path)
}

/// Make `~/.ssh/config` include every `~/.ssh/config.d/*.conf`
pub fn setup_ssh_config(home: &Path) -> Result<PathBuf> {
    let dir = ssh_dir(home);
    ensure_private_dir(&dir)?;
    let config_d = dir.join("config.d");
    fs::create_dir_all(&config_d).map_err(|e| fs_error::write_failed(&config_d, e))?;

    let path = dir.join("config");
    shell::append_line(&path, &format!("Include {}/*.conf", config_d.display()))?;
    Ok(path)
}

/// Body of the sshd drop-in
pub fn sshd_config(permit_root_login: bool) -> String {
    let yes_no = if permit_root_login { "yes" } else { "no" };
    format!(
        "PasswordAuthentication no\n\
         PermitRootLogin {yes_no}\n\
         PubkeyAcceptedAlgorithms ssh-ed25519\n\
         PubkeyAuthentication yes\n"
    )
}

/// Write the sshd drop-in under `root`
pub fn setup_sshd_config(root: &Path, permit_root_login: bool, sudo: bool) -> Result<PathBuf> {
    let path = path_utils::under_root(root, SSHD_DROP_IN);
    install::write_if_changed(&path, &sshd_config(permit_root_login), sudo)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use tempfile::TempDir;

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_setup_authorized_keys() {
        let temp = TempDir::new().unwrap();
        let keys = vec!["ssh-ed25519 AAAA one".to_string(), "ssh-ed25519 BBBB two".to_string()];
        let path = setup_authorized_keys(&keys, temp.path()).unwrap();
        assert_eq!(path, temp.path().join(".ssh/authorized_keys"));
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(text, "ssh-ed25519 AAAA one\nssh-ed25519 BBBB two\n");
        assert_eq!(mode_of(&path), 0o600);
        assert_eq!(mode_of(&temp.path().join(".ssh")), 0o700);
    }

    #[test]
    fn test_setup_authorized_keys_from_file() {
        let temp = TempDir::new().unwrap();
        let key_file = temp.path().join("keys.pub");
        fs::write(&key_file, "ssh-ed25519 AAAA one\n\nssh-ed25519 BBBB two\n").unwrap();
        let keys = vec![key_file.display().to_string(), "ssh-ed25519 CCCC three".to_string()];
        let path = setup_authorized_keys(&keys, temp.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_setup_authorized_keys_overwrites() {
        let temp = TempDir::new().unwrap();
        setup_authorized_keys(&["old".to_string()], temp.path()).unwrap();
        let path = setup_authorized_keys(&["new".to_string()], temp.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new\n");
    }

    #[test]
    fn test_setup_ssh_config() {
        let temp = TempDir::new().unwrap();
        let path = setup_ssh_config(temp.path()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let pattern = Regex::new(r"^Include .*/\*\.conf$").unwrap();
        assert!(pattern.is_match(text.trim_end()), "{text}");
        let config_d = temp.path().join(".ssh/config.d");
        assert!(config_d.is_dir());
        assert_eq!(fs::read_dir(config_d).unwrap().count(), 0);
    }

    #[test]
    fn test_setup_ssh_config_keeps_existing() {
        let temp = TempDir::new().unwrap();
        let ssh = temp.path().join(".ssh");
        fs::create_dir_all(&ssh).unwrap();
        fs::write(ssh.join("config"), "Host *\n    ServerAliveInterval 60\n").unwrap();
        setup_ssh_config(temp.path()).unwrap();
        setup_ssh_config(temp.path()).unwrap();
        let text = fs::read_to_string(ssh.join("config")).unwrap();
        assert!(text.starts_with("Host *\n"));
        assert_eq!(text.matches("Include ").count(), 1);
    }

    #[test]
    fn test_sshd_config() {
        assert_eq!(
            sshd_config(false),
            "PasswordAuthentication no\nPermitRootLogin no\nPubkeyAcceptedAlgorithms ssh-ed25519\nPubkeyAuthentication yes\n"
        );
        assert!(sshd_config(true).contains("PermitRootLogin yes\n"));
    }

    #[test]
    fn test_setup_sshd_config() {
        let temp = TempDir::new().unwrap();
        let path = setup_sshd_config(temp.path(), false, false).unwrap();
        assert_eq!(path, temp.path().join("etc/ssh/sshd_config.d/default.conf"));
        assert_eq!(fs::read_to_string(path).unwrap(), sshd_config(false));
    }
}
