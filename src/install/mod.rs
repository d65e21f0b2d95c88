//! Place unpacked files on disk with permissions and ownership
//!
//! Two paths exist for every operation: a direct one using std and `nix`, and
//! an escalated one that shells out through `sudo` (`install`, `cp`, `ln`,
//! `chown`). File installs are idempotent: identical destination content is
//! left untouched and only its mode and owner are reapplied.

pub mod perms;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use nix::unistd::{Gid, Group, Uid, User};
use walkdir::WalkDir;

use crate::error::{InstallerError, Result, fs as fs_error};
use crate::hash;
use crate::process::Cmd;

pub use perms::{DEFAULT_PERMS, Permissions};

/// How files are placed at their destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallConfig {
    pub sudo: bool,
    pub perms: Permissions,
    pub owner: Option<String>,
    pub group: Option<String>,
}

impl InstallConfig {
    fn chown_spec(&self) -> Option<String> {
        match (&self.owner, &self.group) {
            (None, None) => None,
            (Some(owner), None) => Some(owner.clone()),
            (None, Some(group)) => Some(format!(":{group}")),
            (Some(owner), Some(group)) => Some(format!("{owner}:{group}")),
        }
    }
}

/// Copy `src` to `dest`. Returns whether the destination content was written.
pub fn install_file(src: &Path, dest: &Path, config: &InstallConfig) -> Result<bool> {
    if hash::same_content(src, dest)? {
        info!("{} is up to date", dest.display());
        apply_metadata(dest, config, false)?;
        return Ok(false);
    }

    if config.sudo {
        if let Some(parent) = dest.parent() {
            Cmd::new("mkdir").arg("-p").arg(parent).sudo(true).run()?;
        }
        let mut cmd = Cmd::new("install").arg("-m").arg(config.perms.to_string());
        if let Some(owner) = &config.owner {
            cmd = cmd.arg("-o").arg(owner);
        }
        if let Some(group) = &config.group {
            cmd = cmd.arg("-g").arg(group);
        }
        cmd.arg(src).arg(dest).sudo(true).run()?;
    } else {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(parent, e))?;
        }
        // Rename over the old file so a running binary is never truncated.
        let staging = staging_path(dest);
        fs::copy(src, &staging).map_err(|e| fs_error::write_failed(&staging, e))?;
        apply_metadata(&staging, config, false)?;
        fs::rename(&staging, dest).map_err(|e| fs_error::write_failed(dest, e))?;
    }
    info!("Installed {}", dest.display());
    Ok(true)
}

/// Replace `dest` with a copy of the directory `src`.
///
/// File modes inside the tree are kept as unpacked; ownership is applied
/// recursively.
pub fn install_tree(src: &Path, dest: &Path, config: &InstallConfig) -> Result<()> {
    if config.sudo {
        Cmd::new("rm").arg("-rf").arg(dest).sudo(true).run()?;
        if let Some(parent) = dest.parent() {
            Cmd::new("mkdir").arg("-p").arg(parent).sudo(true).run()?;
        }
        Cmd::new("cp").arg("-R").arg(src).arg(dest).sudo(true).run()?;
    } else {
        if dest.exists() {
            fs::remove_dir_all(dest).map_err(|e| fs_error::write_failed(dest, e))?;
        }
        copy_tree(src, dest)?;
    }
    apply_metadata(dest, config, true)?;
    info!("Installed {}", dest.display());
    Ok(())
}

/// Point `link` at `target`, replacing whatever `link` was
pub fn symlink(target: &Path, link: &Path, config: &InstallConfig) -> Result<()> {
    if config.sudo {
        Cmd::new("ln").arg("-sfn").arg(target).arg(link).sudo(true).run()?;
    } else {
        if link.symlink_metadata().is_ok() {
            fs::remove_file(link).map_err(|e| fs_error::write_failed(link, e))?;
        }
        std::os::unix::fs::symlink(target, link).map_err(|e| fs_error::write_failed(link, e))?;
    }
    info!("Linked {} -> {}", link.display(), target.display());
    Ok(())
}

/// Write `content` to `dest` unless it already holds exactly that
pub fn write_if_changed(dest: &Path, content: &str, sudo: bool) -> Result<bool> {
    if fs::read_to_string(dest).is_ok_and(|current| current == content) {
        debug!("{} is up to date", dest.display());
        return Ok(false);
    }
    if sudo {
        let scratch = crate::temp::scratch_dir("write")?;
        let staged = scratch.path().join("content");
        fs::write(&staged, content).map_err(|e| fs_error::write_failed(&staged, e))?;
        if let Some(parent) = dest.parent() {
            Cmd::new("mkdir").arg("-p").arg(parent).sudo(true).run()?;
        }
        Cmd::new("install")
            .args(["-m", "644"])
            .arg(&staged)
            .arg(dest)
            .sudo(true)
            .run()?;
    } else {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(parent, e))?;
        }
        fs::write(dest, content).map_err(|e| fs_error::write_failed(dest, e))?;
    }
    info!("Wrote {}", dest.display());
    Ok(true)
}

fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.installer-tmp"))
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| InstallerError::IoError {
                message: e.to_string(),
            })?;
        let target = dest.join(rel);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| fs_error::write_failed(&target, e))?;
        } else if file_type.is_symlink() {
            let link =
                fs::read_link(entry.path()).map_err(|e| fs_error::read_failed(entry.path(), e))?;
            std::os::unix::fs::symlink(&link, &target)
                .map_err(|e| fs_error::write_failed(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| fs_error::write_failed(&target, e))?;
        }
    }
    Ok(())
}

/// Apply mode (files only) and ownership
fn apply_metadata(path: &Path, config: &InstallConfig, recursive: bool) -> Result<()> {
    if config.sudo {
        if !recursive {
            Cmd::new("chmod")
                .arg(config.perms.to_string())
                .arg(path)
                .sudo(true)
                .run()?;
        }
        if let Some(spec) = config.chown_spec() {
            let mut cmd = Cmd::new("chown");
            if recursive {
                cmd = cmd.arg("-R");
            }
            cmd.arg(spec).arg(path).sudo(true).run()?;
        }
        return Ok(());
    }

    if !recursive {
        fs::set_permissions(path, fs::Permissions::from_mode(config.perms.mode()))
            .map_err(|e| fs_error::write_failed(path, e))?;
    }
    let uid = config.owner.as_deref().map(lookup_uid).transpose()?;
    let gid = config.group.as_deref().map(lookup_gid).transpose()?;
    if uid.is_none() && gid.is_none() {
        return Ok(());
    }
    let paths: Vec<PathBuf> = if recursive {
        WalkDir::new(path)
            .into_iter()
            .filter(|e| e.as_ref().map_or(true, |e| !e.path_is_symlink()))
            .map(|e| e.map(walkdir::DirEntry::into_path))
            .collect::<std::result::Result<_, _>>()?
    } else {
        vec![path.to_path_buf()]
    };
    for p in paths {
        nix::unistd::chown(p.as_path(), uid, gid).map_err(|e| InstallerError::ChownFailed {
            path: p.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Resolve a user name or numeric uid
pub fn lookup_uid(owner: &str) -> Result<Uid> {
    if let Ok(raw) = owner.parse::<u32>() {
        return Ok(Uid::from_raw(raw));
    }
    match User::from_name(owner) {
        Ok(Some(user)) => Ok(user.uid),
        _ => Err(InstallerError::UserNotFound {
            name: owner.to_string(),
        }),
    }
}

/// Resolve a group name or numeric gid
pub fn lookup_gid(group: &str) -> Result<Gid> {
    if let Ok(raw) = group.parse::<u32>() {
        return Ok(Gid::from_raw(raw));
    }
    match Group::from_name(group) {
        Ok(Some(group)) => Ok(group.gid),
        _ => Err(InstallerError::GroupNotFound {
            name: group.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    #[test]
    fn test_install_file_applies_mode() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src-bin");
        fs::write(&src, "binary").unwrap();
        let dest = temp.path().join("bin/tool");

        let config = InstallConfig {
            perms: "u=rwx,g=rx,o=rx".parse().unwrap(),
            ..InstallConfig::default()
        };
        assert!(install_file(&src, &dest, &config).unwrap());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "binary");
        assert_eq!(mode_of(&dest), 0o755);
        assert!(!staging_path(&dest).exists());
    }

    #[test]
    fn test_install_file_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src-bin");
        fs::write(&src, "binary").unwrap();
        let dest = temp.path().join("tool");
        let config = InstallConfig::default();

        assert!(install_file(&src, &dest, &config).unwrap());
        let first = fs::metadata(&dest).unwrap().modified().unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert!(!install_file(&src, &dest, &config).unwrap());
        let second = fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&src).unwrap());
    }

    #[test]
    fn test_install_file_reapplies_mode_when_unchanged() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src-bin");
        fs::write(&src, "binary").unwrap();
        let dest = temp.path().join("tool");
        fs::write(&dest, "binary").unwrap();
        fs::set_permissions(&dest, fs::Permissions::from_mode(0o600)).unwrap();

        let changed = install_file(&src, &dest, &InstallConfig::default()).unwrap();
        assert!(!changed);
        assert_eq!(mode_of(&dest), 0o755);
    }

    #[test]
    fn test_install_file_replaces_changed_content() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src-bin");
        fs::write(&src, "v2").unwrap();
        let dest = temp.path().join("tool");
        fs::write(&dest, "v1").unwrap();

        assert!(install_file(&src, &dest, &InstallConfig::default()).unwrap());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "v2");
    }

    #[test]
    fn test_install_tree_and_symlink() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("nvim-linux-x86_64");
        fs::create_dir_all(src.join("bin")).unwrap();
        fs::create_dir_all(src.join("share/nvim")).unwrap();
        fs::write(src.join("bin/nvim"), "nvim").unwrap();
        fs::write(src.join("share/nvim/runtime.vim"), "rt").unwrap();

        let bin = temp.path().join("bin");
        let dest = bin.join("nvim-dir");
        let config = InstallConfig::default();
        install_tree(&src, &dest, &config).unwrap();
        assert_eq!(fs::read_to_string(dest.join("share/nvim/runtime.vim")).unwrap(), "rt");

        let link = bin.join("nvim");
        symlink(&dest.join("bin/nvim"), &link, &config).unwrap();
        assert_eq!(fs::read_to_string(&link).unwrap(), "nvim");

        // Re-running replaces both the tree and the link.
        install_tree(&src, &dest, &config).unwrap();
        symlink(&dest.join("bin/nvim"), &link, &config).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), dest.join("bin/nvim"));
    }

    #[test]
    fn test_write_if_changed() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("etc/ssh/sshd_config.d/default.conf");
        assert!(write_if_changed(&dest, "a\n", false).unwrap());
        assert!(!write_if_changed(&dest, "a\n", false).unwrap());
        assert!(write_if_changed(&dest, "b\n", false).unwrap());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "b\n");
    }

    #[test]
    fn test_chown_spec() {
        let mut config = InstallConfig::default();
        assert_eq!(config.chown_spec(), None);
        config.group = Some("staff".to_string());
        assert_eq!(config.chown_spec().as_deref(), Some(":staff"));
        config.owner = Some("root".to_string());
        assert_eq!(config.chown_spec().as_deref(), Some("root:staff"));
    }

    #[test]
    fn test_lookup_numeric_ids() {
        assert_eq!(lookup_uid("0").unwrap(), Uid::from_raw(0));
        assert_eq!(lookup_gid("0").unwrap(), Gid::from_raw(0));
    }

    #[test]
    fn test_lookup_unknown_user() {
        let err = lookup_uid("no-such-user-xyz").unwrap_err();
        assert!(matches!(err, InstallerError::UserNotFound { .. }));
        let err = lookup_gid("no-such-group-xyz").unwrap_err();
        assert!(matches!(err, InstallerError::GroupNotFound { .. }));
    }

    #[test]
    fn test_owner_applies_current_user() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src-bin");
        fs::write(&src, "binary").unwrap();
        let dest = temp.path().join("tool");
        let config = InstallConfig {
            owner: Some(nix::unistd::getuid().to_string()),
            group: Some(nix::unistd::getgid().to_string()),
            ..InstallConfig::default()
        };
        assert!(install_file(&src, &dest, &config).unwrap());
    }
}
