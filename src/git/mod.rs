//! Cloning through the `git` CLI and inspecting the result with git2
//!
//! Cloning goes through the `git` binary rather than libgit2 so that the
//! `Host` aliases written to `~/.ssh/config.d` are honoured by OpenSSH.

use std::path::Path;

use git2::Repository;
use log::info;

use crate::error::{InstallerError, Result};
use crate::process::Cmd;

/// SSH clone URL through a deploy-key host alias
pub fn alias_url(alias: &str, owner: &str, repo: &str) -> String {
    format!("git@{alias}:{owner}/{repo}")
}

/// Clone `url` into `dest`, or update it when `dest` is already a clone.
/// Returns the SHA of the checked-out commit.
pub fn clone(url: &str, dest: &Path, branch: Option<&str>) -> Result<String> {
    if Repository::open(dest).is_ok() {
        info!("{} is already a repository; updating", dest.display());
        Cmd::new("git").arg("-C").arg(dest).args(["fetch", "--all"]).run()?;
        if let Some(branch) = branch {
            Cmd::new("git").arg("-C").arg(dest).args(["checkout", branch]).run()?;
        }
        Cmd::new("git").arg("-C").arg(dest).args(["pull", "--ff-only"]).run()?;
    } else {
        let mut cmd = Cmd::new("git").arg("clone").arg(url).arg(dest);
        if let Some(branch) = branch {
            cmd = cmd.arg("--branch").arg(branch);
        }
        cmd.run()?;
    }

    let sha = head_sha(dest)?;
    info!("Checked out {} at {sha}", dest.display());
    Ok(sha)
}

/// Open a repository
pub fn open(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| InstallerError::GitOpenFailed {
        path: path.display().to_string(),
        reason: e.message().to_string(),
    })
}

/// Full SHA of the commit HEAD points at
pub fn head_sha(path: &Path) -> Result<String> {
    let repo = open(path)?;
    let commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .map_err(|e| InstallerError::GitRefResolveFailed {
            git_ref: "HEAD".to_string(),
            reason: e.message().to_string(),
        })?;
    Ok(commit.id().to_string())
}
