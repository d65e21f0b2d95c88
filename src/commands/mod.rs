//! Command implementations for the installer CLI

pub mod completions;
pub mod git_clone;
pub mod packages;
pub mod run;
pub mod ssh;
pub mod tool;
pub mod version;

use std::path::{Path, PathBuf};

use console::Style;
use log::LevelFilter;

use crate::cli::RemoteArgs;
use crate::error::Result;
use crate::fetch::Fetched;
use crate::ssh::remote::{self, RemoteConfig};

/// Progress bars only when a person is watching and output is not quieted
pub(crate) fn show_progress() -> bool {
    console::user_attended_stderr() && log::max_level() >= LevelFilter::Warn
}

/// Print one `<label> <path>` result line
pub(crate) fn report(label: &str, path: &Path) {
    println!("{} {}", Style::new().green().bold().apply_to(label), path.display());
}

/// Print the installed paths along with the asset they came from
pub(crate) fn report_installed(fetched: &Fetched, installed: &[PathBuf]) {
    let from = Style::new().dim().apply_to(format!("({})", fetched.asset.name));
    for path in installed {
        println!("{} {} {from}", Style::new().green().bold().apply_to("Installed"), path.display());
    }
}

/// Re-run on the `--ssh` target if one was given; returns whether it did
pub(crate) fn forward_if_remote(remote: &RemoteArgs) -> Result<bool> {
    match &remote.ssh {
        Some(target) => {
            remote::run(&RemoteConfig::new(target, remote.retry_policy())?)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
