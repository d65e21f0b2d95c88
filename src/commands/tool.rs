//! Install a tool from the tool table

use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{forward_if_remote, report, report_installed, show_progress};
use crate::cli::{ShellArgs, ToolCommand};
use crate::error::Result;
use crate::fetch;
use crate::github::GithubClient;
use crate::path_utils;
use crate::platform::Platform;
use crate::shell::{self, Shell, ShellConfig};
use crate::tools::{self, ShellHook};

pub fn run(cmd: ToolCommand) -> Result<()> {
    let ToolCommand { spec, args, shell } = cmd;
    if forward_if_remote(&args.remote)? {
        return Ok(());
    }

    let platform = Platform::detect()?;
    let variant = spec.variant_for(platform.system);
    info!("Installing '{}' from {}/{}", spec.name, variant.owner, variant.repo);

    let client = GithubClient::new(args.download.config(args.remote.retry_policy()));
    let fetched = fetch::fetch(
        &client,
        variant.owner,
        variant.repo,
        &variant.criteria(),
        &platform,
        Some(spec.compression),
        show_progress(),
    )?;
    let installed = tools::apply_rule(
        spec.rule,
        &fetched.path,
        &args.install.path_binaries,
        &args.install.config(),
    )?;
    report_installed(&fetched, &installed);

    if let (Some(hook), Some(shell_args)) = (spec.hook, shell) {
        if shell_args.no_shell_config {
            info!("Leaving shell startup files untouched for '{}'", spec.name);
        } else {
            let home = path_utils::home_dir()?;
            let sudo = args.install.sudo;
            if let Some(path) = configure_hook(spec.name, hook, shell_args, &home, sudo)? {
                report("Configured", &path);
            }
        }
    }
    Ok(())
}

/// Write `hook` for the requested (or detected) shell; `None` when no shell
/// could be detected and no `/etc` target was asked for
fn configure_hook(
    name: &str,
    hook: ShellHook,
    args: ShellArgs,
    home: &Path,
    sudo: bool,
) -> Result<Option<PathBuf>> {
    let shell = match args.shell {
        Some(shell) => shell,
        None => match Shell::from_env() {
            Ok(shell) => shell,
            Err(e) if !args.etc => {
                warn!("Skipping the '{name}' shell hook: {e}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        },
    };
    let config = ShellConfig {
        shell,
        home: home.to_path_buf(),
        etc: args.etc.then(|| name.to_string()),
        root: args.root,
        sudo,
    };
    shell::configure(&config, &hook.lines()).map(Some)
}
