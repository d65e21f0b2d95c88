//! Install a binary from an arbitrary release

use super::{forward_if_remote, report_installed, show_progress};
use crate::cli::RunArgs;
use crate::error::Result;
use crate::fetch;
use crate::github::GithubClient;
use crate::platform::Platform;
use crate::tools::{self, InstallRule};

pub fn run(args: RunArgs) -> Result<()> {
    if forward_if_remote(&args.remote)? {
        return Ok(());
    }

    let platform = Platform::detect()?;
    let client = GithubClient::new(args.download.config(args.remote.retry_policy()));
    let fetched = fetch::fetch(
        &client,
        &args.owner,
        &args.repo,
        &args.criteria(),
        &platform,
        None,
        show_progress(),
    )?;
    let installed = tools::apply_rule(
        InstallRule::Member(&args.binary),
        &fetched.path,
        &args.install.path_binaries,
        &args.install.config(),
    )?;
    report_installed(&fetched, &installed);
    Ok(())
}
