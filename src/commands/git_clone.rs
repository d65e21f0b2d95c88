//! Clone a repository through a deploy key

use std::path::PathBuf;

use super::report;
use crate::cli::GitCloneArgs;
use crate::error::Result;
use crate::git;
use crate::path_utils;
use crate::ssh;

pub fn run(args: GitCloneArgs) -> Result<()> {
    let home = path_utils::home_dir()?;
    ssh::setup_ssh_config(&home)?;
    let deploy = ssh::setup_deploy_key(&args.key, &args.host, args.port, &home)?;
    ssh::setup_known_hosts(&args.host, args.port, &home)?;

    let dest = args.dest.unwrap_or_else(|| PathBuf::from(&args.repo));
    let url = git::alias_url(&deploy.alias, &args.owner, &args.repo);
    let sha = git::clone(&url, &dest, args.branch.as_deref())?;
    report("Cloned", &dest);
    println!("  HEAD {sha}");
    Ok(())
}
