//! SSH client and server setup commands

use super::{forward_if_remote, report};
use crate::cli::{SetupAuthorizedKeysArgs, SetupSshConfigArgs, SetupSshdConfigArgs};
use crate::error::Result;
use crate::path_utils;
use crate::ssh;

pub fn authorized_keys(args: SetupAuthorizedKeysArgs) -> Result<()> {
    if forward_if_remote(&args.remote)? {
        return Ok(());
    }
    let path = ssh::setup_authorized_keys(&args.keys, &path_utils::home_dir()?)?;
    report("Wrote", &path);
    Ok(())
}

pub fn ssh_config(args: SetupSshConfigArgs) -> Result<()> {
    if forward_if_remote(&args.remote)? {
        return Ok(());
    }
    let path = ssh::setup_ssh_config(&path_utils::home_dir()?)?;
    report("Configured", &path);
    Ok(())
}

pub fn sshd_config(args: SetupSshdConfigArgs) -> Result<()> {
    if forward_if_remote(&args.remote)? {
        return Ok(());
    }
    let path = ssh::setup_sshd_config(&args.root, args.permit_root_login, args.sudo)?;
    report("Wrote", &path);
    Ok(())
}
