//! apt-package, its shorthands, and docker

use super::forward_if_remote;
use crate::cli::{AptPackageArgs, DockerArgs, PackageArgs};
use crate::error::Result;
use crate::packages::{self, DockerConfig};
use crate::platform::Platform;

pub fn apt_package(args: AptPackageArgs) -> Result<()> {
    if forward_if_remote(&args.remote)? {
        return Ok(());
    }
    packages::apt_package(Platform::detect()?.system, &args.name, args.sudo)
}

/// `curl`, `git` and `rsync`
pub fn named(name: &str, args: PackageArgs) -> Result<()> {
    if forward_if_remote(&args.remote)? {
        return Ok(());
    }
    packages::apt_package(Platform::detect()?.system, name, args.sudo)
}

pub fn docker(args: DockerArgs) -> Result<()> {
    if forward_if_remote(&args.remote)? {
        return Ok(());
    }
    let config = DockerConfig {
        sudo: args.sudo,
        user: args.user,
        root: "/".into(),
    };
    packages::setup_docker(Platform::detect()?.system, &config)
}
