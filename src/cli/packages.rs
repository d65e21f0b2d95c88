use clap::Parser;

use super::args::RemoteArgs;

/// Arguments for the apt-package command
#[derive(Parser, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                  Install a package:\n    installer apt-package htop --sudo\n\n\
                  Install on another host:\n    installer apt-package htop --ssh root@box")]
pub struct AptPackageArgs {
    /// Package name
    pub name: String,

    /// Run apt-get through sudo
    #[arg(long)]
    pub sudo: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Arguments for the curl, git and rsync shorthands
#[derive(Parser, Debug, Clone)]
pub struct PackageArgs {
    /// Run apt-get through sudo
    #[arg(long)]
    pub sudo: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Arguments for the docker command
#[derive(Parser, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                  Install Docker and let a user run it:\n    installer docker --sudo --user deploy")]
pub struct DockerArgs {
    /// Run privileged steps through sudo
    #[arg(long)]
    pub sudo: bool,

    /// User to add to the docker group
    #[arg(long)]
    pub user: Option<String>,

    #[command(flatten)]
    pub remote: RemoteArgs,
}
