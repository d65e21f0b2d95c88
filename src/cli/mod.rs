//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - args: flag groups shared between subcommands
//! - tool: one generated subcommand per entry of the tool table
//! - run: generic release installer
//! - packages: apt and docker
//! - ssh: deploy-key clones and SSH configuration
//! - completions: completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};

pub mod args;
pub mod completions;
pub mod packages;
pub mod run;
pub mod ssh;
pub mod tool;

pub use args::{RemoteArgs, ShellArgs};
pub use completions::CompletionsArgs;
pub use packages::{AptPackageArgs, DockerArgs, PackageArgs};
pub use run::RunArgs;
pub use ssh::{GitCloneArgs, SetupAuthorizedKeysArgs, SetupSshConfigArgs, SetupSshdConfigArgs};
pub use tool::ToolCommand;

/// Installer - GitHub release binaries and host setup
#[derive(Parser, Debug)]
#[command(
    name = "installer",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install GitHub release binaries and set up hosts",
    long_about = "Installer downloads the GitHub release asset matching this host's operating system, \
                  CPU architecture and C library, installs it with the requested permissions and owner, \
                  and sets up SSH, shells, apt and docker. Any command can run on another host with --ssh.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  installer ripgrep                         \x1b[90m# Install rg into /usr/local/bin\x1b[0m\n   \
                  installer starship --no-shell-config      \x1b[90m# Install without the $SHELL hook\x1b[0m\n   \
                  installer fzf --sudo --ssh root@box       \x1b[90m# Install on another host\x1b[0m\n   \
                  installer run owner repo tool             \x1b[90m# Install any release binary\x1b[0m\n   \
                  installer git-clone ~/keys/app owner app  \x1b[90m# Clone with a deploy key\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Tool(ToolCommand),

    /// Install a binary from any GitHub release
    Run(RunArgs),

    /// Install an apt package
    AptPackage(AptPackageArgs),

    /// Install 'curl' with apt
    Curl(PackageArgs),

    /// Install 'git' with apt
    Git(PackageArgs),

    /// Install 'rsync' with apt
    Rsync(PackageArgs),

    /// Install Docker from Docker's apt repository
    Docker(DockerArgs),

    /// Clone a repository with a deploy key
    GitClone(GitCloneArgs),

    /// Write ~/.ssh/authorized_keys
    SetupAuthorizedKeys(SetupAuthorizedKeysArgs),

    /// Include ~/.ssh/config.d/*.conf from ~/.ssh/config
    SetupSshConfig(SetupSshConfigArgs),

    /// Write the sshd drop-in config
    SetupSshdConfig(SetupSshdConfigArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
