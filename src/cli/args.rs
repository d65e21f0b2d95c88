//! Flag groups shared by several subcommands

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::github::{DEFAULT_TIMEOUT_SECS, DownloadConfig, normalize_token};
use crate::install::{DEFAULT_PERMS, InstallConfig, Permissions};
use crate::retry::RetryPolicy;
use crate::shell::Shell;

pub const DEFAULT_PATH_BINARIES: &str = "/usr/local/bin";

/// GitHub API access
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// GitHub token for the API and asset downloads
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl DownloadArgs {
    pub fn config(&self, retry: RetryPolicy) -> DownloadConfig {
        let mut config = DownloadConfig {
            token: normalize_token(self.token.clone()),
            timeout: Duration::from_secs(self.timeout),
            retry,
            ..DownloadConfig::default()
        };
        if let Ok(base) = std::env::var("INSTALLER_GITHUB_API") {
            if !base.trim().is_empty() {
                config.api_base = base.trim().trim_end_matches('/').to_string();
            }
        }
        config
    }
}

/// Where and how binaries are placed
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Directory to install binaries into
    #[arg(
        long,
        value_name = "DIR",
        env = "INSTALLER_PATH_BINARIES",
        default_value = DEFAULT_PATH_BINARIES
    )]
    pub path_binaries: PathBuf,

    /// Run privileged steps through sudo
    #[arg(long)]
    pub sudo: bool,

    /// Permissions, symbolic (u=rwx,g=rx,o=rx) or octal (755)
    #[arg(long, value_name = "PERMS", default_value = DEFAULT_PERMS)]
    pub perms: Permissions,

    /// Owner of installed files (name or uid)
    #[arg(long)]
    pub owner: Option<String>,

    /// Group of installed files (name or gid)
    #[arg(long)]
    pub group: Option<String>,
}

impl InstallArgs {
    pub fn config(&self) -> InstallConfig {
        InstallConfig {
            sudo: self.sudo,
            perms: self.perms,
            owner: self.owner.clone(),
            group: self.group.clone(),
        }
    }
}

/// Run on another host instead
#[derive(Args, Debug, Clone, Default)]
pub struct RemoteArgs {
    /// Re-run this command on USER@HOST over SSH
    #[arg(long, value_name = "USER@HOST")]
    pub ssh: Option<String>,

    /// Attempts and delay in seconds for network operations
    #[arg(long, num_args = 2, value_names = ["N", "DELAY"])]
    pub retry: Option<Vec<u64>>,
}

impl RemoteArgs {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_flag(self.retry.as_deref())
    }
}

/// Shell startup configuration, for tools with a shell hook
#[derive(Args, Debug, Clone)]
pub struct ShellArgs {
    /// Skip adding the tool's hook to the shell startup file
    #[arg(long, conflicts_with = "etc")]
    pub no_shell_config: bool,

    /// Write /etc/profile.d/<tool>.sh instead (bash and sh only)
    #[arg(long)]
    pub etc: bool,

    /// Shell to configure; defaults to $SHELL
    #[arg(long, value_enum)]
    pub shell: Option<Shell>,

    /// Filesystem root for --etc
    #[arg(long, value_name = "DIR", default_value = "/")]
    pub root: PathBuf,
}
