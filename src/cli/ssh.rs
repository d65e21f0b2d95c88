use std::path::PathBuf;

use clap::Parser;

use super::args::RemoteArgs;

/// Arguments for the git-clone command
#[derive(Parser, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                  Clone with a deploy key:\n    installer git-clone ~/keys/app owner app\n\n\
                  Clone a branch from a self-hosted server:\n    \
                  installer git-clone ~/keys/app owner app --host git.example.com --port 2222 --branch dev")]
pub struct GitCloneArgs {
    /// Private deploy key; its file stem becomes the SSH host alias
    pub key: PathBuf,

    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Git server host name
    #[arg(long, default_value = "github.com")]
    pub host: String,

    /// Git server SSH port
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory to clone into; defaults to ./<REPO>
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Branch to check out
    #[arg(long)]
    pub branch: Option<String>,
}

/// Arguments for the setup-authorized-keys command
#[derive(Parser, Debug, Clone)]
pub struct SetupAuthorizedKeysArgs {
    /// Public keys, or files containing them
    #[arg(required = true, num_args = 1..)]
    pub keys: Vec<String>,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Arguments for the setup-ssh-config command
#[derive(Parser, Debug, Clone)]
pub struct SetupSshConfigArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Arguments for the setup-sshd-config command
#[derive(Parser, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                  Key-only logins, no root:\n    installer setup-sshd-config --sudo\n\n\
                  Render into a staging root:\n    installer setup-sshd-config --root /tmp/image")]
pub struct SetupSshdConfigArgs {
    /// Allow root logins (with a key)
    #[arg(long)]
    pub permit_root_login: bool,

    /// Filesystem root holding etc/ssh
    #[arg(long, value_name = "DIR", default_value = "/")]
    pub root: PathBuf,

    /// Write through sudo
    #[arg(long)]
    pub sudo: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}
