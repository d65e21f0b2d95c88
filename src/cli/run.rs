use clap::Parser;

use super::args::{DownloadArgs, InstallArgs, RemoteArgs};
use crate::resolver::MatchCriteria;

/// Arguments for the run command
#[derive(Parser, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                  Install the latest release of a tool:\n    installer run sharkdp hyperfine hyperfine\n\n\
                  Pin a tag and drop checksum assets:\n    installer run owner repo tool --tag '^v1\\.' --not-endswith sha256")]
pub struct RunArgs {
    /// Repository owner
    #[arg(id = "repo_owner", value_name = "OWNER")]
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Binary to install (searched for inside archives)
    pub binary: String,

    /// Regex selecting the release tag; defaults to the latest release
    #[arg(long)]
    pub tag: Option<String>,

    /// Drop assets matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub not_matches: Vec<String>,

    /// Drop assets ending with this suffix (repeatable)
    #[arg(long, value_name = "SUFFIX")]
    pub not_endswith: Vec<String>,

    /// Do not filter on the operating system
    #[arg(long)]
    pub no_match_system: bool,

    /// Do not filter on the CPU architecture
    #[arg(long)]
    pub no_match_machine: bool,

    /// Do not filter on the C library
    #[arg(long)]
    pub no_match_c_std_lib: bool,

    #[command(flatten)]
    pub download: DownloadArgs,

    #[command(flatten)]
    pub install: InstallArgs,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

impl RunArgs {
    pub fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            match_system: !self.no_match_system,
            match_machine: !self.no_match_machine,
            match_c_std_lib: !self.no_match_c_std_lib,
            not_matches: self.not_matches.clone(),
            not_endswith: self.not_endswith.clone(),
            tag: self.tag.clone(),
        }
    }
}
