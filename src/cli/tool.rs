//! One subcommand per entry of the tool table

use clap::error::ErrorKind;
use clap::{ArgMatches, Args, Command, FromArgMatches, Subcommand};

use super::args::{DownloadArgs, InstallArgs, RemoteArgs, ShellArgs};
use crate::tools::{self, TOOLS, ToolSpec};

/// Flags every tool subcommand takes
#[derive(Args, Debug, Clone)]
pub struct ToolArgs {
    #[command(flatten)]
    pub download: DownloadArgs,

    #[command(flatten)]
    pub install: InstallArgs,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// A parsed `installer <tool>` invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub spec: &'static ToolSpec,
    pub args: ToolArgs,
    /// Present only for tools with a shell hook
    pub shell: Option<ShellArgs>,
}

fn tool_command(spec: &ToolSpec) -> Command {
    let cmd = ToolArgs::augment_args(Command::new(spec.name));
    let cmd = if spec.hook.is_some() {
        ShellArgs::augment_args(cmd)
    } else {
        cmd
    };
    // Augmenting applies the flag groups' docs as the about text
    cmd.about(spec.about).long_about(None)
}

impl FromArgMatches for ToolCommand {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let (name, sub) = matches.subcommand().ok_or_else(|| {
            clap::Error::raw(ErrorKind::MissingSubcommand, "a tool name is required\n")
        })?;
        let spec = tools::find(name).ok_or_else(|| {
            clap::Error::raw(ErrorKind::InvalidSubcommand, format!("unknown tool '{name}'\n"))
        })?;
        let args = ToolArgs::from_arg_matches(sub)?;
        let shell = match spec.hook {
            Some(_) => Some(ShellArgs::from_arg_matches(sub)?),
            None => None,
        };
        Ok(Self { spec, args, shell })
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl Subcommand for ToolCommand {
    fn augment_subcommands(cmd: Command) -> Command {
        TOOLS.iter().fold(cmd, |cmd, spec| cmd.subcommand(tool_command(spec)))
    }

    fn augment_subcommands_for_update(cmd: Command) -> Command {
        Self::augment_subcommands(cmd)
    }

    fn has_subcommand(name: &str) -> bool {
        tools::find(name).is_some()
    }
}
