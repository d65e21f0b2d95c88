//! Re-running a subcommand on another host over SSH

use std::env;

use log::info;

use crate::error::{InstallerError, Result};
use crate::process::Cmd;
use crate::retry::RetryPolicy;

/// Env var naming the command that runs `installer` on the remote host
pub const RUNNER_ENV: &str = "INSTALLER_REMOTE_RUNNER";
const DEFAULT_RUNNER: &str = "installer";

/// Flags consumed locally and never forwarded, with their value counts
const LOCAL_FLAGS: &[(&str, usize)] = &[("--ssh", 1), ("--retry", 2)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// `user@host`
    pub target: String,
    /// Command line prefix on the remote side; inserted unquoted
    pub runner: String,
    pub retry: RetryPolicy,
}

impl RemoteConfig {
    pub fn new(target: &str, retry: RetryPolicy) -> Result<Self> {
        split_target(target)?;
        let runner = env::var(RUNNER_ENV)
            .ok()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_RUNNER.to_string());
        Ok(Self {
            target: target.to_string(),
            runner,
            retry,
        })
    }
}

/// Split `user@host`, rejecting empty parts
pub fn split_target(target: &str) -> Result<(&str, &str)> {
    match target.split_once('@') {
        Some((user, host))
            if !user.is_empty()
                && !host.is_empty()
                && !host.contains('@')
                && !target.contains(char::is_whitespace) =>
        {
            Ok((user, host))
        }
        _ => Err(InstallerError::InvalidSshTarget {
            target: target.to_string(),
        }),
    }
}

/// Drop the program name and the local-only flags from a raw argument list
pub fn forwarded_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = Vec::new();
    let mut skip = 0;
    for arg in args.into_iter().skip(1) {
        if skip > 0 {
            skip -= 1;
            continue;
        }
        if let Some((_, count)) = LOCAL_FLAGS.iter().find(|(flag, _)| *flag == arg) {
            skip = *count;
            continue;
        }
        if LOCAL_FLAGS
            .iter()
            .any(|(flag, _)| arg.starts_with(&format!("{flag}=")))
        {
            continue;
        }
        out.push(arg);
    }
    out
}

/// Quote `arg` for a POSIX shell
pub fn quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// The `ssh` invocation that runs `args` remotely
pub fn remote_command(config: &RemoteConfig, args: &[String]) -> Cmd {
    Cmd::new("ssh")
        .args(["-o", "BatchMode=yes"])
        .arg(&config.target)
        .arg(&config.runner)
        .args(args.iter().map(|a| quote(a)))
}

/// Re-run the current invocation on `config.target`
pub fn run(config: &RemoteConfig) -> Result<()> {
    let args = forwarded_args(env::args());
    let cmd = remote_command(config, &args);
    info!("Running on {}: {}", config.target, args.join(" "));
    config.retry.run(&format!("ssh {}", config.target), |_| true, || cmd.run())
}
